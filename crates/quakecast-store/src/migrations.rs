use ::duckdb::{Connection, ToSql};

struct Migration {
    version: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "0001_record_tables",
        sql: r#"
CREATE SEQUENCE IF NOT EXISTS record_seq START 1;

CREATE TABLE IF NOT EXISTS seismic_events (
    id TEXT PRIMARY KEY,
    storage_id TEXT NOT NULL UNIQUE,
    seq BIGINT NOT NULL DEFAULT nextval('record_seq'),
    magnitude DOUBLE NOT NULL CHECK (magnitude >= 0),
    depth DOUBLE NOT NULL CHECK (depth >= 0),
    location TEXT NOT NULL,
    date DATE NOT NULL
);

CREATE TABLE IF NOT EXISTS weather_observations (
    id TEXT PRIMARY KEY,
    storage_id TEXT NOT NULL UNIQUE,
    seq BIGINT NOT NULL DEFAULT nextval('record_seq'),
    city TEXT NOT NULL,
    temperature DOUBLE NOT NULL,
    humidity DOUBLE NOT NULL CHECK (humidity >= 0),
    condition TEXT NOT NULL
);
"#,
    },
    Migration {
        version: "0002_indexes",
        sql: r#"
CREATE INDEX IF NOT EXISTS idx_seismic_events_seq ON seismic_events(seq);
CREATE INDEX IF NOT EXISTS idx_weather_observations_seq ON weather_observations(seq);
"#,
    },
];

pub fn apply_migrations(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#,
    )?;

    for migration in MIGRATIONS {
        let params: [&dyn ToSql; 1] = [&migration.version];
        let applied_count: i64 = connection.query_row(
            "SELECT COUNT(*) FROM schema_migrations WHERE version = ?",
            params.as_slice(),
            |row| row.get(0),
        )?;

        if applied_count == 0 {
            connection.execute_batch(migration.sql)?;
            connection.execute(
                "INSERT INTO schema_migrations (version) VALUES (?)",
                params.as_slice(),
            )?;
        }
    }

    Ok(())
}
