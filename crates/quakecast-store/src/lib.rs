//! # Quakecast Store
//!
//! DuckDB-backed persistence for quakecast records.
//!
//! ## Overview
//!
//! The store owns the two record tables and exposes the four primitive
//! operations the gateway's local strategy needs: find one by identifier,
//! find many by a location fragment, insert, and delete one.
//!
//! - **Parameterized SQL**: caller text never reaches a statement string
//! - **Connection pooling**: connections are cloned from one database instance
//! - **Ordered reads**: collection reads come back in insertion order
//! - **Uniqueness**: the `id` primary key rejects a second writer
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quakecast_store::{SeismicRow, Warehouse};
//!
//! let warehouse = Warehouse::open_default()?;
//! let stored = warehouse.insert(SeismicRow {
//!     storage_id: String::new(),
//!     id: "sismo_1".to_string(),
//!     magnitude: 5.4,
//!     depth: 30.0,
//!     location: "Chile".to_string(),
//!     date: "2023-11-15".to_string(),
//! })?;
//! assert!(!stored.storage_id.is_empty());
//!
//! let chile = warehouse.find_matching::<SeismicRow>("chile")?;
//! assert_eq!(chile.len(), 1);
//! # Ok::<(), quakecast_store::WarehouseError>(())
//! ```
//!
//! ## Tables
//!
//! | Table | Description |
//! |-------|-------------|
//! | `seismic_events` | Seismic event records |
//! | `weather_observations` | Weather observation records |
//! | `schema_migrations` | Applied migration versions |

pub mod duckdb;
pub mod migrations;
mod rows;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::{Connection, ToSql};
use thiserror::Error;
use uuid::Uuid;

pub use duckdb::{DuckDbConnectionManager, PooledConnection};
pub use rows::{SeismicRow, TableRow, WeatherRow};

/// Errors that can occur during warehouse operations.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// `DuckDB` database error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error (file system operations).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The database could not be opened or no connection could be handed out.
    #[error("database unavailable: {0}")]
    Unavailable(String),

    /// A record with the same identifier already exists.
    #[error("a record with id '{id}' already exists")]
    DuplicateId { id: String },
}

impl WarehouseError {
    /// Whether the failure is about reaching the database rather than the
    /// statement that ran against it.
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Io(_))
    }
}

/// Configuration for the warehouse database.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// Root directory for quakecast data.
    pub quakecast_home: PathBuf,
    /// Path to the `DuckDB` database file.
    pub db_path: PathBuf,
    /// Maximum number of idle connections kept in the pool.
    pub max_pool_size: usize,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        let quakecast_home = resolve_quakecast_home();
        let db_path = quakecast_home.join("data").join("quakecast.duckdb");
        Self {
            quakecast_home,
            db_path,
            max_pool_size: 4,
        }
    }
}

impl WarehouseConfig {
    /// Configuration rooted at an explicit database file.
    pub fn at_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }
}

/// The record store.
#[derive(Clone)]
pub struct Warehouse {
    manager: DuckDbConnectionManager,
}

impl Warehouse {
    /// Open a warehouse with default configuration.
    pub fn open_default() -> Result<Self, WarehouseError> {
        Self::open(WarehouseConfig::default())
    }

    /// Open a warehouse with the specified configuration.
    pub fn open(config: WarehouseConfig) -> Result<Self, WarehouseError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let manager = DuckDbConnectionManager::new(config.db_path.clone(), config.max_pool_size);
        let warehouse = Self { manager };
        warehouse.initialize()?;
        Ok(warehouse)
    }

    /// Apply pending migrations.
    pub fn initialize(&self) -> Result<(), WarehouseError> {
        let connection = self.connection()?;
        migrations::apply_migrations(&connection)?;
        Ok(())
    }

    /// Get the path to the database file.
    pub fn db_path(&self) -> &Path {
        self.manager.db_path()
    }

    /// Exact lookup by record identifier.
    pub fn find_one<R: TableRow>(&self, id: &str) -> Result<Option<R>, WarehouseError> {
        let connection = self.connection()?;
        select_by_id(&connection, id)
    }

    /// Case-insensitive substring match against the row's location column,
    /// in insertion order.
    ///
    /// # Security
    /// The fragment is bound as a parameter and compared with `contains`, so
    /// `%` and `_` in caller text match literally.
    pub fn find_matching<R: TableRow>(&self, fragment: &str) -> Result<Vec<R>, WarehouseError> {
        let connection = self.connection()?;
        let sql = format!(
            "SELECT {columns} FROM {table} \
             WHERE contains(lower({location}), lower(?)) ORDER BY seq",
            columns = R::SELECT_COLUMNS,
            table = R::TABLE,
            location = R::LOCATION_COLUMN,
        );

        let params: [&dyn ToSql; 1] = [&fragment];
        let mut statement = connection.prepare(sql.as_str())?;
        let mut rows_cursor = statement.query(params.as_slice())?;
        let mut rows = Vec::new();
        while let Some(row) = rows_cursor.next()? {
            rows.push(R::from_row(row)?);
        }
        Ok(rows)
    }

    /// Insert a new row, assigning its storage identity.
    ///
    /// Returns [`WarehouseError::DuplicateId`] when a row with the same
    /// identifier exists, including when a concurrent writer won the race.
    pub fn insert<R: TableRow>(&self, mut row: R) -> Result<R, WarehouseError> {
        row.set_storage_id(Uuid::new_v4().simple().to_string());

        let connection = self.connection()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<(), WarehouseError> {
            if select_by_id::<R>(&connection, row.id())?.is_some() {
                return Err(WarehouseError::DuplicateId {
                    id: row.id().to_owned(),
                });
            }

            let sql = format!(
                "INSERT INTO {table} ({columns}) VALUES ({placeholders})",
                table = R::TABLE,
                columns = R::INSERT_COLUMNS,
                placeholders = R::INSERT_PLACEHOLDERS,
            );
            let params = row.insert_params();
            connection.execute(sql.as_str(), params.as_slice())?;
            Ok(())
        })();

        finalize_transaction(&connection, result)
            .map_err(|error| classify_insert_error(&connection, error, &row))?;
        Ok(row)
    }

    /// Delete a row by identifier, returning it when it existed.
    pub fn delete_one<R: TableRow>(&self, id: &str) -> Result<Option<R>, WarehouseError> {
        let connection = self.connection()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<Option<R>, WarehouseError> {
            let Some(existing) = select_by_id::<R>(&connection, id)? else {
                return Ok(None);
            };

            let sql = format!("DELETE FROM {table} WHERE id = ?", table = R::TABLE);
            let params: [&dyn ToSql; 1] = [&id];
            connection.execute(sql.as_str(), params.as_slice())?;
            Ok(Some(existing))
        })();

        finalize_transaction(&connection, result)
    }

    fn connection(&self) -> Result<PooledConnection, WarehouseError> {
        self.manager
            .acquire()
            .map_err(|error| WarehouseError::Unavailable(error.to_string()))
    }
}

fn select_by_id<R: TableRow>(
    connection: &Connection,
    id: &str,
) -> Result<Option<R>, WarehouseError> {
    let sql = format!(
        "SELECT {columns} FROM {table} WHERE id = ?",
        columns = R::SELECT_COLUMNS,
        table = R::TABLE,
    );
    let params: [&dyn ToSql; 1] = [&id];
    let mut statement = connection.prepare(sql.as_str())?;
    let mut rows_cursor = statement.query(params.as_slice())?;
    match rows_cursor.next()? {
        Some(row) => Ok(Some(R::from_row(row)?)),
        None => Ok(None),
    }
}

/// Finalize a transaction, committing on success or rolling back on failure.
fn finalize_transaction<T>(
    connection: &Connection,
    result: Result<T, WarehouseError>,
) -> Result<T, WarehouseError> {
    match result {
        Ok(value) => {
            connection.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(error) => {
            let _ = connection.execute_batch("ROLLBACK");
            Err(error)
        }
    }
}

/// Map a failed insert of `row` to [`WarehouseError::DuplicateId`] when its
/// identifier is taken.
///
/// A concurrent writer of the same id fails either with a primary-key
/// violation or, on commit, with a transaction conflict. A conflict counts as
/// a duplicate only when another writer's row now holds the id.
fn classify_insert_error<R: TableRow>(
    connection: &Connection,
    error: WarehouseError,
    row: &R,
) -> WarehouseError {
    let WarehouseError::DuckDb(inner) = &error else {
        return error;
    };
    if is_duplicate_key_message(&inner.to_string()) {
        return WarehouseError::DuplicateId {
            id: row.id().to_owned(),
        };
    }

    match select_by_id::<R>(connection, row.id()) {
        Ok(Some(existing)) if existing.storage_id() != row.storage_id() => {
            WarehouseError::DuplicateId {
                id: row.id().to_owned(),
            }
        }
        _ => error,
    }
}

/// DuckDB reports `Duplicate key "id: ..." violates primary key constraint`.
fn is_duplicate_key_message(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("duplicate key") && message.contains("constraint")
}

/// Resolve the quakecast home directory from environment or default.
fn resolve_quakecast_home() -> PathBuf {
    if let Some(path) = env::var_os("QUAKECAST_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".quakecast");
    }

    PathBuf::from(".quakecast")
}
