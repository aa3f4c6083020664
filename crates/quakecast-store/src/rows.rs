//! Row types for the record tables.

use ::duckdb::{Row, ToSql};

/// A row type bound to one record table.
///
/// Every table has a text primary key `id`, a unique `storage_id`, a `seq`
/// column that records insertion order, and one text column that location
/// searches run against.
pub trait TableRow: Sized + Send + 'static {
    /// Table name.
    const TABLE: &'static str;
    /// Column list read by [`TableRow::from_row`], in order.
    const SELECT_COLUMNS: &'static str;
    /// Column list written by [`TableRow::insert_params`], in order.
    const INSERT_COLUMNS: &'static str;
    /// Placeholder list matching [`TableRow::INSERT_COLUMNS`].
    const INSERT_PLACEHOLDERS: &'static str;
    /// Column matched by location searches.
    const LOCATION_COLUMN: &'static str;

    /// Decode a row selected with [`TableRow::SELECT_COLUMNS`].
    fn from_row(row: &Row<'_>) -> Result<Self, ::duckdb::Error>;

    /// Record identifier.
    fn id(&self) -> &str;

    /// Store-generated storage identity. Empty until inserted.
    fn storage_id(&self) -> &str;

    /// Assign the store-generated storage identity.
    fn set_storage_id(&mut self, storage_id: String);

    /// Parameters for [`TableRow::INSERT_COLUMNS`].
    fn insert_params(&self) -> Vec<&dyn ToSql>;
}

/// A persisted seismic event.
#[derive(Debug, Clone, PartialEq)]
pub struct SeismicRow {
    pub storage_id: String,
    pub id: String,
    pub magnitude: f64,
    pub depth: f64,
    pub location: String,
    /// Calendar date as `YYYY-MM-DD`.
    pub date: String,
}

impl TableRow for SeismicRow {
    const TABLE: &'static str = "seismic_events";
    const SELECT_COLUMNS: &'static str =
        "storage_id, id, magnitude, depth, location, CAST(date AS VARCHAR)";
    const INSERT_COLUMNS: &'static str = "storage_id, id, magnitude, depth, location, date";
    const INSERT_PLACEHOLDERS: &'static str = "?, ?, ?, ?, ?, CAST(? AS DATE)";
    const LOCATION_COLUMN: &'static str = "location";

    fn from_row(row: &Row<'_>) -> Result<Self, ::duckdb::Error> {
        Ok(Self {
            storage_id: row.get(0)?,
            id: row.get(1)?,
            magnitude: row.get(2)?,
            depth: row.get(3)?,
            location: row.get(4)?,
            date: row.get(5)?,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn storage_id(&self) -> &str {
        &self.storage_id
    }

    fn set_storage_id(&mut self, storage_id: String) {
        self.storage_id = storage_id;
    }

    fn insert_params(&self) -> Vec<&dyn ToSql> {
        let params: [&dyn ToSql; 6] = [
            &self.storage_id,
            &self.id,
            &self.magnitude,
            &self.depth,
            &self.location,
            &self.date,
        ];
        params.to_vec()
    }
}

/// A persisted weather observation.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRow {
    pub storage_id: String,
    pub id: String,
    pub city: String,
    pub temperature: f64,
    pub humidity: f64,
    pub condition: String,
}

impl TableRow for WeatherRow {
    const TABLE: &'static str = "weather_observations";
    const SELECT_COLUMNS: &'static str = "storage_id, id, city, temperature, humidity, condition";
    const INSERT_COLUMNS: &'static str = "storage_id, id, city, temperature, humidity, condition";
    const INSERT_PLACEHOLDERS: &'static str = "?, ?, ?, ?, ?, ?";
    const LOCATION_COLUMN: &'static str = "city";

    fn from_row(row: &Row<'_>) -> Result<Self, ::duckdb::Error> {
        Ok(Self {
            storage_id: row.get(0)?,
            id: row.get(1)?,
            city: row.get(2)?,
            temperature: row.get(3)?,
            humidity: row.get(4)?,
            condition: row.get(5)?,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn storage_id(&self) -> &str {
        &self.storage_id
    }

    fn set_storage_id(&mut self, storage_id: String) {
        self.storage_id = storage_id;
    }

    fn insert_params(&self) -> Vec<&dyn ToSql> {
        let params: [&dyn ToSql; 6] = [
            &self.storage_id,
            &self.id,
            &self.city,
            &self.temperature,
            &self.humidity,
            &self.condition,
        ];
        params.to_vec()
    }
}
