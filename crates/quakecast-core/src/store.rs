//! Record store seam used by the local strategy and the gateway.
//!
//! [`Warehouse`] calls are blocking, so the implementation here moves each one
//! onto tokio's blocking pool.

use std::future::Future;
use std::pin::Pin;

use quakecast_store::{TableRow, Warehouse, WarehouseError};

use crate::domain::{Record, RecordId, Stored};
use crate::GatewayError;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, GatewayError>> + Send + 'a>>;

/// Persistent collection of one record type.
pub trait RecordStore<R: Record>: Send + Sync {
    fn find_one<'a>(&'a self, id: &'a RecordId) -> StoreFuture<'a, Option<Stored<R>>>;

    /// Case-insensitive substring match on the record's location, in
    /// insertion order.
    fn find_matching<'a>(&'a self, fragment: &'a str) -> StoreFuture<'a, Vec<Stored<R>>>;

    /// Persist a new record. A taken identifier is
    /// [`GatewayError::DuplicateIdentifier`].
    fn insert<'a>(&'a self, record: R) -> StoreFuture<'a, Stored<R>>;

    fn delete_one<'a>(&'a self, id: &'a RecordId) -> StoreFuture<'a, Option<Stored<R>>>;
}

impl<R: Record> RecordStore<R> for Warehouse {
    fn find_one<'a>(&'a self, id: &'a RecordId) -> StoreFuture<'a, Option<Stored<R>>> {
        let warehouse = self.clone();
        let id = id.as_str().to_owned();
        Box::pin(async move {
            let row = blocking(move || warehouse.find_one::<R::Row>(&id)).await?;
            row.map(decode::<R>).transpose()
        })
    }

    fn find_matching<'a>(&'a self, fragment: &'a str) -> StoreFuture<'a, Vec<Stored<R>>> {
        let warehouse = self.clone();
        let fragment = fragment.to_owned();
        Box::pin(async move {
            let rows = blocking(move || warehouse.find_matching::<R::Row>(&fragment)).await?;
            rows.into_iter().map(decode::<R>).collect()
        })
    }

    fn insert<'a>(&'a self, record: R) -> StoreFuture<'a, Stored<R>> {
        let warehouse = self.clone();
        Box::pin(async move {
            let row = record.to_row();
            let stored = blocking(move || warehouse.insert(row)).await?;
            Ok(Stored {
                storage_id: stored.storage_id().to_owned(),
                record,
            })
        })
    }

    fn delete_one<'a>(&'a self, id: &'a RecordId) -> StoreFuture<'a, Option<Stored<R>>> {
        let warehouse = self.clone();
        let id = id.as_str().to_owned();
        Box::pin(async move {
            let row = blocking(move || warehouse.delete_one::<R::Row>(&id)).await?;
            row.map(decode::<R>).transpose()
        })
    }
}

async fn blocking<T, F>(operation: F) -> Result<T, GatewayError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, WarehouseError> + Send + 'static,
{
    tokio::task::spawn_blocking(operation)
        .await
        .map_err(|error| GatewayError::Store(format!("store task failed: {error}")))?
        .map_err(GatewayError::from)
}

fn decode<R: Record>(row: R::Row) -> Result<Stored<R>, GatewayError> {
    R::from_row(row).map_err(|error| GatewayError::Store(format!("stored row is invalid: {error}")))
}

impl From<WarehouseError> for GatewayError {
    fn from(error: WarehouseError) -> Self {
        match error {
            WarehouseError::DuplicateId { id } => Self::DuplicateIdentifier { id },
            other if other.is_unavailable() => Self::StoreUnavailable(other.to_string()),
            other => Self::Store(other.to_string()),
        }
    }
}
