use std::sync::Arc;

use crate::domain::{Record, RecordId, Stored};
use crate::store::RecordStore;
use crate::strategy::{CapabilitySet, Retrieved, RetrievalStrategy, StrategyFuture};

/// Strategy answering from the system's own record store.
pub struct LocalAdapter<R: Record> {
    store: Arc<dyn RecordStore<R>>,
}

impl<R: Record> LocalAdapter<R> {
    pub const KEY: &'static str = "local";

    pub fn new(store: Arc<dyn RecordStore<R>>) -> Self {
        Self { store }
    }
}

impl<R: Record> RetrievalStrategy<R> for LocalAdapter<R> {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::full()
    }

    fn fetch_one<'a>(&'a self, id: &'a RecordId) -> StrategyFuture<'a, Option<Stored<R>>> {
        self.store.find_one(id)
    }

    fn fetch_many<'a>(&'a self, location: &'a str) -> StrategyFuture<'a, Retrieved<R>> {
        Box::pin(async move {
            let records = self.store.find_matching(location).await?;
            Ok(Retrieved::Records(records))
        })
    }
}
