//! Retrieval strategy contract.
//!
//! A strategy is one way of answering lookups for a record domain: the local
//! store, or a named third-party provider. Each strategy is bound to the
//! source key callers use to select it.
//!
//! | Lookup | Method | Local store | Remote provider |
//! |--------|--------|-------------|-----------------|
//! | By identifier | [`RetrievalStrategy::fetch_one`] | record or absent | unsupported |
//! | By location | [`RetrievalStrategy::fetch_many`] | matching records | raw provider payload |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::domain::{Record, RecordId, Stored};
use crate::GatewayError;

pub type StrategyFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, GatewayError>> + Send + 'a>>;

/// Lookup shape used for capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    ById,
    ByLocation,
}

impl Lookup {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ById => "identifier",
            Self::ByLocation => "location",
        }
    }
}

impl Display for Lookup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookups a strategy can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilitySet {
    pub by_id: bool,
    pub by_location: bool,
}

impl CapabilitySet {
    pub const fn new(by_id: bool, by_location: bool) -> Self {
        Self { by_id, by_location }
    }

    pub const fn full() -> Self {
        Self::new(true, true)
    }

    pub const fn location_only() -> Self {
        Self::new(false, true)
    }

    pub const fn supports(self, lookup: Lookup) -> bool {
        match lookup {
            Lookup::ById => self.by_id,
            Lookup::ByLocation => self.by_location,
        }
    }
}

/// Result of a by-location lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieved<R> {
    /// Records from the local store, in insertion order. May be empty.
    Records(Vec<Stored<R>>),
    /// A provider's JSON payload, unmodified.
    Payload(Value),
}

/// One retrieval implementation bound to a source key.
pub trait RetrievalStrategy<R: Record>: Send + Sync {
    /// Source key callers use to select this strategy. Case-sensitive.
    fn key(&self) -> &'static str;

    fn capabilities(&self) -> CapabilitySet;

    /// Exact lookup by identifier. `Ok(None)` means the record is absent.
    fn fetch_one<'a>(&'a self, id: &'a RecordId) -> StrategyFuture<'a, Option<Stored<R>>> {
        let _ = id;
        let key = self.key();
        Box::pin(async move { Err(GatewayError::unsupported(key, Lookup::ById)) })
    }

    /// Lookup by location name or fragment.
    fn fetch_many<'a>(&'a self, location: &'a str) -> StrategyFuture<'a, Retrieved<R>>;
}

impl GatewayError {
    pub const fn unsupported(source_key: &'static str, lookup: Lookup) -> Self {
        Self::UnsupportedLookup {
            source_key,
            lookup: lookup.as_str(),
        }
    }
}
