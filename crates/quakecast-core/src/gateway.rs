//! Source-routed retrieval gateway.
//!
//! Each operation runs validation, source resolution, strategy execution and
//! normalization in that order. A failure at any step short-circuits to the
//! normalizer, so every call ends in a [`GatewayResponse`].
//!
//! ```rust,ignore
//! use quakecast_core::{Gateway, GatewayConfig};
//! use quakecast_store::Warehouse;
//!
//! let gateway = Gateway::open(Warehouse::open_default()?, GatewayConfig::from_env()?);
//! let response = gateway.earthquakes.get_by_source("USGS", Some("Chile")).await;
//! assert_eq!(response.status, 200);
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use quakecast_store::Warehouse;
use serde_json::{json, Value};

use crate::adapters::LocalAdapter;
use crate::config::GatewayConfig;
use crate::domain::{Record, RecordId, RecordKind, SeismicEvent, WeatherObservation};
use crate::http_client::HttpClient;
use crate::normalizer::{normalize, GatewayResponse, Outcome};
use crate::registry::{SourceRegistry, Sources, SourcesBuilder};
use crate::store::RecordStore;
use crate::strategy::{Lookup, Retrieved};
use crate::{GatewayError, GatewayErrorKind, ValidationError};

/// Gateway operations for one record domain.
pub struct RecordGateway<R: Record> {
    registry: SourceRegistry<R>,
    store: Arc<dyn RecordStore<R>>,
    strategy_timeout: Duration,
}

impl<R: Record> RecordGateway<R> {
    pub fn new(
        registry: SourceRegistry<R>,
        store: Arc<dyn RecordStore<R>>,
        strategy_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            store,
            strategy_timeout,
        }
    }

    pub const fn kind(&self) -> RecordKind {
        R::KIND
    }

    pub fn source_keys(&self) -> Vec<&'static str> {
        self.registry.keys()
    }

    /// Validate and persist a new record from a JSON body.
    pub async fn create(&self, body: Value) -> GatewayResponse {
        let result: Result<Outcome<R>, GatewayError> = async {
            let record = R::from_json(body)?;
            tracing::debug!(
                kind = %R::KIND,
                id = %record.id(),
                location = record.location(),
                "creating record"
            );
            let stored = self.store.insert(record).await?;
            Ok(Outcome::Created(stored))
        }
        .await;

        self.respond("create", result)
    }

    /// Delete a record by identifier.
    pub async fn delete(&self, id: &str) -> GatewayResponse {
        let result: Result<Outcome<R>, GatewayError> = async {
            let id = RecordId::parse(R::KIND, id)?;
            match self.store.delete_one(&id).await? {
                Some(deleted) => Ok(Outcome::Deleted(deleted)),
                None => Ok(Outcome::NothingToDelete),
            }
        }
        .await;

        self.respond("delete", result)
    }

    /// Location lookup against the source selected by `source_key`.
    ///
    /// A missing or empty location is a validation failure.
    pub async fn get_by_source(&self, source_key: &str, location: Option<&str>) -> GatewayResponse {
        let result: Result<Outcome<R>, GatewayError> = async {
            let location = location.filter(|location| !location.is_empty()).ok_or(
                ValidationError::MissingLocation {
                    param: "location",
                },
            )?;
            let strategy = self.registry.resolve(source_key)?;
            if !strategy.capabilities().supports(Lookup::ByLocation) {
                return Err(GatewayError::unsupported(strategy.key(), Lookup::ByLocation));
            }

            let retrieved = self.bounded(strategy.key(), strategy.fetch_many(location)).await?;
            Ok(match retrieved {
                Retrieved::Records(records) => Outcome::Collection(records),
                Retrieved::Payload(payload) => Outcome::Payload(payload),
            })
        }
        .await;

        self.respond("get_by_source", result)
    }

    /// Local store collection lookup by location fragment.
    pub async fn history(&self, location: &str) -> GatewayResponse {
        let result: Result<Outcome<R>, GatewayError> = async {
            let records = self
                .bounded(LocalAdapter::<R>::KEY, self.store.find_matching(location))
                .await?;
            Ok(Outcome::Collection(records))
        }
        .await;

        self.respond("history", result)
    }

    /// Identifier lookup against the source selected by `source_key`.
    pub async fn get_by_id(&self, source_key: &str, id: &str) -> GatewayResponse {
        let result: Result<Outcome<R>, GatewayError> = async {
            let id = RecordId::parse(R::KIND, id)?;
            let strategy = self.registry.resolve(source_key)?;
            if !strategy.capabilities().supports(Lookup::ById) {
                return Err(GatewayError::unsupported(strategy.key(), Lookup::ById));
            }

            match self.bounded(strategy.key(), strategy.fetch_one(&id)).await? {
                Some(record) => Ok(Outcome::Found(record)),
                None => Ok(Outcome::Absent),
            }
        }
        .await;

        self.respond("get_by_id", result)
    }

    /// Run `execution` under the strategy timeout. Expiry on the local
    /// source is a store failure; on any other source it is a fetch failure.
    async fn bounded<T>(
        &self,
        source_key: &str,
        execution: impl Future<Output = Result<T, GatewayError>>,
    ) -> Result<T, GatewayError> {
        let Ok(result) = tokio::time::timeout(self.strategy_timeout, execution).await else {
            let waited = self.strategy_timeout.as_millis();
            return Err(if source_key == LocalAdapter::<R>::KEY {
                GatewayError::StoreUnavailable(format!("no answer within {waited} ms"))
            } else {
                GatewayError::UpstreamFetch(format!(
                    "source '{source_key}' did not answer within {waited} ms"
                ))
            });
        };
        result
    }

    fn respond(
        &self,
        operation: &'static str,
        result: Result<Outcome<R>, GatewayError>,
    ) -> GatewayResponse {
        if let Err(error) = &result {
            let kind = R::KIND.noun();
            let code = error.code();
            match error.kind() {
                GatewayErrorKind::StoreError => {
                    tracing::error!(kind, operation, code, %error, "store failure");
                }
                GatewayErrorKind::UpstreamFetchError
                | GatewayErrorKind::UpstreamResolutionError => {
                    tracing::warn!(kind, operation, code, %error, "upstream failure");
                }
                _ => {
                    tracing::debug!(kind, operation, code, %error, "request rejected");
                }
            }
        }

        normalize(R::KIND, result)
    }
}

/// Gateway for both record domains.
pub struct Gateway {
    pub earthquakes: Arc<RecordGateway<SeismicEvent>>,
    pub weather: Arc<RecordGateway<WeatherObservation>>,
}

impl Gateway {
    /// Assemble a gateway from prebuilt registries and stores.
    pub fn new(
        sources: Sources,
        seismic_store: Arc<dyn RecordStore<SeismicEvent>>,
        weather_store: Arc<dyn RecordStore<WeatherObservation>>,
        strategy_timeout: Duration,
    ) -> Self {
        Self {
            earthquakes: Arc::new(RecordGateway::new(
                sources.earthquakes,
                seismic_store,
                strategy_timeout,
            )),
            weather: Arc::new(RecordGateway::new(sources.weather, weather_store, strategy_timeout)),
        }
    }

    /// Standard gateway over a warehouse, calling providers through reqwest.
    pub fn open(warehouse: Warehouse, config: GatewayConfig) -> Self {
        Self::build(warehouse, config, SourcesBuilder::new)
    }

    /// Standard gateway over a warehouse with a specific transport.
    pub fn with_http_client(
        warehouse: Warehouse,
        config: GatewayConfig,
        http_client: Arc<dyn HttpClient>,
    ) -> Self {
        Self::build(warehouse, config, |config| {
            SourcesBuilder::new(config).with_http_client(http_client)
        })
    }

    fn build(
        warehouse: Warehouse,
        config: GatewayConfig,
        builder: impl FnOnce(GatewayConfig) -> SourcesBuilder,
    ) -> Self {
        let strategy_timeout = config.strategy_timeout();
        let warehouse = Arc::new(warehouse);
        let seismic_store: Arc<dyn RecordStore<SeismicEvent>> = warehouse.clone();
        let weather_store: Arc<dyn RecordStore<WeatherObservation>> = warehouse;
        let sources = builder(config).build(Arc::clone(&seismic_store), Arc::clone(&weather_store));

        Self::new(sources, seismic_store, weather_store, strategy_timeout)
    }

    /// Liveness plus the registered source keys of each domain.
    pub fn health(&self) -> GatewayResponse {
        GatewayResponse::new(
            200,
            json!({
                "status": "ok",
                "sources": {
                    "earthquakes": self.earthquakes.source_keys(),
                    "weather": self.weather.source_keys(),
                },
            }),
        )
    }
}
