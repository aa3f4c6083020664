use std::collections::HashMap;
use std::sync::Arc;

use crate::adapters::{
    EmscAdapter, LocalAdapter, OpenWeatherMapAdapter, RestCountriesGeocoder, UsgsAdapter,
    WeatherApiAdapter,
};
use crate::config::GatewayConfig;
use crate::domain::{Record, SeismicEvent, WeatherObservation};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::store::RecordStore;
use crate::strategy::RetrievalStrategy;
use crate::GatewayError;

/// Per-domain mapping from source key to retrieval strategy.
///
/// Keys are matched exactly and case-sensitively. Registration order is kept
/// so error messages and health output list keys the way they were added.
pub struct SourceRegistry<R: Record> {
    strategies: Vec<Arc<dyn RetrievalStrategy<R>>>,
    index: HashMap<&'static str, usize>,
}

impl<R: Record> Default for SourceRegistry<R> {
    fn default() -> Self {
        Self {
            strategies: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<R: Record> SourceRegistry<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy under its key. Re-registering a key replaces the
    /// earlier strategy and keeps its position.
    pub fn register(&mut self, strategy: Arc<dyn RetrievalStrategy<R>>) {
        let key = strategy.key();
        match self.index.get(key) {
            Some(&position) => self.strategies[position] = strategy,
            None => {
                self.index.insert(key, self.strategies.len());
                self.strategies.push(strategy);
            }
        }
    }

    pub fn with(mut self, strategy: Arc<dyn RetrievalStrategy<R>>) -> Self {
        self.register(strategy);
        self
    }

    pub fn resolve(&self, source_key: &str) -> Result<Arc<dyn RetrievalStrategy<R>>, GatewayError> {
        self.index
            .get(source_key)
            .map(|&position| Arc::clone(&self.strategies[position]))
            .ok_or_else(|| GatewayError::InvalidSource {
                source_key: source_key.to_owned(),
                valid_sources: self.keys(),
            })
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|strategy| strategy.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

/// Registries for both domains.
pub struct Sources {
    pub earthquakes: SourceRegistry<SeismicEvent>,
    pub weather: SourceRegistry<WeatherObservation>,
}

/// Builds the standard source registries.
///
/// | Domain | Keys |
/// |--------|------|
/// | earthquakes | `local`, `USGS`, `EMSC` |
/// | weather | `local`, `OpenWeatherMap`, `WeatherAPI` |
///
/// # Example
///
/// ```rust,ignore
/// use quakecast_core::{GatewayConfig, SourcesBuilder};
///
/// let sources = SourcesBuilder::new(GatewayConfig::from_env()?)
///     .build(seismic_store, weather_store);
/// assert_eq!(sources.earthquakes.keys(), vec!["local", "USGS", "EMSC"]);
/// ```
pub struct SourcesBuilder {
    config: GatewayConfig,
    http_client: Option<Arc<dyn HttpClient>>,
}

impl SourcesBuilder {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            http_client: None,
        }
    }

    /// Use a specific transport instead of reqwest.
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn build(
        self,
        seismic_store: Arc<dyn RecordStore<SeismicEvent>>,
        weather_store: Arc<dyn RecordStore<WeatherObservation>>,
    ) -> Sources {
        let http_client = self
            .http_client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()) as Arc<dyn HttpClient>);
        let timeout_ms = self.config.upstream_timeout_ms;
        let geocoder = Arc::new(RestCountriesGeocoder::new(Arc::clone(&http_client), timeout_ms));

        tracing::info!(
            openweathermap_key = self.config.openweathermap_api_key.is_some(),
            weatherapi_key = self.config.weatherapi_api_key.is_some(),
            upstream_timeout_ms = timeout_ms,
            "building source registries"
        );

        let earthquakes = SourceRegistry::new()
            .with(Arc::new(LocalAdapter::new(seismic_store)))
            .with(Arc::new(UsgsAdapter::new(
                Arc::clone(&http_client),
                Arc::clone(&geocoder),
                timeout_ms,
            )))
            .with(Arc::new(EmscAdapter::new(
                Arc::clone(&http_client),
                geocoder,
                timeout_ms,
            )));

        let weather = SourceRegistry::new()
            .with(Arc::new(LocalAdapter::new(weather_store)))
            .with(Arc::new(OpenWeatherMapAdapter::new(
                Arc::clone(&http_client),
                self.config.openweathermap_api_key,
                timeout_ms,
            )))
            .with(Arc::new(WeatherApiAdapter::new(
                http_client,
                self.config.weatherapi_api_key,
                timeout_ms,
            )));

        Sources { earthquakes, weather }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RecordId, Stored};
    use crate::http_client::ScriptedHttpClient;
    use crate::store::StoreFuture;
    use crate::GatewayErrorKind;

    struct EmptyStore;

    impl<R: Record> RecordStore<R> for EmptyStore {
        fn find_one<'a>(&'a self, _id: &'a RecordId) -> StoreFuture<'a, Option<Stored<R>>> {
            Box::pin(async { Ok(None) })
        }

        fn find_matching<'a>(&'a self, _fragment: &'a str) -> StoreFuture<'a, Vec<Stored<R>>> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn insert<'a>(&'a self, _record: R) -> StoreFuture<'a, Stored<R>> {
            Box::pin(async { Err(GatewayError::Store(String::from("read-only"))) })
        }

        fn delete_one<'a>(&'a self, _id: &'a RecordId) -> StoreFuture<'a, Option<Stored<R>>> {
            Box::pin(async { Ok(None) })
        }
    }

    fn sources() -> Sources {
        let store = Arc::new(EmptyStore);
        SourcesBuilder::new(GatewayConfig::default())
            .with_http_client(Arc::new(ScriptedHttpClient::new()))
            .build(store.clone(), store)
    }

    #[test]
    fn registries_list_keys_in_registration_order() {
        let sources = sources();

        assert_eq!(sources.earthquakes.keys(), vec!["local", "USGS", "EMSC"]);
        assert_eq!(
            sources.weather.keys(),
            vec!["local", "OpenWeatherMap", "WeatherAPI"]
        );
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let sources = sources();

        assert!(sources.earthquakes.resolve("USGS").is_ok());
        let err = sources.earthquakes.resolve("usgs").err().expect("must fail");
        assert_eq!(err.kind(), GatewayErrorKind::InvalidSource);
        let err = sources.weather.resolve("Local").err().expect("must fail");
        assert!(matches!(
            err,
            GatewayError::InvalidSource { ref valid_sources, .. }
                if valid_sources == &vec!["local", "OpenWeatherMap", "WeatherAPI"]
        ));
    }

    #[test]
    fn re_registering_a_key_replaces_in_place() {
        let store: Arc<dyn RecordStore<SeismicEvent>> = Arc::new(EmptyStore);
        let mut registry = sources().earthquakes;
        registry.register(Arc::new(LocalAdapter::new(store)));

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.keys(), vec!["local", "USGS", "EMSC"]);
    }
}
