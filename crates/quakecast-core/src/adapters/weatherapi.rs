use std::sync::Arc;

use crate::adapters::Upstream;
use crate::domain::WeatherObservation;
use crate::http_client::HttpClient;
use crate::strategy::{CapabilitySet, Retrieved, RetrievalStrategy, StrategyFuture};
use crate::GatewayError;

pub const WEATHERAPI_CURRENT_URL: &str = "https://api.weatherapi.com/v1/current.json";

/// WeatherAPI current conditions by city name.
pub struct WeatherApiAdapter {
    api_key: Option<String>,
    upstream: Upstream,
}

impl WeatherApiAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: Option<String>, timeout_ms: u64) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.is_empty()),
            upstream: Upstream::new("WeatherAPI", http_client, timeout_ms),
        }
    }
}

impl RetrievalStrategy<WeatherObservation> for WeatherApiAdapter {
    fn key(&self) -> &'static str {
        self.upstream.provider()
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::location_only()
    }

    fn fetch_many<'a>(
        &'a self,
        location: &'a str,
    ) -> StrategyFuture<'a, Retrieved<WeatherObservation>> {
        Box::pin(async move {
            let Some(api_key) = self.api_key.as_deref() else {
                return Err(GatewayError::UpstreamFetch(String::from(
                    "WeatherAPI API key is not configured",
                )));
            };

            let url = format!(
                "{WEATHERAPI_CURRENT_URL}?key={}&q={}",
                urlencoding::encode(api_key),
                urlencoding::encode(location)
            );
            let payload = self.upstream.get_json(url).await?;
            Ok(Retrieved::Payload(payload))
        })
    }
}
