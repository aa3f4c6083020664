use std::sync::Arc;

use crate::adapters::Upstream;
use crate::domain::WeatherObservation;
use crate::http_client::HttpClient;
use crate::strategy::{CapabilitySet, Retrieved, RetrievalStrategy, StrategyFuture};
use crate::GatewayError;

pub const OPENWEATHERMAP_CURRENT_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// OpenWeatherMap current weather by city name, metric units.
pub struct OpenWeatherMapAdapter {
    api_key: Option<String>,
    upstream: Upstream,
}

impl OpenWeatherMapAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: Option<String>, timeout_ms: u64) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.is_empty()),
            upstream: Upstream::new("OpenWeatherMap", http_client, timeout_ms),
        }
    }
}

impl RetrievalStrategy<WeatherObservation> for OpenWeatherMapAdapter {
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
                    "OpenWeatherMap API key is not configured",
                )));
            };

            let url = format!(
                "{OPENWEATHERMAP_CURRENT_URL}?q={}&appid={}&units=metric",
                urlencoding::encode(location),
                urlencoding::encode(api_key)
            );
            let payload = self.upstream.get_json(url).await?;
            Ok(Retrieved::Payload(payload))
        })
    }
}
