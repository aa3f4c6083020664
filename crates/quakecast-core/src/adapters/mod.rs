//! Retrieval strategy implementations.
//!
//! | Adapter | Domain | Source key |
//! |---------|--------|------------|
//! | [`LocalAdapter`] | both | `local` |
//! | [`UsgsAdapter`] | seismic | `USGS` |
//! | [`EmscAdapter`] | seismic | `EMSC` |
//! | [`OpenWeatherMapAdapter`] | weather | `OpenWeatherMap` |
//! | [`WeatherApiAdapter`] | weather | `WeatherAPI` |
//!
//! Seismic providers are queried by coordinates, so their adapters first
//! resolve the location through [`RestCountriesGeocoder`].

mod emsc;
mod geocoding;
mod local;
mod openweathermap;
mod usgs;
mod weatherapi;

pub use emsc::{EmscAdapter, EMSC_SEARCH_URL};
pub use geocoding::{Coordinates, RestCountriesGeocoder, RESTCOUNTRIES_NAME_URL};
pub use local::LocalAdapter;
pub use openweathermap::{OpenWeatherMapAdapter, OPENWEATHERMAP_CURRENT_URL};
pub use usgs::{UsgsAdapter, USGS_QUERY_URL};
pub use weatherapi::{WeatherApiAdapter, WEATHERAPI_CURRENT_URL};

use std::sync::Arc;

use serde_json::Value;

use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::GatewayError;

/// Transport shared by the remote adapters. Holds no state between calls.
pub(crate) struct Upstream {
    provider: &'static str,
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

impl Upstream {
    pub(crate) fn new(
        provider: &'static str,
        http_client: Arc<dyn HttpClient>,
        timeout_ms: u64,
    ) -> Self {
        Self {
            provider,
            http_client,
            timeout_ms,
        }
    }

    pub(crate) const fn provider(&self) -> &'static str {
        self.provider
    }

    /// Issue a GET bounded by the per-call timeout.
    pub(crate) async fn get(&self, url: String) -> Result<HttpResponse, GatewayError> {
        let request = HttpRequest::get(url).with_timeout_ms(self.timeout_ms);
        self.http_client.execute(request).await.map_err(|error| {
            tracing::warn!(provider = self.provider, error = %error, "upstream transport failure");
            GatewayError::UpstreamFetch(format!(
                "{} transport error: {}",
                self.provider,
                error.message()
            ))
        })
    }

    /// Require a 2xx JSON answer.
    pub(crate) fn json_body(&self, response: &HttpResponse) -> Result<Value, GatewayError> {
        if !response.is_success() {
            tracing::warn!(
                provider = self.provider,
                status = response.status,
                "upstream returned error status"
            );
            return Err(GatewayError::UpstreamFetch(format!(
                "{} upstream returned status {}",
                self.provider, response.status
            )));
        }

        serde_json::from_str(&response.body).map_err(|e| {
            GatewayError::UpstreamFetch(format!("{} returned a non-JSON body: {e}", self.provider))
        })
    }

    pub(crate) async fn get_json(&self, url: String) -> Result<Value, GatewayError> {
        let response = self.get(url).await?;
        self.json_body(&response)
    }
}
