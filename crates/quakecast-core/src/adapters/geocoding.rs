use std::sync::Arc;

use serde_json::Value;

use crate::adapters::Upstream;
use crate::http_client::HttpClient;
use crate::GatewayError;

pub const RESTCOUNTRIES_NAME_URL: &str = "https://restcountries.com/v3.1/name";

/// A resolved latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Resolves a country name to coordinates through restcountries.
pub struct RestCountriesGeocoder {
    upstream: Upstream,
}

impl RestCountriesGeocoder {
    pub fn new(http_client: Arc<dyn HttpClient>, timeout_ms: u64) -> Self {
        Self {
            upstream: Upstream::new("restcountries", http_client, timeout_ms),
        }
    }

    /// Resolve `location` to the coordinates of the first matching country.
    ///
    /// A 404 answer, an empty match list, or a match without a `latlng` pair
    /// is a resolution error. Any other failure is a fetch error.
    pub async fn resolve(&self, location: &str) -> Result<Coordinates, GatewayError> {
        let url = format!("{RESTCOUNTRIES_NAME_URL}/{}", urlencoding::encode(location));
        let response = self.upstream.get(url).await?;
        if response.status == 404 {
            return Err(unresolved(location));
        }

        let payload = self.upstream.json_body(&response)?;
        let coordinates = payload
            .as_array()
            .and_then(|matches| matches.first())
            .and_then(|first| first.get("latlng"))
            .and_then(latlng_pair);

        match coordinates {
            Some(coordinates) => {
                tracing::debug!(location, ?coordinates, "location resolved");
                Ok(coordinates)
            }
            None => Err(unresolved(location)),
        }
    }
}

fn latlng_pair(value: &Value) -> Option<Coordinates> {
    let pair = value.as_array()?;
    let latitude = pair.first()?.as_f64()?;
    let longitude = pair.get(1)?.as_f64()?;
    Some(Coordinates {
        latitude,
        longitude,
    })
}

fn unresolved(location: &str) -> GatewayError {
    GatewayError::UpstreamResolution(format!("location '{location}' is not a recognized country"))
}
