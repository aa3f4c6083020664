use std::sync::Arc;

use crate::adapters::{Coordinates, RestCountriesGeocoder, Upstream};
use crate::domain::SeismicEvent;
use crate::http_client::HttpClient;
use crate::strategy::{CapabilitySet, Retrieved, RetrievalStrategy, StrategyFuture};

pub const USGS_QUERY_URL: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";

/// USGS FDSN event search around a country's coordinates.
pub struct UsgsAdapter {
    geocoder: Arc<RestCountriesGeocoder>,
    upstream: Upstream,
}

impl UsgsAdapter {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        geocoder: Arc<RestCountriesGeocoder>,
        timeout_ms: u64,
    ) -> Self {
        Self {
            geocoder,
            upstream: Upstream::new("USGS", http_client, timeout_ms),
        }
    }

    fn query_url(coordinates: Coordinates) -> String {
        format!(
            "{USGS_QUERY_URL}?format=geojson&latitude={}&longitude={}&maxradius=180",
            coordinates.latitude, coordinates.longitude
        )
    }
}

impl RetrievalStrategy<SeismicEvent> for UsgsAdapter {
    fn key(&self) -> &'static str {
        self.upstream.provider()
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::location_only()
    }

    fn fetch_many<'a>(&'a self, location: &'a str) -> StrategyFuture<'a, Retrieved<SeismicEvent>> {
        Box::pin(async move {
            let coordinates = self.geocoder.resolve(location).await?;
            let payload = self.upstream.get_json(Self::query_url(coordinates)).await?;
            Ok(Retrieved::Payload(payload))
        })
    }
}
