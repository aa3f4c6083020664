use std::sync::Arc;

use crate::adapters::{Coordinates, RestCountriesGeocoder, Upstream};
use crate::domain::SeismicEvent;
use crate::http_client::HttpClient;
use crate::strategy::{CapabilitySet, Retrieved, RetrievalStrategy, StrategyFuture};

pub const EMSC_SEARCH_URL: &str = "http://www.seismicportal.eu/testimonies-ws/api/search";

/// EMSC seismic portal radius search around a country's coordinates.
pub struct EmscAdapter {
    geocoder: Arc<RestCountriesGeocoder>,
    upstream: Upstream,
}

impl EmscAdapter {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        geocoder: Arc<RestCountriesGeocoder>,
        timeout_ms: u64,
    ) -> Self {
        Self {
            geocoder,
            upstream: Upstream::new("EMSC", http_client, timeout_ms),
        }
    }

    fn search_url(coordinates: Coordinates) -> String {
        format!(
            "{EMSC_SEARCH_URL}?lat={}&lon={}&minradius=0.1&maxradius=180&format=json&limit=10",
            coordinates.latitude, coordinates.longitude
        )
    }
}

impl RetrievalStrategy<SeismicEvent> for EmscAdapter {
    fn key(&self) -> &'static str {
        self.upstream.provider()
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::location_only()
    }

    fn fetch_many<'a>(&'a self, location: &'a str) -> StrategyFuture<'a, Retrieved<SeismicEvent>> {
        Box::pin(async move {
            let coordinates = self.geocoder.resolve(location).await?;
            let payload = self.upstream.get_json(Self::search_url(coordinates)).await?;
            Ok(Retrieved::Payload(payload))
        })
    }
}
