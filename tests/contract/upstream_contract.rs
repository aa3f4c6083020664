use std::sync::Arc;

use quakecast_core::adapters::{
    EMSC_SEARCH_URL, OPENWEATHERMAP_CURRENT_URL, RESTCOUNTRIES_NAME_URL, USGS_QUERY_URL,
    WEATHERAPI_CURRENT_URL,
};
use quakecast_core::{
    EmscAdapter, GatewayErrorKind, HttpClient, HttpError, HttpResponse, Lookup,
    OpenWeatherMapAdapter, Record, RecordId, RestCountriesGeocoder, Retrieved, RetrievalStrategy,
    ScriptedHttpClient, SeismicEvent, UsgsAdapter, WeatherApiAdapter, WeatherObservation,
};
use serde_json::json;

const TIMEOUT_MS: u64 = 1_000;
const CHILE_LATLNG: &str = r#"[{"latlng":[-30.0,-71.0]}]"#;

type Build<R> = fn(Arc<dyn HttpClient>) -> Arc<dyn RetrievalStrategy<R>>;

struct UpstreamCase<R: Record> {
    key: &'static str,
    provider_url: &'static str,
    needs_geocoding: bool,
    build: Build<R>,
}

impl<R: Record> UpstreamCase<R> {
    fn script(&self) -> ScriptedHttpClient {
        if self.needs_geocoding {
            ScriptedHttpClient::new()
                .respond(RESTCOUNTRIES_NAME_URL, HttpResponse::ok_json(CHILE_LATLNG))
        } else {
            ScriptedHttpClient::new()
        }
    }

    fn strategy(
        &self,
        client: ScriptedHttpClient,
    ) -> (Arc<ScriptedHttpClient>, Arc<dyn RetrievalStrategy<R>>) {
        let client = Arc::new(client);
        let strategy = (self.build)(client.clone());
        (client, strategy)
    }

    fn provider_requests(&self, client: &ScriptedHttpClient) -> usize {
        client
            .requests()
            .iter()
            .filter(|request| request.url.starts_with(self.provider_url))
            .count()
    }
}

fn geocoder(client: &Arc<dyn HttpClient>) -> Arc<RestCountriesGeocoder> {
    Arc::new(RestCountriesGeocoder::new(Arc::clone(client), TIMEOUT_MS))
}

fn seismic_cases() -> Vec<UpstreamCase<SeismicEvent>> {
    vec![
        UpstreamCase {
            key: "USGS",
            provider_url: USGS_QUERY_URL,
            needs_geocoding: true,
            build: |client| {
                Arc::new(UsgsAdapter::new(Arc::clone(&client), geocoder(&client), TIMEOUT_MS))
            },
        },
        UpstreamCase {
            key: "EMSC",
            provider_url: EMSC_SEARCH_URL,
            needs_geocoding: true,
            build: |client| {
                Arc::new(EmscAdapter::new(Arc::clone(&client), geocoder(&client), TIMEOUT_MS))
            },
        },
    ]
}

fn weather_cases() -> Vec<UpstreamCase<WeatherObservation>> {
    vec![
        UpstreamCase {
            key: "OpenWeatherMap",
            provider_url: OPENWEATHERMAP_CURRENT_URL,
            needs_geocoding: false,
            build: |client| {
                Arc::new(OpenWeatherMapAdapter::new(
                    client,
                    Some(String::from("contract-key")),
                    TIMEOUT_MS,
                ))
            },
        },
        UpstreamCase {
            key: "WeatherAPI",
            provider_url: WEATHERAPI_CURRENT_URL,
            needs_geocoding: false,
            build: |client| {
                Arc::new(WeatherApiAdapter::new(
                    client,
                    Some(String::from("contract-key")),
                    TIMEOUT_MS,
                ))
            },
        },
    ]
}

async fn assert_upstream_contract<R: Record + std::fmt::Debug + PartialEq>(case: &UpstreamCase<R>, id: &str) {
    // Key and capabilities
    let (_, strategy) = case.strategy(case.script());
    assert_eq!(strategy.key(), case.key);
    assert!(strategy.capabilities().supports(Lookup::ByLocation), "{}", case.key);
    assert!(!strategy.capabilities().supports(Lookup::ById), "{}", case.key);

    // Identifier lookups are refused without touching the network
    let (client, strategy) = case.strategy(case.script());
    let id = RecordId::parse(R::KIND, id).expect("valid id");
    let error = strategy.fetch_one(&id).await.expect_err("by-id must be unsupported");
    assert_eq!(error.kind(), GatewayErrorKind::UnsupportedLookup, "{}", case.key);
    assert!(client.requests().is_empty(), "{}", case.key);

    // Payloads pass through unmodified
    let payload = json!({"provider": case.key, "items": [1, 2, 3]});
    let (_, strategy) = case.strategy(
        case.script()
            .respond(case.provider_url, HttpResponse::ok_json(payload.to_string())),
    );
    let retrieved = strategy.fetch_many("Chile").await.expect("payload");
    assert_eq!(retrieved, Retrieved::Payload(payload), "{}", case.key);

    // A non-JSON body is a fetch error
    let (_, strategy) = case.strategy(
        case.script()
            .respond(case.provider_url, HttpResponse::ok_json("<html>busy</html>")),
    );
    let error = strategy.fetch_many("Chile").await.expect_err("non-JSON");
    assert_eq!(error.kind(), GatewayErrorKind::UpstreamFetchError, "{}", case.key);

    // Every call is attempted, however many failed before it
    let (client, strategy) = case.strategy(
        case.script()
            .fail(case.provider_url, HttpError::timeout("timed out")),
    );
    for attempt in 1..=4 {
        let error = strategy.fetch_many("Chile").await.expect_err("timeout");
        assert_eq!(error.kind(), GatewayErrorKind::UpstreamFetchError, "{}", case.key);
        assert!(error.to_string().contains("transport error"), "{}", case.key);
        assert_eq!(case.provider_requests(&client), attempt, "{}", case.key);
    }
}

#[tokio::test]
async fn seismic_providers_satisfy_the_upstream_contract() {
    for case in seismic_cases() {
        assert_upstream_contract(&case, "sismo_1").await;
    }
}

#[tokio::test]
async fn weather_providers_satisfy_the_upstream_contract() {
    for case in weather_cases() {
        assert_upstream_contract(&case, "clima_1").await;
    }
}

#[tokio::test]
async fn provider_urls_percent_encode_caller_text() {
    let client = Arc::new(
        ScriptedHttpClient::new()
            .respond(RESTCOUNTRIES_NAME_URL, HttpResponse::ok_json(CHILE_LATLNG))
            .respond(OPENWEATHERMAP_CURRENT_URL, HttpResponse::ok_json("{}"))
            .respond(WEATHERAPI_CURRENT_URL, HttpResponse::ok_json("{}")),
    );
    let http: Arc<dyn HttpClient> = client.clone();

    let usgs = UsgsAdapter::new(Arc::clone(&http), geocoder(&http), TIMEOUT_MS);
    let owm = OpenWeatherMapAdapter::new(Arc::clone(&http), Some(String::from("k&y")), TIMEOUT_MS);
    let wapi = WeatherApiAdapter::new(http, Some(String::from("key")), TIMEOUT_MS);

    usgs.fetch_many("New Zealand").await.expect("usgs");
    owm.fetch_many("São Paulo&x=1").await.expect("owm");
    wapi.fetch_many("Buenos Aires").await.expect("weatherapi");

    let urls = client
        .requests()
        .into_iter()
        .map(|request| request.url)
        .collect::<Vec<_>>();
    assert_eq!(urls[0], format!("{RESTCOUNTRIES_NAME_URL}/New%20Zealand"));
    assert!(urls[2].contains("q=S%C3%A3o%20Paulo%26x%3D1"));
    assert!(urls[2].contains("appid=k%26y"));
    assert!(urls[3].contains("q=Buenos%20Aires"));
}
