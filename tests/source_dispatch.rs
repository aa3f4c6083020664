//! Behavior-driven tests for source resolution and remote dispatch
//!
//! Providers are answered by a scripted HTTP client so these tests never
//! leave the process.

use std::sync::Arc;
use std::time::Duration;

use quakecast_core::adapters::{
    EMSC_SEARCH_URL, OPENWEATHERMAP_CURRENT_URL, RESTCOUNTRIES_NAME_URL, USGS_QUERY_URL,
    WEATHERAPI_CURRENT_URL,
};
use quakecast_core::{
    Gateway, GatewayConfig, GatewayResponse, HttpError, HttpResponse, ScriptedHttpClient,
};
use quakecast_store::{Warehouse, WarehouseConfig};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};

const CHILE_LATLNG: &str = r#"[{"name":{"common":"Chile"},"latlng":[-30.0,-71.0]}]"#;

fn gateway_with(
    client: ScriptedHttpClient,
    config: GatewayConfig,
) -> (TempDir, Arc<ScriptedHttpClient>, Gateway) {
    let temp = tempdir().expect("tempdir");
    let warehouse = Warehouse::open(WarehouseConfig::at_path(temp.path().join("dispatch.duckdb")))
        .expect("warehouse open");
    let client = Arc::new(client);
    let gateway = Gateway::with_http_client(warehouse, config, client.clone());
    (temp, client, gateway)
}

fn keyed_config() -> GatewayConfig {
    GatewayConfig::default()
        .with_openweathermap_key("owm-test-key")
        .with_weatherapi_key("wapi-test-key")
}

fn body(response: &GatewayResponse) -> &Value {
    response.body.as_ref().expect("response should carry a body")
}

fn message(response: &GatewayResponse) -> &str {
    body(response)["message"]
        .as_str()
        .expect("error body should carry a message")
}

// =============================================================================
// Source Resolution
// =============================================================================

#[tokio::test]
async fn when_source_is_unknown_the_valid_sources_are_listed() {
    // Given: A gateway with the standard registries
    let (_temp, client, gateway) = gateway_with(ScriptedHttpClient::new(), keyed_config());

    // When: The caller names a source that is not registered
    let quakes = gateway.earthquakes.get_by_source("NOAA", Some("Chile")).await;
    let weather = gateway.weather.get_by_id("AccuWeather", "clima_1").await;

    // Then: Each domain lists its own keys in registration order
    assert_eq!(quakes.status, 400);
    assert_eq!(body(&quakes)["valid_sources"], json!(["local", "USGS", "EMSC"]));
    assert_eq!(weather.status, 400);
    assert_eq!(
        body(&weather)["valid_sources"],
        json!(["local", "OpenWeatherMap", "WeatherAPI"])
    );

    // And: No provider was contacted
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn when_source_key_differs_only_by_case_it_is_rejected() {
    let (_temp, _client, gateway) = gateway_with(ScriptedHttpClient::new(), keyed_config());

    for key in ["Local", "LOCAL", "usgs", "emsc"] {
        let response = gateway.earthquakes.get_by_source(key, Some("Chile")).await;
        assert_eq!(response.status, 400, "key {key} should not resolve");
        assert!(message(&response).contains(key));
    }
}

#[tokio::test]
async fn when_seismic_source_is_asked_for_weather_it_is_unknown() {
    let (_temp, _client, gateway) = gateway_with(ScriptedHttpClient::new(), keyed_config());

    let response = gateway.weather.get_by_source("USGS", Some("Chile")).await;

    assert_eq!(response.status, 400);
    assert_eq!(
        message(&response),
        "invalid source 'USGS', valid sources are: local, OpenWeatherMap, WeatherAPI"
    );
}

#[tokio::test]
async fn health_reports_registered_sources_per_domain() {
    let (_temp, _client, gateway) = gateway_with(ScriptedHttpClient::new(), keyed_config());

    let response = gateway.health();

    assert_eq!(
        response,
        GatewayResponse::new(
            200,
            json!({
                "status": "ok",
                "sources": {
                    "earthquakes": ["local", "USGS", "EMSC"],
                    "weather": ["local", "OpenWeatherMap", "WeatherAPI"],
                },
            })
        )
    );
}

// =============================================================================
// Remote Dispatch: Seismic
// =============================================================================

#[tokio::test]
async fn when_usgs_is_selected_its_payload_is_returned_unmodified() {
    // Given: restcountries resolves Chile and USGS answers with GeoJSON
    let payload = json!({
        "type": "FeatureCollection",
        "metadata": {"count": 1},
        "features": [{"id": "us7000abcd", "properties": {"mag": 6.1}}]
    });
    let (_temp, client, gateway) = gateway_with(
        ScriptedHttpClient::new()
            .respond(RESTCOUNTRIES_NAME_URL, HttpResponse::ok_json(CHILE_LATLNG))
            .respond(USGS_QUERY_URL, HttpResponse::ok_json(payload.to_string())),
        keyed_config(),
    );

    // When: The caller asks USGS for Chile
    let response = gateway.earthquakes.get_by_source("USGS", Some("Chile")).await;

    // Then: The provider payload comes back as-is
    assert_eq!(response, GatewayResponse::new(200, payload));

    // And: The geocoder ran before the provider
    let urls = client
        .requests()
        .into_iter()
        .map(|request| request.url)
        .collect::<Vec<_>>();
    assert_eq!(urls.len(), 2);
    assert!(urls[0].starts_with(RESTCOUNTRIES_NAME_URL));
    assert!(urls[1].starts_with(USGS_QUERY_URL));
}

#[tokio::test]
async fn when_emsc_is_selected_the_resolved_coordinates_are_used() {
    let (_temp, client, gateway) = gateway_with(
        ScriptedHttpClient::new()
            .respond(RESTCOUNTRIES_NAME_URL, HttpResponse::ok_json(CHILE_LATLNG))
            .respond(EMSC_SEARCH_URL, HttpResponse::ok_json(r#"{"results":[]}"#)),
        keyed_config(),
    );

    let response = gateway.earthquakes.get_by_source("EMSC", Some("Chile")).await;

    assert_eq!(response, GatewayResponse::new(200, json!({"results": []})));
    let emsc = client
        .requests()
        .into_iter()
        .find(|request| request.url.starts_with(EMSC_SEARCH_URL))
        .expect("EMSC request");
    assert!(emsc.url.contains("lat=-30"));
    assert!(emsc.url.contains("lon=-71"));
}

#[tokio::test]
async fn when_location_cannot_be_resolved_the_provider_is_not_called() {
    // Given: restcountries does not know the location
    let (_temp, client, gateway) = gateway_with(
        ScriptedHttpClient::new()
            .respond(RESTCOUNTRIES_NAME_URL, HttpResponse::with_status(404, r#"{"status":404}"#)),
        keyed_config(),
    );

    // When: USGS is asked for it
    let response = gateway.earthquakes.get_by_source("USGS", Some("Atlantis")).await;

    // Then: The caller sees a server-side resolution error
    assert_eq!(response.status, 500);
    assert!(message(&response).starts_with("could not resolve location"));
    assert!(client
        .requests()
        .iter()
        .all(|request| !request.url.starts_with(USGS_QUERY_URL)));
}

#[tokio::test]
async fn when_a_remote_source_is_asked_for_an_identifier_it_is_unsupported() {
    let (_temp, client, gateway) = gateway_with(ScriptedHttpClient::new(), keyed_config());

    let quake = gateway.earthquakes.get_by_id("USGS", "sismo_1").await;
    let weather = gateway.weather.get_by_id("WeatherAPI", "clima_1").await;

    assert_eq!(quake.status, 400);
    assert_eq!(message(&quake), "source 'USGS' does not support identifier lookups");
    assert_eq!(weather.status, 400);
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn when_identifier_is_malformed_the_source_is_never_resolved() {
    let (_temp, _client, gateway) = gateway_with(ScriptedHttpClient::new(), keyed_config());

    let response = gateway.earthquakes.get_by_id("NOAA", "quake_1").await;

    assert_eq!(response.status, 400);
    assert_eq!(
        message(&response),
        "incorrect id format, HINT: correct format sismo_{number}"
    );
}

// =============================================================================
// Remote Dispatch: Weather
// =============================================================================

#[tokio::test]
async fn when_openweathermap_is_selected_the_city_and_key_are_sent() {
    let payload = json!({"name": "Caracas", "main": {"temp": 30.7, "humidity": 82}});
    let (_temp, client, gateway) = gateway_with(
        ScriptedHttpClient::new()
            .respond(OPENWEATHERMAP_CURRENT_URL, HttpResponse::ok_json(payload.to_string())),
        keyed_config(),
    );

    let response = gateway.weather.get_by_source("OpenWeatherMap", Some("Caracas")).await;

    assert_eq!(response, GatewayResponse::new(200, payload));
    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.contains("q=Caracas"));
    assert!(requests[0].url.contains("appid=owm-test-key"));
    assert!(requests[0].url.contains("units=metric"));
}

#[tokio::test]
async fn when_weather_api_key_is_missing_no_request_is_made() {
    // Given: No WeatherAPI key is configured
    let (_temp, client, gateway) = gateway_with(
        ScriptedHttpClient::new().respond(WEATHERAPI_CURRENT_URL, HttpResponse::ok_json("{}")),
        GatewayConfig::default(),
    );

    // When: WeatherAPI is selected
    let response = gateway.weather.get_by_source("WeatherAPI", Some("Lima")).await;

    // Then: The fetch fails before reaching the provider
    assert_eq!(response.status, 500);
    assert!(message(&response).starts_with("upstream request failed"));
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn when_provider_answers_with_an_error_status_the_fetch_fails() {
    let (_temp, _client, gateway) = gateway_with(
        ScriptedHttpClient::new()
            .respond(WEATHERAPI_CURRENT_URL, HttpResponse::with_status(401, r#"{"error":{}}"#)),
        keyed_config(),
    );

    let response = gateway.weather.get_by_source("WeatherAPI", Some("Lima")).await;

    assert_eq!(response.status, 500);
    assert!(message(&response).contains("401"));
}

#[tokio::test]
async fn when_provider_is_unreachable_the_fetch_fails() {
    let (_temp, _client, gateway) = gateway_with(
        ScriptedHttpClient::new().fail(
            OPENWEATHERMAP_CURRENT_URL,
            HttpError::connect("connection refused"),
        ),
        keyed_config(),
    );

    let response = gateway.weather.get_by_source("OpenWeatherMap", Some("Lima")).await;

    assert_eq!(response.status, 500);
    assert!(message(&response).contains("connection refused"));
}

#[tokio::test]
async fn when_provider_keeps_failing_every_request_still_reaches_it() {
    // Given: USGS answers 503 to every query
    let (_temp, client, gateway) = gateway_with(
        ScriptedHttpClient::new()
            .respond(RESTCOUNTRIES_NAME_URL, HttpResponse::ok_json(CHILE_LATLNG))
            .respond(USGS_QUERY_URL, HttpResponse::with_status(503, "unavailable")),
        keyed_config(),
    );

    // When: Three lookups for Chile fail
    for _ in 0..3 {
        let response = gateway.earthquakes.get_by_source("USGS", Some("Chile")).await;
        assert_eq!(response.status, 500);
    }

    // Then: A fourth lookup for Peru is still sent and reports the provider status
    let response = gateway.earthquakes.get_by_source("USGS", Some("Peru")).await;
    assert_eq!(response.status, 500);
    assert!(message(&response).contains("503"));

    let usgs_requests = client
        .requests()
        .iter()
        .filter(|request| request.url.starts_with(USGS_QUERY_URL))
        .count();
    assert_eq!(usgs_requests, 4);
}

// =============================================================================
// Strategy Timeout
// =============================================================================

#[tokio::test]
async fn when_provider_stalls_past_the_strategy_timeout_the_fetch_fails() {
    // Given: A 50 ms upstream timeout and a provider that answers after 2 s
    let (_temp, _client, gateway) = gateway_with(
        ScriptedHttpClient::new()
            .respond(OPENWEATHERMAP_CURRENT_URL, HttpResponse::ok_json("{}"))
            .with_delay(Duration::from_secs(2)),
        keyed_config().with_upstream_timeout_ms(50),
    );

    // When: The provider is selected
    let started = std::time::Instant::now();
    let response = gateway.weather.get_by_source("OpenWeatherMap", Some("Lima")).await;

    // Then: The gateway gives up at the strategy bound with an upstream error
    assert_eq!(response.status, 500);
    assert!(message(&response).contains("did not answer within 600 ms"));
    assert!(started.elapsed() < Duration::from_secs(2));
}
