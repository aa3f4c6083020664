//! Maps strategy outcomes and gateway errors to one response contract.
//!
//! | Outcome | Status | Body |
//! |---------|--------|------|
//! | Invalid source | 400 | `{message, valid_sources}` |
//! | Invalid identifier, validation failure, duplicate id, unsupported lookup | 400 | `{message}` |
//! | Record found | 200 | record |
//! | Record absent | 404 | `{message}` |
//! | Collection (possibly empty) | 200 | array |
//! | Provider payload | 200 | payload |
//! | Created | 201 | record with `_id` |
//! | Deleted | 200 | deleted record |
//! | Nothing to delete | 204 | none |
//! | Store unavailable | 503 | `{message}` |
//! | Other store or upstream failure | 500 | `{message}` |

use serde::Serialize;
use serde_json::{json, Value};

use crate::domain::{RecordKind, Stored};
use crate::GatewayError;

/// Status code and optional JSON body handed to the transport layer.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl GatewayResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    pub const fn empty(status: u16) -> Self {
        Self { status, body: None }
    }

    pub fn message(status: u16, message: impl Into<String>) -> Self {
        Self::new(status, json!({ "message": message.into() }))
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Successful result of a gateway operation, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<R> {
    Found(Stored<R>),
    Absent,
    Collection(Vec<Stored<R>>),
    Payload(Value),
    Created(Stored<R>),
    Deleted(Stored<R>),
    NothingToDelete,
}

pub fn normalize<R: Serialize>(
    kind: RecordKind,
    result: Result<Outcome<R>, GatewayError>,
) -> GatewayResponse {
    match result {
        Ok(outcome) => normalize_outcome(kind, outcome),
        Err(error) => normalize_error(&error),
    }
}

fn normalize_outcome<R: Serialize>(kind: RecordKind, outcome: Outcome<R>) -> GatewayResponse {
    let (status, body) = match outcome {
        Outcome::Absent => return GatewayResponse::message(404, kind.not_found_message()),
        Outcome::NothingToDelete => return GatewayResponse::empty(204),
        Outcome::Payload(payload) => return GatewayResponse::new(200, payload),
        Outcome::Found(record) | Outcome::Deleted(record) => (200, serde_json::to_value(record)),
        Outcome::Created(record) => (201, serde_json::to_value(record)),
        Outcome::Collection(records) => (200, serde_json::to_value(records)),
    };

    match body {
        Ok(body) => GatewayResponse::new(status, body),
        Err(error) => normalize_error(&GatewayError::Store(format!(
            "record could not be serialized: {error}"
        ))),
    }
}

pub fn normalize_error(error: &GatewayError) -> GatewayResponse {
    match error {
        GatewayError::InvalidSource { valid_sources, .. } => GatewayResponse::new(
            400,
            json!({
                "message": error.to_string(),
                "valid_sources": valid_sources,
            }),
        ),
        GatewayError::StoreUnavailable(_) => GatewayResponse::message(503, error.to_string()),
        error if error.is_client_error() => GatewayResponse::message(400, error.to_string()),
        error => GatewayResponse::message(500, error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Condition, RecordId, WeatherObservation};
    use crate::ValidationError;

    fn stored() -> Stored<WeatherObservation> {
        Stored {
            storage_id: String::from("f00"),
            record: WeatherObservation::new(
                RecordId::parse(RecordKind::Weather, "clima_1").expect("id"),
                "Caracas",
                30.7,
                82.0,
                Condition::Soleado,
            )
            .expect("observation"),
        }
    }

    #[test]
    fn empty_collection_is_ok_with_empty_array() {
        let response = normalize::<WeatherObservation>(
            RecordKind::Weather,
            Ok(Outcome::Collection(Vec::new())),
        );
        assert_eq!(response, GatewayResponse::new(200, json!([])));
    }

    #[test]
    fn created_record_carries_storage_identity() {
        let response = normalize(RecordKind::Weather, Ok(Outcome::Created(stored())));
        assert_eq!(response.status, 201);
        assert_eq!(response.body.expect("body")["_id"], "f00");
    }

    #[test]
    fn absent_and_nothing_to_delete_differ() {
        let absent = normalize::<WeatherObservation>(RecordKind::Weather, Ok(Outcome::Absent));
        let nothing =
            normalize::<WeatherObservation>(RecordKind::Weather, Ok(Outcome::NothingToDelete));

        assert_eq!(absent, GatewayResponse::message(404, "weather record not found"));
        assert_eq!(nothing, GatewayResponse::empty(204));
    }

    #[test]
    fn invalid_source_lists_valid_sources() {
        let response = normalize_error(&GatewayError::InvalidSource {
            source_key: String::from("NOAA"),
            valid_sources: vec!["local", "OpenWeatherMap", "WeatherAPI"],
        });

        assert_eq!(response.status, 400);
        let body = response.body.expect("body");
        assert_eq!(body["valid_sources"], json!(["local", "OpenWeatherMap", "WeatherAPI"]));
        assert!(body["message"].as_str().expect("message").contains("NOAA"));
    }

    #[test]
    fn error_statuses_follow_the_taxonomy() {
        let cases = [
            (GatewayError::from(ValidationError::invalid_id(RecordKind::Seismic)), 400),
            (GatewayError::SchemaValidation(ValidationError::MissingField { field: "city" }), 400),
            (GatewayError::DuplicateIdentifier { id: String::from("clima_1") }, 400),
            (GatewayError::UnsupportedLookup { source_key: "USGS", lookup: "identifier" }, 400),
            (GatewayError::UpstreamResolution(String::from("x")), 500),
            (GatewayError::UpstreamFetch(String::from("x")), 500),
            (GatewayError::Store(String::from("x")), 500),
            (GatewayError::StoreUnavailable(String::from("x")), 503),
        ];

        for (error, status) in cases {
            let response = normalize_error(&error);
            assert_eq!(response.status, status, "{error:?}");
            assert!(response.body.expect("body")["message"].is_string());
        }
    }
}
