//! # Quakecast Web
//!
//! axum routes for the quakecast gateway.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | `GET` | `/health` | liveness and registered sources |
//! | `POST` | `/{noun}` | create |
//! | `GET` | `/{noun}/:source?location=` | get-by-source |
//! | `GET` | `/{noun}/history/:location` | local history |
//! | `DELETE` | `/{noun}/:id` | delete |
//! | `GET` | `/{noun}/:source/:id` | get-by-id |
//!
//! `{noun}` is `earthquakes` or `weather`. Seismic lookups also accept the
//! location as `country`, weather lookups as `city`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use quakecast_core::{Gateway, GatewayResponse, Record, RecordGateway};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the application router.
pub fn router(gateway: Arc<Gateway>) -> Router {
    let records = Router::new()
        .nest("/earthquakes", record_routes(Arc::clone(&gateway.earthquakes)))
        .nest("/weather", record_routes(Arc::clone(&gateway.weather)));

    Router::new()
        .route("/health", get(health))
        .with_state(gateway)
        .merge(records)
        .fallback(route_not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn record_routes<R: Record>(gateway: Arc<RecordGateway<R>>) -> Router {
    // GET and DELETE share `/:key`: the segment is a source key for GET and a
    // record id for DELETE.
    Router::new()
        .route("/", post(create_record::<R>))
        .route("/history/:location", get(history::<R>))
        .route("/:key", get(get_by_source::<R>).delete(delete_record::<R>))
        .route("/:source/:id", get(get_by_id::<R>))
        .with_state(gateway)
}

/// Gateway response rendered as HTTP.
pub struct ApiResponse(pub GatewayResponse);

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match self.0.body {
            Some(body) => (status, Json(body)).into_response(),
            None => status.into_response(),
        }
    }
}

async fn health(State(gateway): State<Arc<Gateway>>) -> ApiResponse {
    ApiResponse(gateway.health())
}

async fn create_record<R: Record>(
    State(gateway): State<Arc<RecordGateway<R>>>,
    body: Bytes,
) -> ApiResponse {
    let body = match serde_json::from_slice::<Value>(&body) {
        Ok(body) => body,
        Err(error) => {
            tracing::debug!(kind = %gateway.kind(), %error, "rejected unparseable body");
            return ApiResponse(GatewayResponse::message(
                400,
                format!("request body must be valid JSON: {error}"),
            ));
        }
    };

    ApiResponse(gateway.create(body).await)
}

async fn get_by_source<R: Record>(
    State(gateway): State<Arc<RecordGateway<R>>>,
    Path(source): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResponse {
    let location = params
        .get("location")
        .or_else(|| params.get(gateway.kind().location_alias()))
        .map(String::as_str);

    ApiResponse(gateway.get_by_source(&source, location).await)
}

async fn history<R: Record>(
    State(gateway): State<Arc<RecordGateway<R>>>,
    Path(location): Path<String>,
) -> ApiResponse {
    ApiResponse(gateway.history(&location).await)
}

async fn delete_record<R: Record>(
    State(gateway): State<Arc<RecordGateway<R>>>,
    Path(id): Path<String>,
) -> ApiResponse {
    ApiResponse(gateway.delete(&id).await)
}

async fn get_by_id<R: Record>(
    State(gateway): State<Arc<RecordGateway<R>>>,
    Path((source, id)): Path<(String, String)>,
) -> ApiResponse {
    ApiResponse(gateway.get_by_id(&source, &id).await)
}

async fn route_not_found() -> ApiResponse {
    ApiResponse(GatewayResponse::message(404, "route not found"))
}
