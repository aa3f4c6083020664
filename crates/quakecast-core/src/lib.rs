//! # Quakecast Core
//!
//! Source-routed retrieval gateway for seismic events and weather
//! observations.
//!
//! ## Overview
//!
//! A caller names a *source* for each lookup: the local record store or one
//! of several third-party providers. The gateway validates the request,
//! resolves the source to a retrieval strategy, runs it under a timeout and
//! normalizes whatever comes back into a `(status, body)` pair.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Local and provider strategies (USGS, EMSC, OpenWeatherMap, WeatherAPI) |
//! | [`config`] | Gateway configuration from the environment |
//! | [`domain`] | Record types, identifiers, dates |
//! | [`error`] | Validation and gateway error types |
//! | [`gateway`] | Operation orchestration |
//! | [`http_client`] | Outbound HTTP abstraction |
//! | [`normalizer`] | Outcome to response mapping |
//! | [`registry`] | Source key to strategy registries |
//! | [`store`] | Record store seam over the warehouse |
//! | [`strategy`] | Retrieval strategy contract |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  HTTP handlers  │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │    Gateway      │────▶│   Normalizer     │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Source Registry │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │   Strategies    │────▶│ HTTP Client /    │
//! │                 │     │ Record Store     │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use quakecast_core::{GatewayError, GatewayErrorKind};
//!
//! fn describe(error: &GatewayError) -> &'static str {
//!     match error.kind() {
//!         GatewayErrorKind::UpstreamFetchError => "provider unreachable",
//!         GatewayErrorKind::StoreError => "store failure",
//!         _ if error.is_client_error() => "bad request",
//!         _ => "other",
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - API keys are read from environment variables only and never logged
//! - Caller text reaches SQL only as bound parameters
//! - Caller text reaches provider URLs only percent-encoded

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod http_client;
pub mod normalizer;
pub mod registry;
pub mod store;
pub mod strategy;

pub use adapters::{
    Coordinates, EmscAdapter, LocalAdapter, OpenWeatherMapAdapter, RestCountriesGeocoder,
    UsgsAdapter, WeatherApiAdapter,
};
pub use config::{ConfigError, GatewayConfig};
pub use domain::{
    validate, Condition, Record, RecordDate, RecordId, RecordKind, SeismicEvent, Stored,
    WeatherObservation,
};
pub use error::{GatewayError, GatewayErrorKind, ValidationError};
pub use gateway::{Gateway, RecordGateway};
pub use http_client::{
    HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse, ReqwestHttpClient,
    ScriptedHttpClient,
};
pub use normalizer::{GatewayResponse, Outcome};
pub use registry::{SourceRegistry, Sources, SourcesBuilder};
pub use store::RecordStore;
pub use strategy::{CapabilitySet, Lookup, Retrieved, RetrievalStrategy};
