use thiserror::Error;

use crate::domain::RecordKind;

/// Validation errors for caller-supplied identifiers, payloads and queries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("incorrect id format, HINT: correct format {prefix}{{number}}")]
    InvalidIdFormat { prefix: &'static str },

    #[error("request body must be a JSON object")]
    BodyNotObject,
    #[error("field '{field}' is required")]
    MissingField { field: &'static str },
    #[error("field '{field}' must be {expected}")]
    InvalidFieldType {
        field: &'static str,
        expected: &'static str,
    },
    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("date must be a calendar date formatted YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("condition must be one of Soleado, Nublado, Lluvioso, Tormenta: '{value}'")]
    InvalidCondition { value: String },

    #[error("query parameter '{param}' is required")]
    MissingLocation { param: &'static str },
}

impl ValidationError {
    pub const fn invalid_id(kind: RecordKind) -> Self {
        Self::InvalidIdFormat {
            prefix: kind.id_prefix(),
        }
    }
}

/// Error taxonomy for gateway operations.
///
/// `NotFound` and empty collections are outcomes rather than errors, so they
/// have no variant here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("invalid source '{source_key}', valid sources are: {}", valid_sources.join(", "))]
    InvalidSource {
        source_key: String,
        valid_sources: Vec<&'static str>,
    },

    #[error("{0}")]
    InvalidIdentifierFormat(ValidationError),

    #[error("{0}")]
    SchemaValidation(ValidationError),

    #[error("a record with id '{id}' already exists")]
    DuplicateIdentifier { id: String },

    #[error("source '{source_key}' does not support {lookup} lookups")]
    UnsupportedLookup {
        source_key: &'static str,
        lookup: &'static str,
    },

    #[error("could not resolve location: {0}")]
    UpstreamResolution(String),

    #[error("upstream request failed: {0}")]
    UpstreamFetch(String),

    #[error("record store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("record store error: {0}")]
    Store(String),
}

/// Classification of [`GatewayError`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    InvalidSource,
    InvalidIdentifierFormat,
    SchemaValidationFailure,
    DuplicateIdentifier,
    UnsupportedLookup,
    UpstreamResolutionError,
    UpstreamFetchError,
    StoreError,
}

impl GatewayError {
    pub const fn kind(&self) -> GatewayErrorKind {
        match self {
            Self::InvalidSource { .. } => GatewayErrorKind::InvalidSource,
            Self::InvalidIdentifierFormat(_) => GatewayErrorKind::InvalidIdentifierFormat,
            Self::SchemaValidation(_) => GatewayErrorKind::SchemaValidationFailure,
            Self::DuplicateIdentifier { .. } => GatewayErrorKind::DuplicateIdentifier,
            Self::UnsupportedLookup { .. } => GatewayErrorKind::UnsupportedLookup,
            Self::UpstreamResolution(_) => GatewayErrorKind::UpstreamResolutionError,
            Self::UpstreamFetch(_) => GatewayErrorKind::UpstreamFetchError,
            Self::StoreUnavailable(_) | Self::Store(_) => GatewayErrorKind::StoreError,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidSource { .. } => "gateway.invalid_source",
            Self::InvalidIdentifierFormat(_) => "gateway.invalid_identifier_format",
            Self::SchemaValidation(_) => "gateway.schema_validation_failure",
            Self::DuplicateIdentifier { .. } => "gateway.duplicate_identifier",
            Self::UnsupportedLookup { .. } => "gateway.unsupported_lookup",
            Self::UpstreamResolution(_) => "upstream.resolution_error",
            Self::UpstreamFetch(_) => "upstream.fetch_error",
            Self::StoreUnavailable(_) => "store.unavailable",
            Self::Store(_) => "store.error",
        }
    }

    /// Whether the caller is at fault.
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSource { .. }
                | Self::InvalidIdentifierFormat(_)
                | Self::SchemaValidation(_)
                | Self::DuplicateIdentifier { .. }
                | Self::UnsupportedLookup { .. }
        )
    }
}

impl From<ValidationError> for GatewayError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::InvalidIdFormat { .. } => Self::InvalidIdentifierFormat(error),
            other => Self::SchemaValidation(other),
        }
    }
}
