//! Gateway configuration from the environment.
//!
//! | Setting | Primary Env Var | Fallback Env Var | Default |
//! |---------|-----------------|------------------|---------|
//! | OpenWeatherMap key | `QUAKECAST_OPENWEATHERMAP_API_KEY` | `OPENWEATHERMAP_API_KEY` | unset |
//! | WeatherAPI key | `QUAKECAST_WEATHERAPI_API_KEY` | `WEATHERAPI_API_KEY` | unset |
//! | Upstream timeout | `QUAKECAST_UPSTREAM_TIMEOUT_MS` | - | 5000 |
//!
//! Providers without a key stay registered and answer with an upstream
//! fetch error.

use std::env;
use std::fmt::{Debug, Formatter};
use std::time::Duration;

use thiserror::Error;

use crate::http_client::DEFAULT_TIMEOUT_MS;

/// Grace added on top of the two upstream calls a seismic lookup makes.
const STRATEGY_GRACE_MS: u64 = 500;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("upstream timeout must be a positive number of milliseconds: '{value}'")]
    InvalidTimeout { value: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub openweathermap_api_key: Option<String>,
    pub weatherapi_api_key: Option<String>,
    /// Per-request timeout for each outbound call.
    pub upstream_timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            openweathermap_api_key: None,
            weatherapi_api_key: None,
            upstream_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let upstream_timeout_ms = match env::var("QUAKECAST_UPSTREAM_TIMEOUT_MS") {
            Ok(value) => parse_timeout_ms(&value)?,
            Err(_) => DEFAULT_TIMEOUT_MS,
        };

        Ok(Self {
            openweathermap_api_key: env_key(
                "QUAKECAST_OPENWEATHERMAP_API_KEY",
                "OPENWEATHERMAP_API_KEY",
            ),
            weatherapi_api_key: env_key("QUAKECAST_WEATHERAPI_API_KEY", "WEATHERAPI_API_KEY"),
            upstream_timeout_ms,
        })
    }

    pub fn with_upstream_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.upstream_timeout_ms = timeout_ms;
        self
    }

    pub fn with_openweathermap_key(mut self, key: impl Into<String>) -> Self {
        self.openweathermap_api_key = Some(key.into());
        self
    }

    pub fn with_weatherapi_key(mut self, key: impl Into<String>) -> Self {
        self.weatherapi_api_key = Some(key.into());
        self
    }

    /// Upper bound on one strategy execution, covering a geocode plus a query.
    pub fn strategy_timeout(&self) -> Duration {
        Duration::from_millis(
            self.upstream_timeout_ms
                .saturating_mul(2)
                .saturating_add(STRATEGY_GRACE_MS),
        )
    }
}

// Keys are redacted.
impl Debug for GatewayConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("openweathermap_api_key", &self.openweathermap_api_key.as_ref().map(|_| "<set>"))
            .field("weatherapi_api_key", &self.weatherapi_api_key.as_ref().map(|_| "<set>"))
            .field("upstream_timeout_ms", &self.upstream_timeout_ms)
            .finish()
    }
}

pub fn parse_timeout_ms(value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(ms),
        _ => Err(ConfigError::InvalidTimeout {
            value: value.to_owned(),
        }),
    }
}

fn env_key(primary: &str, fallback: &str) -> Option<String> {
    env::var(primary)
        .or_else(|_| env::var(fallback))
        .ok()
        .filter(|key| !key.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_never_contains_keys() {
        let config = GatewayConfig::default().with_openweathermap_key("secret-owm");
        let rendered = format!("{config:?}");

        assert!(!rendered.contains("secret-owm"));
        assert!(rendered.contains("<set>"));
    }

    #[test]
    fn strategy_timeout_covers_two_upstream_calls() {
        let config = GatewayConfig::default().with_upstream_timeout_ms(1_000);
        assert_eq!(config.strategy_timeout(), Duration::from_millis(2_500));
    }

    #[test]
    fn zero_or_garbage_timeout_is_rejected() {
        assert!(parse_timeout_ms("0").is_err());
        assert!(parse_timeout_ms("fast").is_err());
        assert_eq!(parse_timeout_ms(" 750 "), Ok(750));
    }
}
