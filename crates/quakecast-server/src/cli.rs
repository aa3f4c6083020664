//! Command-line options for the `quakecast` server.
//!
//! | Option | Env Var | Default |
//! |--------|---------|---------|
//! | `--bind` | `QUAKECAST_BIND` | `0.0.0.0:3000` |
//! | `--db-path` | `QUAKECAST_DB_PATH` | `$QUAKECAST_HOME/data/quakecast.duckdb` |
//! | `--upstream-timeout-ms` | `QUAKECAST_UPSTREAM_TIMEOUT_MS` | `5000` |
//!
//! Provider API keys are read from the environment only.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Seismic and weather record gateway
#[derive(Debug, Parser)]
#[command(
    name = "quakecast",
    version,
    about = "Seismic and weather record gateway",
    long_about = "Serves seismic events and weather observations from a local DuckDB store \
or from third-party providers (USGS, EMSC, OpenWeatherMap, WeatherAPI) behind one HTTP API.\n\
\n\
Provider keys: QUAKECAST_OPENWEATHERMAP_API_KEY, QUAKECAST_WEATHERAPI_API_KEY.\n\
Log filter: RUST_LOG (default info)."
)]
pub struct Cli {
    /// Socket address to listen on.
    #[arg(long, env = "QUAKECAST_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// Path to the DuckDB database file.
    #[arg(long, env = "QUAKECAST_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Timeout for each outbound provider request, in milliseconds.
    #[arg(
        long,
        env = "QUAKECAST_UPSTREAM_TIMEOUT_MS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub upstream_timeout_ms: Option<u64>,
}
