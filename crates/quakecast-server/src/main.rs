mod cli;
mod error;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use quakecast_core::{Gateway, GatewayConfig};
use quakecast_store::{Warehouse, WarehouseConfig};

use crate::cli::Cli;
use crate::error::ServerError;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "quakecast stopped");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), ServerError> {
    let mut config = GatewayConfig::from_env()?;
    if let Some(timeout_ms) = cli.upstream_timeout_ms {
        config = config.with_upstream_timeout_ms(timeout_ms);
    }

    let warehouse_config = match cli.db_path {
        Some(db_path) => WarehouseConfig::at_path(db_path),
        None => WarehouseConfig::default(),
    };
    let warehouse = Warehouse::open(warehouse_config)?;
    tracing::info!(db_path = %warehouse.db_path().display(), "record store ready");

    let gateway = Arc::new(Gateway::open(warehouse, config));
    let app = quakecast_web::router(gateway);

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .map_err(|source| ServerError::Bind {
            addr: cli.bind,
            source,
        })?;
    tracing::info!(addr = %cli.bind, "quakecast listening, press Ctrl+C to stop");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("quakecast shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
