use thiserror::Error;

/// Server startup and runtime failures mapped to exit codes.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] quakecast_core::ConfigError),

    #[error(transparent)]
    Warehouse(#[from] quakecast_store::WarehouseError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Warehouse(_) => 3,
            Self::Bind { .. } => 4,
            Self::Io(_) => 10,
        }
    }
}
