use thiserror::Error;

use crate::dataset::DatasetError;

/// Startup errors. Any of these stops the process before it serves a request.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("invalid listen address: {0}")]
    Address(#[from] std::net::AddrParseError),

    #[error("failed to initialize logging: {0}")]
    Logging(#[source] std::io::Error),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
