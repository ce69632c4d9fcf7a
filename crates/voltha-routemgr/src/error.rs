//! Error types for routemgrd

use thiserror::Error;
use voltha_graph::{ConfigError, GraphError};

#[derive(Debug, Error)]
pub enum RouteMgrError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to read topology file {path}: {source}")]
    TopologyIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid topology: {0}")]
    TopologyParse(#[from] serde_json::Error),

    #[error("invalid topology: {0}")]
    TopologyInvalid(String),

    #[error("route computation rejected: {0}")]
    Graph(#[from] GraphError),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, RouteMgrError>;
