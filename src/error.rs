// src/error.rs
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by a round trip.
///
/// The first four variants map one-to-one onto the pipeline steps and carry
/// the driver's own error as their source. The rest come from loading the
/// document or filter before anything touches the network.
#[derive(Error, Debug)]
pub enum RoundtripError {
    #[error("connection failed: {0}")]
    Connection(#[source] mongodb::error::Error),

    #[error("insert failed: {0}")]
    Write(#[source] mongodb::error::Error),

    #[error("find failed: {0}")]
    Read(#[source] mongodb::error::Error),

    #[error("disconnect did not complete within {timeout:?}")]
    Disconnect {
        timeout: Duration,
        #[source]
        source: tokio::time::error::Elapsed,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("BSON conversion error: {0}")]
    Bson(#[from] bson::ser::Error),

    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

pub type Result<T> = std::result::Result<T, RoundtripError>;
