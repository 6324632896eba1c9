//! Error types for the enqueue gateway

use std::io;

use thiserror::Error;

use crate::publisher::PublisherError;

/// Result type alias for the enqueue gateway
pub type Result<T> = std::result::Result<T, Error>;

/// Enqueue gateway errors
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Publisher backend error
    #[error("Publisher error: {0}")]
    Publisher(#[from] PublisherError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
