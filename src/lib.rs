//! Enqueue Gateway Library
//!
//! An authenticated HTTP front door for a message queue.
//!
//! # Operations
//!
//! - `GET .../ping`: liveness, empty 200
//! - `GET .../len`: queue length as `{"length": n}`
//! - `POST .../enqueue`: push the raw request body, returns the new length
//!
//! Every request must carry the configured secret in `x-api-key`. Routing
//! matches only the last path segment, so the gateway can sit behind any
//! path prefix. Queue storage is delegated to a [`publisher::Publisher`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod publisher;

pub use error::{Error, Result};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        Some("json") => subscriber
            .with(fmt::layer().json())
            .try_init()
            .map_err(|e| Error::Internal(e.to_string())),
        _ => subscriber
            .with(fmt::layer())
            .try_init()
            .map_err(|e| Error::Internal(e.to_string())),
    }
}
