//! Publisher abstraction: the queue backend the gateway delegates to.
//!
//! The gateway never stores messages itself. Every `len` and `enqueue`
//! request is answered by a single [`Publisher`] shared across all
//! in-flight requests for the lifetime of the process.
//!
//! Two backends ship with the crate:
//!
//! - [`MemoryPublisher`]: an in-process FIFO with optional size and
//!   capacity limits.
//! - [`RemotePublisher`]: forwards to an upstream gateway over HTTP.

mod memory;
mod remote;

pub use memory::MemoryPublisher;
pub use remote::RemotePublisher;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::Result;
use crate::config::PublisherConfig;

/// Errors reported by a publisher backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublisherError {
    /// The message is larger than the backend accepts.
    #[error("message exceeds acceptable message size")]
    MessageTooLarge,

    /// The backend holds as many messages as it can.
    #[error("queue is full")]
    QueueFull,

    /// The publisher was closed and accepts no more work.
    #[error("publisher is closed")]
    Closed,

    /// The upstream backend failed or could not be reached.
    #[error("upstream error: {0}")]
    Upstream(String),
}

/// A queue backend.
///
/// Implementations must be `Send + Sync + 'static` so a single instance can
/// be stored in `Arc<dyn Publisher>` and called from concurrent request
/// tasks. The gateway does not serialize access; any locking or pooling is
/// the implementation's business.
#[async_trait]
pub trait Publisher: Send + Sync + 'static {
    /// Current number of messages in the queue.
    async fn length(&self) -> std::result::Result<usize, PublisherError>;

    /// Append `message` and return the queue length after the push.
    ///
    /// Must return [`PublisherError::MessageTooLarge`] when the message is
    /// rejected for its size, so callers can tell it apart from other
    /// failures.
    async fn push(&self, message: Bytes) -> std::result::Result<usize, PublisherError>;

    /// Release backend resources. Called once at shutdown.
    async fn close(&self);
}

/// Build the publisher described by `config`.
pub fn from_config(config: &PublisherConfig) -> Result<Arc<dyn Publisher>> {
    match config {
        PublisherConfig::Memory(memory) => Ok(Arc::new(MemoryPublisher::new(
            memory.max_message_size,
            memory.capacity,
        ))),
        PublisherConfig::Remote(remote) => Ok(Arc::new(RemotePublisher::from_config(remote)?)),
    }
}
