//! In-process queue backend

use std::collections::VecDeque;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tracing::debug;

use super::{Publisher, PublisherError};

/// FIFO queue held in memory.
///
/// `max_message_size` and `capacity` of `0` mean "no limit".
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    max_message_size: usize,
    capacity: usize,
    state: Mutex<QueueState>,
}

#[derive(Debug, Default)]
struct QueueState {
    messages: VecDeque<Bytes>,
    closed: bool,
}

impl MemoryPublisher {
    /// Create an empty queue with the given limits.
    #[must_use]
    pub fn new(max_message_size: usize, capacity: usize) -> Self {
        Self {
            max_message_size,
            capacity,
            state: Mutex::new(QueueState::default()),
        }
    }

    /// Remove and return the oldest message.
    pub fn pop(&self) -> Option<Bytes> {
        self.state.lock().messages.pop_front()
    }
}

#[async_trait]
impl Publisher for MemoryPublisher {
    async fn length(&self) -> Result<usize, PublisherError> {
        let state = self.state.lock();
        if state.closed {
            return Err(PublisherError::Closed);
        }
        Ok(state.messages.len())
    }

    async fn push(&self, message: Bytes) -> Result<usize, PublisherError> {
        if self.max_message_size > 0 && message.len() > self.max_message_size {
            debug!(
                size = message.len(),
                limit = self.max_message_size,
                "Rejecting oversized message"
            );
            return Err(PublisherError::MessageTooLarge);
        }

        let mut state = self.state.lock();
        if state.closed {
            return Err(PublisherError::Closed);
        }
        if self.capacity > 0 && state.messages.len() >= self.capacity {
            return Err(PublisherError::QueueFull);
        }

        state.messages.push_back(message);
        Ok(state.messages.len())
    }

    async fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        debug!(pending = state.messages.len(), "Memory publisher closed");
    }
}
