//! Operation handlers
//!
//! Each handler returns as soon as it has a terminal [`Outcome`] and calls
//! the publisher at most once.

use axum::body::{Body, to_bytes};
use tracing::{debug, error, warn};

use super::response::{LengthPayload, Outcome};
use crate::publisher::{Publisher, PublisherError};

/// `GET .../ping`
pub async fn ping() -> Outcome {
    Outcome::Success(None)
}

/// `GET .../len`
pub async fn length(publisher: &dyn Publisher) -> Outcome {
    match publisher.length().await {
        Ok(length) => LengthPayload::new(length).into(),
        Err(e) => {
            warn!(error = %e, "Publisher failed to report length");
            Outcome::server_error(e)
        }
    }
}

/// `POST .../enqueue`
///
/// The body is buffered whole and handed to the publisher unchanged.
pub async fn enqueue(publisher: &dyn Publisher, body: Body) -> Outcome {
    let message = match to_bytes(body, usize::MAX).await {
        Ok(message) => message,
        Err(e) => {
            error!(error = %e, "Failed to read request body");
            return Outcome::server_error(e);
        }
    };

    let size = message.len();
    match publisher.push(message).await {
        Ok(length) => {
            debug!(size, length, "Message enqueued");
            LengthPayload::new(length).into()
        }
        Err(PublisherError::MessageTooLarge) => {
            warn!(size, "Publisher rejected oversized message");
            Outcome::PayloadTooLarge
        }
        Err(e) => {
            warn!(error = %e, size, "Publisher failed to enqueue message");
            Outcome::server_error(e)
        }
    }
}
