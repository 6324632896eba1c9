//! Request outcomes and their HTTP encoding

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Body sent with every 401
pub const UNAUTHORIZED_MESSAGE: &str = "401 status unauthorized";

/// Body sent with every 413
pub const TOO_LARGE_MESSAGE: &str = "413 queue cannot store a message this large";

/// The single terminal result of a request.
///
/// Every request produces exactly one `Outcome`, which is turned into
/// exactly one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 200, with an optional JSON body
    Success(Option<Bytes>),
    /// 401, credential missing or wrong
    Unauthorized,
    /// 413, the backend refused the message for its size
    PayloadTooLarge,
    /// 500, with the failure message when there is one
    ServerError(Option<String>),
    /// 404, no operation matches the method and path
    NotFound,
}

impl Outcome {
    /// 500 carrying the error's message
    pub fn server_error(err: impl std::fmt::Display) -> Self {
        Self::ServerError(Some(err.to_string()))
    }

    /// Status code this outcome is rendered with
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Success(_) => StatusCode::OK,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Success(None) | Self::NotFound | Self::ServerError(None) => {
                status.into_response()
            }
            Self::Success(Some(body)) => (
                status,
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response(),
            Self::Unauthorized => (status, UNAUTHORIZED_MESSAGE).into_response(),
            Self::PayloadTooLarge => (status, TOO_LARGE_MESSAGE).into_response(),
            Self::ServerError(Some(message)) => (status, message).into_response(),
        }
    }
}

/// `{"length": n}`, returned by `len` and `enqueue`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthPayload {
    /// Queue length reported by the publisher
    pub length: usize,
}

impl LengthPayload {
    /// Wrap a queue length
    #[must_use]
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl From<LengthPayload> for Outcome {
    fn from(payload: LengthPayload) -> Self {
        match serde_json::to_vec(&payload) {
            Ok(body) => Self::Success(Some(Bytes::from(body))),
            Err(e) => {
                error!(error = %e, "Failed to encode length payload");
                Self::server_error(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use std::collections::HashMap;

    async fn render(outcome: Outcome) -> (StatusCode, Bytes) {
        let response = outcome.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn test_success_without_body() {
        let (status, body) = render(Outcome::Success(None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_success_with_body() {
        let outcome = Outcome::Success(Some(Bytes::from_static(b"{\"length\":3}")));
        let response = outcome.into_response();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"{\"length\":3}");
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let (status, body) = render(Outcome::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(&body[..], UNAUTHORIZED_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_payload_too_large() {
        let (status, body) = render(Outcome::PayloadTooLarge).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(&body[..], TOO_LARGE_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_server_error_message() {
        let (status, body) = render(Outcome::server_error("test error")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(&body[..], b"test error");

        let (status, body) = render(Outcome::ServerError(None)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_not_found_is_empty_404() {
        let (status, body) = render(Outcome::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.is_empty());
    }

    #[test]
    fn test_length_payload_shape() {
        let Outcome::Success(Some(body)) = Outcome::from(LengthPayload::new(10)) else {
            panic!("expected a body");
        };
        let map: HashMap<String, usize> = serde_json::from_slice(&body).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["length"], 10);
    }
}
