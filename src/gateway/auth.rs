//! API key authentication
//!
//! Every request must carry the configured secret in the `x-api-key`
//! header. A missing header is treated the same as a wrong one. Requests
//! that fail never reach the router or the publisher.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use super::response::Outcome;

/// Header carrying the credential (matched case-insensitively)
pub const API_KEY_HEADER: &str = "x-api-key";

/// Returns `true` iff `credential` is byte-for-byte equal to `expected`.
///
/// No trimming or case folding is applied. The comparison runs in constant
/// time for inputs of equal length.
#[must_use]
pub fn authenticate(credential: Option<&[u8]>, expected: &str) -> bool {
    credential.is_some_and(|given| bool::from(given.ct_eq(expected.as_bytes())))
}

/// The configured secret
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a resolved secret
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Check a request-supplied credential
    #[must_use]
    pub fn matches(&self, credential: Option<&[u8]>) -> bool {
        authenticate(credential, &self.0)
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Authentication middleware
pub async fn auth_middleware(
    State(api_key): State<Arc<ApiKey>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let credential = request
        .headers()
        .get(API_KEY_HEADER)
        .map(axum::http::HeaderValue::as_bytes);

    if api_key.matches(credential) {
        debug!(path = %request.uri().path(), "Authenticated request");
        return next.run(request).await;
    }

    if credential.is_none() {
        warn!(method = %request.method(), path = %request.uri().path(), "Missing x-api-key header");
    } else {
        warn!(method = %request.method(), path = %request.uri().path(), "Invalid API key");
    }
    Outcome::Unauthorized.into_response()
}
