//! HTTP router and request dispatch
//!
//! Routing looks only at the last non-empty path segment, lower-cased, so
//! `/ping`, `/x/y/PING` and `/api/v1/ping/` all reach the ping handler.
//! Clients deployed behind arbitrary path prefixes rely on this.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::debug;

use super::auth::{ApiKey, auth_middleware};
use super::handlers;
use super::response::Outcome;
use crate::publisher::Publisher;

/// Shared application state
pub struct AppState {
    /// Queue backend shared by all requests
    pub publisher: Arc<dyn Publisher>,
}

/// Operation selected for an authenticated request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `GET .../ping`
    Ping,
    /// `GET .../len`
    Length,
    /// `POST .../enqueue`
    Enqueue,
    /// Anything else
    NotFound,
}

impl Route {
    /// Pick the operation for `method` and `path`.
    ///
    /// A known keyword with the wrong method is `NotFound`.
    #[must_use]
    pub fn resolve(method: &Method, path: &str) -> Self {
        let Some(segment) = last_segment(path) else {
            return Self::NotFound;
        };

        match segment.as_str() {
            "ping" if *method == Method::GET => Self::Ping,
            "len" if *method == Method::GET => Self::Length,
            "enqueue" if *method == Method::POST => Self::Enqueue,
            _ => Self::NotFound,
        }
    }
}

/// Last non-empty `/`-separated segment of `path`, lower-cased.
#[must_use]
pub fn last_segment(path: &str) -> Option<String> {
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .map(str::to_lowercase)
}

/// Create the router.
///
/// There are no fixed routes: every request goes through the auth
/// middleware and then [`dispatch`].
pub fn create_router(state: Arc<AppState>, api_key: Arc<ApiKey>) -> Router {
    Router::new()
        .fallback(dispatch)
        .layer(middleware::from_fn_with_state(api_key, auth_middleware))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Route an authenticated request to its handler
async fn dispatch(State(state): State<Arc<AppState>>, request: Request<Body>) -> Outcome {
    let (parts, body) = request.into_parts();
    let route = Route::resolve(&parts.method, parts.uri.path());
    debug!(method = %parts.method, path = %parts.uri.path(), ?route, "Dispatching");

    match route {
        Route::Ping => handlers::ping().await,
        Route::Length => handlers::length(state.publisher.as_ref()).await,
        Route::Enqueue => handlers::enqueue(state.publisher.as_ref(), body).await,
        Route::NotFound => Outcome::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("localhost:3000/test/my/api").as_deref(), Some("api"));
        assert_eq!(last_segment("/x/y/PING").as_deref(), Some("ping"));
        assert_eq!(last_segment("/enqueue/").as_deref(), Some("enqueue"));
        assert_eq!(last_segment("/"), None);
        assert_eq!(last_segment(""), None);
    }

    #[test]
    fn test_resolve_keywords() {
        assert_eq!(Route::resolve(&Method::GET, "/ping"), Route::Ping);
        assert_eq!(Route::resolve(&Method::GET, "/len"), Route::Length);
        assert_eq!(Route::resolve(&Method::POST, "/enqueue"), Route::Enqueue);
    }

    #[test]
    fn test_resolve_ignores_prefix_and_case() {
        assert_eq!(Route::resolve(&Method::GET, "/x/y/ping"), Route::Ping);
        assert_eq!(Route::resolve(&Method::GET, "/queue/LEN"), Route::Length);
        assert_eq!(
            Route::resolve(&Method::POST, "/a/b/c/Enqueue"),
            Route::Enqueue
        );
    }

    #[test]
    fn test_resolve_wrong_method() {
        assert_eq!(Route::resolve(&Method::POST, "/ping"), Route::NotFound);
        assert_eq!(Route::resolve(&Method::DELETE, "/len"), Route::NotFound);
        assert_eq!(Route::resolve(&Method::GET, "/enqueue"), Route::NotFound);
        assert_eq!(Route::resolve(&Method::PUT, "/enqueue"), Route::NotFound);
    }

    #[test]
    fn test_resolve_unknown_path() {
        assert_eq!(Route::resolve(&Method::GET, "/"), Route::NotFound);
        assert_eq!(Route::resolve(&Method::GET, "/ping/extra"), Route::NotFound);
        assert_eq!(Route::resolve(&Method::GET, "/pings"), Route::NotFound);
        assert_eq!(Route::resolve(&Method::GET, "/ppi"), Route::NotFound);
    }
}
