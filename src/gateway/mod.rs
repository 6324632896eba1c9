//! Gateway server implementation

pub mod auth;
mod handlers;
mod response;
mod router;
mod server;

pub use auth::{API_KEY_HEADER, ApiKey, auth_middleware, authenticate};
pub use response::{LengthPayload, Outcome, TOO_LARGE_MESSAGE, UNAUTHORIZED_MESSAGE};
pub use router::{AppState, Route, create_router, last_segment};
pub use server::Gateway;
