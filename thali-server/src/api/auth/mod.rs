//! Authentication Routes

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

/// - /api/auth/login, /api/auth/signup: public
/// - /api/auth/me: requires a token (global require_auth middleware)
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/auth/login", post(handler::login))
        .route("/api/auth/signup", post(handler::signup))
        .route("/api/auth/me", get(handler::me))
}
