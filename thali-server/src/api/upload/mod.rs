//! Upload Routes
//!
//! `POST /api/upload` stores a dish image; `GET /images/{file}` serves it
//! without authentication.

mod handler;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::core::ServerState;
use crate::services::image_store::MAX_FILE_SIZE;

/// Multipart framing on top of the file itself
const BODY_LIMIT: usize = MAX_FILE_SIZE + 1024 * 1024;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/upload",
            post(handler::upload).layer(DefaultBodyLimit::max(BODY_LIMIT)),
        )
        .route("/images/{filename}", get(handler::serve))
}
