//! Reconnect API
//!
//! - `GET /api/sync?since=&epoch=` - events after a sequence, or a full
//!   snapshot of open orders when the gap is too large or the server restarted
//! - `POST /api/sync/replay` - run an offline command journal in order

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/sync", get(handler::sync))
        .route("/api/sync/replay", post(handler::replay))
}
