//! Order API
//!
//! Writes go through a single command endpoint; everything else is a read
//! of the engine's snapshots, pending records and event log.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_active))
        .route("/commands", post(handler::execute))
        .route("/pending", get(handler::list_pending))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/events", get(handler::events))
        .route("/{id}/print", post(handler::print))
}
