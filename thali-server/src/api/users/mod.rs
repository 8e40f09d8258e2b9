//! User administration API

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/users", get(handler::list))
        .route("/api/users/{id}", put(handler::update))
}
