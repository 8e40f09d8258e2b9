//! Sales report API

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/reports/sales", get(handler::sales))
        .route("/api/reports/sales.csv", get(handler::sales_csv))
}
