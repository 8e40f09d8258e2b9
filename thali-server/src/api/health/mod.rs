//! Health check - public route (no auth)

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::orders::storage::StorageStats;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    /// Changes on every restart; clients resync when it does
    epoch: String,
    subscribers: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    storage: Option<StorageStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// GET /api/health
async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let uptime_seconds = state.started_at.elapsed().as_secs();
    let (status, storage, error) = match state.orders.storage().get_stats() {
        Ok(stats) => ("ok", Some(stats), None),
        Err(e) => {
            tracing::error!(error = %e, "Health check: storage unavailable");
            ("degraded", None, Some(e.to_string()))
        }
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds,
        epoch: state.orders.epoch().to_string(),
        subscribers: state.message_bus.subscriber_count(),
        storage,
        error,
    })
}
