//! Consistency check API
//!
//! `GET` reports inconsistencies between orders, pending records and tables
//! without changing anything; `POST .../repair` fixes them in one
//! transaction.

use axum::{
    Json, Router,
    extract::State,
    middleware,
    routing::{get, post},
};
use shared::message::{NotificationLevel, NotificationPayload};
use shared::models::Capability;

use crate::auth::{CurrentUser, require_capability};
use crate::core::ServerState;
use crate::message::BusMessage;
use crate::orders::ReconcileReport;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/admin/reconcile", get(scan))
        .route("/api/admin/reconcile/repair", post(repair))
        .route_layer(middleware::from_fn(require_capability(Capability::SystemReconcile)))
}

/// GET /api/admin/reconcile
async fn scan(State(state): State<ServerState>) -> AppResult<Json<ReconcileReport>> {
    Ok(Json(state.reconciler.scan()?))
}

/// POST /api/admin/reconcile/repair
async fn repair(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ReconcileReport>> {
    let report = state.reconciler.repair()?;

    if report.repaired {
        crate::security_log!(
            WARN,
            "reconcile_repair",
            user_id = user.id,
            issues = report.issues.len()
        );
        state.message_bus.publish(BusMessage::notification(
            None,
            &NotificationPayload {
                level: NotificationLevel::Warning,
                title: "Data repaired".to_string(),
                message: format!("{} inconsistencies fixed", report.issues.len()),
            },
        ));
    }
    Ok(Json(report))
}
