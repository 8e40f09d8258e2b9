//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::ErrorCode;
use shared::models::Capability;
use shared::order::{
    CommandResponse, OrderCommand, OrderCommandPayload, OrderEvent, OrderSnapshot, PendingRecord,
};

use crate::api::{LocationQuery, scope_for};
use crate::auth::{CurrentUser, LocationScope};
use crate::core::ServerState;
use crate::printing::ReceiptPrint;
use crate::utils::{AppError, AppResult};

/// Body of `POST /api/orders/commands`
///
/// The operator is always taken from the session.
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    /// Client-generated idempotency key; the server assigns one when absent
    #[serde(default)]
    pub command_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    pub payload: OrderCommandPayload,
}

impl CommandRequest {
    fn into_command(self, user: &CurrentUser) -> OrderCommand {
        let mut cmd = OrderCommand::new(user.id, user.display_name.clone(), user.role, self.payload);
        if let Some(command_id) = self.command_id.filter(|id| !id.trim().is_empty()) {
            cmd.command_id = command_id;
        }
        if let Some(timestamp) = self.timestamp {
            cmd.timestamp = timestamp;
        }
        cmd
    }
}

/// Order visible to the caller, else `OrderNotFound`.
///
/// Orders of other locations read as missing so ids cannot be probed.
fn load(state: &ServerState, user: &CurrentUser, order_id: &str) -> AppResult<OrderSnapshot> {
    let scope = scope_for(state, user, None)?;
    state
        .orders
        .get_snapshot(order_id)?
        .filter(|o| scope.allows(o.location_id))
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::OrderNotFound, format!("Order {} not found", order_id))
        })
}

/// POST /api/orders/commands - run one order command
///
/// Business failures come back inside the `CommandResponse` with HTTP 200,
/// the same shape journal replay returns.
pub async fn execute(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(request): Json<CommandRequest>,
) -> AppResult<Json<CommandResponse>> {
    let scope = LocationScope::for_user(&user, &state.db)?;
    let cmd = request.into_command(&user);
    tracing::debug!(
        command_id = %cmd.command_id,
        command = cmd.payload.name(),
        operator_id = user.id,
        "Order command received"
    );
    Ok(Json(state.orders.execute_scoped(cmd, &scope)))
}

/// GET /api/orders?location_id= - open orders
pub async fn list_active(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<Vec<OrderSnapshot>>> {
    let scope = scope_for(&state, &user, query.location_id)?;
    let mut orders: Vec<OrderSnapshot> = state
        .orders
        .get_active_orders()?
        .into_iter()
        .filter(|o| scope.allows(o.location_id))
        .collect();
    orders.sort_by_key(|o| o.created_at);
    Ok(Json(orders))
}

/// GET /api/orders/pending?location_id= - orders waiting on a manager
pub async fn list_pending(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<Vec<PendingRecord>>> {
    let scope = scope_for(&state, &user, query.location_id)?;
    let mut records: Vec<PendingRecord> = state
        .orders
        .get_pending_records()?
        .into_iter()
        .filter(|r| scope.allows(r.location_id))
        .collect();
    records.sort_by_key(|r| r.transferred_at);
    Ok(Json(records))
}

/// GET /api/orders/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<OrderSnapshot>> {
    Ok(Json(load(&state, &user, &id)?))
}

/// GET /api/orders/:id/events - full history, oldest first
pub async fn events(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<OrderEvent>>> {
    load(&state, &user, &id)?;
    Ok(Json(state.orders.get_events_for_order(&id)?))
}

/// POST /api/orders/:id/print - send the receipt to the location printer
pub async fn print(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ReceiptPrint>> {
    user.require(Capability::OrdersEdit)?;
    let order = load(&state, &user, &id)?;
    let result = state.printer.print_receipt(&order).await?;
    if !result.printed {
        tracing::warn!(
            order_id = %id,
            error = result.error.as_deref().unwrap_or("no printer configured"),
            "Receipt not printed, returning text"
        );
    }
    Ok(Json(result))
}
