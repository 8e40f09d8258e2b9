//! Dining table API Handlers
//!
//! Occupancy is owned by the order engine; these routes never set a table
//! occupied or available directly, except for releasing a reservation.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::message::SyncAction;
use shared::models::{Capability, DiningTable, DiningTableCreate, DiningTableUpdate, ReserveTableRequest};
use shared::util::now_millis;
use validator::Validate;

use crate::api::{LocationQuery, scope_for};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::DiningTableRepository;
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "dining_tables";

/// Expired reservations read as available
fn effective(mut table: DiningTable, now: i64) -> DiningTable {
    table.status = table.effective_status(now);
    table
}

fn load(state: &ServerState, user: &CurrentUser, id: i64) -> AppResult<DiningTable> {
    let table = DiningTableRepository::new(state.db.clone())
        .find_by_id(id)?
        .ok_or_else(|| AppError::not_found(format!("Table {} not found", id)))?;
    scope_for(state, user, None)?.ensure(table.location_id)?;
    Ok(table)
}

fn announce(state: &ServerState, action: SyncAction, table: &DiningTable) {
    state.broadcast_sync(RESOURCE, action, table.id, Some(table.location_id), Some(table));
}

/// GET /api/tables?location_id= - active tables
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<Vec<DiningTable>>> {
    let scope = scope_for(&state, &user, query.location_id)?;
    let now = now_millis();
    let mut tables: Vec<DiningTable> = state
        .db
        .find::<DiningTable>(|t| t.is_active && scope.allows(t.location_id))?
        .into_iter()
        .map(|t| effective(t, now))
        .collect();
    tables.sort_by(|a, b| a.number.cmp(&b.number));
    Ok(Json(tables))
}

/// GET /api/tables/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<DiningTable>> {
    Ok(Json(effective(load(&state, &user, id)?, now_millis())))
}

/// POST /api/tables
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<Json<DiningTable>> {
    user.require(Capability::TablesManage)?;
    payload.validate()?;
    scope_for(&state, &user, None)?.ensure(payload.location_id)?;
    let table = DiningTableRepository::new(state.db.clone()).create(payload)?;

    announce(&state, SyncAction::Created, &table);
    Ok(Json(table))
}

/// PUT /api/tables/:id - number, capacity, shape
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<DiningTable>> {
    user.require(Capability::TablesManage)?;
    payload.validate()?;
    load(&state, &user, id)?;
    let table = DiningTableRepository::new(state.db.clone()).update(id, payload)?;

    announce(&state, SyncAction::Updated, &table);
    Ok(Json(table))
}

/// DELETE /api/tables/:id - deactivates; refused while occupied
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    user.require(Capability::TablesManage)?;
    let existing = load(&state, &user, id)?;
    let result = DiningTableRepository::new(state.db.clone()).delete(id)?;

    if result {
        state.broadcast_sync::<()>(RESOURCE, SyncAction::Deleted, id, Some(existing.location_id), None);
    }
    Ok(Json(result))
}

/// POST /api/tables/:id/reserve
pub async fn reserve(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ReserveTableRequest>,
) -> AppResult<Json<DiningTable>> {
    user.require(Capability::TablesManage)?;
    payload.validate()?;
    load(&state, &user, id)?;
    let table = DiningTableRepository::new(state.db.clone()).reserve(id, payload, now_millis())?;

    tracing::info!(table_id = id, until = ?table.reserved_until, "Table reserved");
    announce(&state, SyncAction::Updated, &table);
    Ok(Json(table))
}

/// DELETE /api/tables/:id/reserve
pub async fn release(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<DiningTable>> {
    user.require(Capability::TablesManage)?;
    load(&state, &user, id)?;
    let table = DiningTableRepository::new(state.db.clone()).release_reservation(id)?;

    announce(&state, SyncAction::Updated, &table);
    Ok(Json(table))
}
