//! Location API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::message::SyncAction;
use shared::models::{Capability, Location, LocationCreate, LocationUpdate, Role};
use validator::Validate;

use crate::auth::{CurrentUser, LocationScope};
use crate::core::ServerState;
use crate::db::repository::LocationRepository;
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "locations";

/// GET /api/locations - locations visible to the caller
pub async fn list(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<Vec<Location>>> {
    let scope = LocationScope::for_user(&user, &state.db)?;
    let locations = LocationRepository::new(state.db.clone())
        .find_all()?
        .into_iter()
        .filter(|l| scope.allows(l.id))
        .collect();
    Ok(Json(locations))
}

/// GET /api/locations/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Location>> {
    LocationScope::for_user(&user, &state.db)?.ensure(id)?;
    let location = LocationRepository::new(state.db.clone())
        .find_by_id(id)?
        .ok_or_else(|| AppError::not_found(format!("Location {} not found", id)))?;
    Ok(Json(location))
}

/// POST /api/locations - admins create within their own franchise
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<LocationCreate>,
) -> AppResult<Json<Location>> {
    user.require(Capability::LocationsManage)?;
    payload.validate()?;
    if user.role != Role::Superadmin && user.franchise_id != Some(payload.franchise_id) {
        return Err(AppError::out_of_scope(format!("Franchise {}", payload.franchise_id)));
    }
    let location = LocationRepository::new(state.db.clone()).create(payload)?;

    state.broadcast_sync(RESOURCE, SyncAction::Created, location.id, Some(location.id), Some(&location));
    Ok(Json(location))
}

/// PUT /api/locations/:id - settings, tax rates, printer
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<LocationUpdate>,
) -> AppResult<Json<Location>> {
    user.require(Capability::LocationsManage)?;
    payload.validate()?;
    LocationScope::for_user(&user, &state.db)?.ensure(id)?;
    let location = LocationRepository::new(state.db.clone()).update(id, payload)?;

    state.broadcast_sync(RESOURCE, SyncAction::Updated, id, Some(id), Some(&location));
    Ok(Json(location))
}
