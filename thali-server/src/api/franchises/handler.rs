//! Franchise API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::message::SyncAction;
use shared::models::{Capability, Franchise, FranchiseCreate, FranchiseUpdate, Role};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::FranchiseRepository;
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "franchises";

/// Superadmins see every franchise, everyone else only their own
fn ensure_visible(user: &CurrentUser, id: i64) -> AppResult<()> {
    if user.role == Role::Superadmin || user.franchise_id == Some(id) {
        Ok(())
    } else {
        Err(AppError::out_of_scope(format!("Franchise {}", id)))
    }
}

/// GET /api/franchises
pub async fn list(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<Vec<Franchise>>> {
    let franchises = FranchiseRepository::new(state.db.clone())
        .find_all()?
        .into_iter()
        .filter(|f| ensure_visible(&user, f.id).is_ok())
        .collect();
    Ok(Json(franchises))
}

/// GET /api/franchises/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Franchise>> {
    ensure_visible(&user, id)?;
    let franchise = FranchiseRepository::new(state.db.clone())
        .find_by_id(id)?
        .ok_or_else(|| AppError::not_found(format!("Franchise {} not found", id)))?;
    Ok(Json(franchise))
}

/// POST /api/franchises
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<FranchiseCreate>,
) -> AppResult<Json<Franchise>> {
    user.require(Capability::FranchisesManage)?;
    payload.validate()?;
    let franchise = FranchiseRepository::new(state.db.clone()).create(payload)?;

    state.broadcast_sync(RESOURCE, SyncAction::Created, franchise.id, None, Some(&franchise));
    Ok(Json(franchise))
}

/// PUT /api/franchises/:id
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<FranchiseUpdate>,
) -> AppResult<Json<Franchise>> {
    user.require(Capability::FranchisesManage)?;
    payload.validate()?;
    let franchise = FranchiseRepository::new(state.db.clone()).update(id, payload)?;

    state.broadcast_sync(RESOURCE, SyncAction::Updated, id, None, Some(&franchise));
    Ok(Json(franchise))
}

/// DELETE /api/franchises/:id - deactivates
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    user.require(Capability::FranchisesManage)?;
    let result = FranchiseRepository::new(state.db.clone()).delete(id)?;

    if result {
        state.broadcast_sync::<()>(RESOURCE, SyncAction::Deleted, id, None, None);
    }
    Ok(Json(result))
}
