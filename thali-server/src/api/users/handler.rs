//! User administration handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::message::SyncAction;
use shared::models::{Capability, Role, User, UserUpdate};

use crate::auth::{CurrentUser, LocationScope};
use crate::core::ServerState;
use crate::db::repository::UserRepository;
use crate::utils::AppResult;

const RESOURCE: &str = "users";

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    /// Only accounts waiting for approval
    #[serde(default)]
    pub pending: bool,
}

/// GET /api/users - accounts the caller may manage
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<UserListQuery>,
) -> AppResult<Json<Vec<User>>> {
    user.require(Capability::UsersApprove)?;
    let scope = LocationScope::for_user(&user, &state.db)?;

    let users = UserRepository::new(state.db.clone())
        .find_all()?
        .into_iter()
        .filter(|u| !query.pending || !u.is_approved)
        .filter(|u| match (&scope, u.location_id) {
            (LocationScope::All, _) => true,
            (scope, Some(location_id)) => scope.allows(location_id),
            // Unbound accounts (admins, fresh signups) by franchise
            (_, None) => u.role != Role::Superadmin && u.franchise_id == user.franchise_id,
        })
        .collect();
    Ok(Json(users))
}

/// PUT /api/users/:id - approve, activate, change role or binding
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<User>> {
    let updated = state.identity.approve(&user, id, payload)?;
    state.broadcast_sync(RESOURCE, SyncAction::Updated, updated.id, updated.location_id, Some(&updated));
    Ok(Json(updated))
}
