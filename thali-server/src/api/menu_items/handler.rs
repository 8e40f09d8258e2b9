//! Menu item API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::message::SyncAction;
use shared::models::{Capability, MenuItem, MenuItemCreate, MenuItemUpdate};
use validator::Validate;

use crate::api::scope_for;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::MenuItemRepository;
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "menu_items";

#[derive(Debug, Default, Deserialize)]
pub struct MenuItemQuery {
    pub location_id: Option<i64>,
    pub category_id: Option<i64>,
    /// Hide unavailable dishes (order-taking screens)
    #[serde(default)]
    pub available_only: bool,
}

fn load(state: &ServerState, user: &CurrentUser, id: i64) -> AppResult<MenuItem> {
    let item = MenuItemRepository::new(state.db.clone())
        .find_by_id(id)?
        .ok_or_else(|| AppError::not_found(format!("Menu item {} not found", id)))?;
    scope_for(state, user, None)?.ensure(item.location_id)?;
    Ok(item)
}

/// GET /api/menu-items?location_id=&category_id=&available_only=
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<MenuItemQuery>,
) -> AppResult<Json<Vec<MenuItem>>> {
    let scope = scope_for(&state, &user, query.location_id)?;
    let mut items = state.db.find::<MenuItem>(|m| {
        scope.allows(m.location_id)
            && query.category_id.is_none_or(|c| m.category_id == c)
            && (!query.available_only || m.is_available)
    })?;
    items.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(items))
}

/// GET /api/menu-items/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<MenuItem>> {
    Ok(Json(load(&state, &user, id)?))
}

/// POST /api/menu-items
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<MenuItemCreate>,
) -> AppResult<Json<MenuItem>> {
    user.require(Capability::MenuManage)?;
    payload.validate()?;
    scope_for(&state, &user, None)?.ensure(payload.location_id)?;
    let item = MenuItemRepository::new(state.db.clone()).create(payload)?;

    state.broadcast_sync(RESOURCE, SyncAction::Created, item.id, Some(item.location_id), Some(&item));
    Ok(Json(item))
}

/// PUT /api/menu-items/:id - price, availability, image
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<MenuItemUpdate>,
) -> AppResult<Json<MenuItem>> {
    user.require(Capability::MenuManage)?;
    payload.validate()?;
    load(&state, &user, id)?;
    let item = MenuItemRepository::new(state.db.clone()).update(id, payload)?;

    state.broadcast_sync(RESOURCE, SyncAction::Updated, id, Some(item.location_id), Some(&item));
    Ok(Json(item))
}

/// DELETE /api/menu-items/:id
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    user.require(Capability::MenuManage)?;
    let existing = load(&state, &user, id)?;
    let result = MenuItemRepository::new(state.db.clone()).delete(id)?;

    if result {
        state.broadcast_sync::<()>(RESOURCE, SyncAction::Deleted, id, Some(existing.location_id), None);
    }
    Ok(Json(result))
}
