//! Category API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::message::SyncAction;
use shared::models::{Capability, Category, CategoryCreate, CategoryUpdate};
use validator::Validate;

use crate::api::{LocationQuery, scope_for};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::CategoryRepository;
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "categories";

/// Load a category the caller may see
fn load(state: &ServerState, user: &CurrentUser, id: i64) -> AppResult<Category> {
    let category = CategoryRepository::new(state.db.clone())
        .find_by_id(id)?
        .ok_or_else(|| AppError::not_found(format!("Category {} not found", id)))?;
    scope_for(state, user, None)?.ensure(category.location_id)?;
    Ok(category)
}

/// GET /api/categories?location_id=
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<Vec<Category>>> {
    let scope = scope_for(&state, &user, query.location_id)?;
    let mut categories = state.db.find::<Category>(|c| scope.allows(c.location_id))?;
    categories.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));
    Ok(Json(categories))
}

/// GET /api/categories/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Category>> {
    Ok(Json(load(&state, &user, id)?))
}

/// POST /api/categories
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<Category>> {
    user.require(Capability::MenuManage)?;
    payload.validate()?;
    scope_for(&state, &user, None)?.ensure(payload.location_id)?;
    let category = CategoryRepository::new(state.db.clone()).create(payload)?;

    state.broadcast_sync(
        RESOURCE,
        SyncAction::Created,
        category.id,
        Some(category.location_id),
        Some(&category),
    );
    Ok(Json(category))
}

/// PUT /api/categories/:id
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<Category>> {
    user.require(Capability::MenuManage)?;
    payload.validate()?;
    load(&state, &user, id)?;
    let category = CategoryRepository::new(state.db.clone()).update(id, payload)?;

    state.broadcast_sync(RESOURCE, SyncAction::Updated, id, Some(category.location_id), Some(&category));
    Ok(Json(category))
}

/// DELETE /api/categories/:id - refused while menu items use it
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    user.require(Capability::MenuManage)?;
    let existing = load(&state, &user, id)?;
    let result = CategoryRepository::new(state.db.clone()).delete(id)?;

    if result {
        state.broadcast_sync::<()>(RESOURCE, SyncAction::Deleted, id, Some(existing.location_id), None);
    }
    Ok(Json(result))
}
