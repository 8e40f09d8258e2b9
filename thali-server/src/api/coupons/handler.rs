//! Dish coupon API Handlers
//!
//! Coupons are applied to orders through the `ApplyCoupon` order command;
//! these routes only manage the catalog.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::message::SyncAction;
use shared::models::{Capability, DishCoupon, DishCouponCreate, DishCouponUpdate};
use validator::Validate;

use crate::api::{LocationQuery, scope_for};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::CouponRepository;
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "coupons";

fn load(state: &ServerState, user: &CurrentUser, id: i64) -> AppResult<DishCoupon> {
    let coupon = CouponRepository::new(state.db.clone())
        .find_by_id(id)?
        .ok_or_else(|| AppError::not_found(format!("Coupon {} not found", id)))?;
    scope_for(state, user, None)?.ensure(coupon.location_id)?;
    Ok(coupon)
}

/// GET /api/coupons?location_id=
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<Vec<DishCoupon>>> {
    let scope = scope_for(&state, &user, query.location_id)?;
    let mut coupons = state.db.find::<DishCoupon>(|c| scope.allows(c.location_id))?;
    coupons.sort_by(|a, b| a.code.cmp(&b.code));
    Ok(Json(coupons))
}

/// GET /api/coupons/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<DishCoupon>> {
    Ok(Json(load(&state, &user, id)?))
}

/// POST /api/coupons
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<DishCouponCreate>,
) -> AppResult<Json<DishCoupon>> {
    user.require(Capability::CouponsManage)?;
    payload.validate()?;
    scope_for(&state, &user, None)?.ensure(payload.location_id)?;
    let coupon = CouponRepository::new(state.db.clone()).create(payload)?;

    state.broadcast_sync(RESOURCE, SyncAction::Created, coupon.id, Some(coupon.location_id), Some(&coupon));
    Ok(Json(coupon))
}

/// PUT /api/coupons/:id - percentage or active flag
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<DishCouponUpdate>,
) -> AppResult<Json<DishCoupon>> {
    user.require(Capability::CouponsManage)?;
    payload.validate()?;
    load(&state, &user, id)?;
    let coupon = CouponRepository::new(state.db.clone()).update(id, payload)?;

    state.broadcast_sync(RESOURCE, SyncAction::Updated, id, Some(coupon.location_id), Some(&coupon));
    Ok(Json(coupon))
}

/// DELETE /api/coupons/:id
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    user.require(Capability::CouponsManage)?;
    let existing = load(&state, &user, id)?;
    let result = CouponRepository::new(state.db.clone()).delete(id)?;

    if result {
        state.broadcast_sync::<()>(RESOURCE, SyncAction::Deleted, id, Some(existing.location_id), None);
    }
    Ok(Json(result))
}
