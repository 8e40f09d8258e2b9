//! Authentication Handlers

use axum::{Json, extract::State};
use serde::Serialize;
use shared::error::ErrorCode;
use shared::models::{LoginRequest, LoginResponse, SignupRequest, User};

use crate::AppError;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::UserRepository;
use crate::utils::AppResult;

/// POST /api/auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let resp = state.identity.sign_in(req).await?;
    Ok(Json(resp))
}

/// POST /api/auth/signup - account waits for approval
pub async fn signup(
    State(state): State<ServerState>,
    Json(req): Json<SignupRequest>,
) -> AppResult<Json<User>> {
    let user = state.identity.sign_up(req)?;
    Ok(Json(user))
}

#[derive(Serialize)]
pub struct MeResponse {
    user: User,
    permissions: Vec<String>,
}

/// GET /api/auth/me - the stored account, not the token's copy
pub async fn me(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<MeResponse>> {
    let stored = UserRepository::new(state.db.clone())
        .find_by_id(user.id)?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    Ok(Json(MeResponse {
        permissions: stored.role.permissions(),
        user: stored,
    }))
}
