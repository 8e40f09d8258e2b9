//! Reconnect handlers

use axum::{
    Json,
    extract::{Query, State},
};
use shared::error::ErrorCode;
use shared::order::{ReplayRequest, ReplayResponse, SyncResponse};

use crate::auth::{CurrentUser, LocationScope};
use crate::core::ServerState;
use crate::orders::SyncRequest;
use crate::orders::sync::MAX_REPLAY_BATCH;
use crate::utils::{AppError, AppResult};

/// GET /api/sync
pub async fn sync(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(request): Query<SyncRequest>,
) -> AppResult<Json<SyncResponse>> {
    let scope = LocationScope::for_user(&user, &state.db)?;
    Ok(Json(state.sync.sync(&request, &scope)?))
}

/// POST /api/sync/replay
///
/// Journal entries are re-attributed to the session user; a client can only
/// replay its own work.
pub async fn replay(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(request): Json<ReplayRequest>,
) -> AppResult<Json<ReplayResponse>> {
    if request.commands.len() > MAX_REPLAY_BATCH {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!(
                "Replay batch of {} exceeds the limit of {}",
                request.commands.len(),
                MAX_REPLAY_BATCH
            ),
        ));
    }

    let scope = LocationScope::for_user(&user, &state.db)?;
    let commands = request
        .commands
        .into_iter()
        .map(|mut cmd| {
            cmd.operator_id = user.id;
            cmd.operator_name = user.display_name.clone();
            cmd.operator_role = user.role;
            cmd
        })
        .collect();

    tracing::info!(user_id = user.id, "Replaying offline journal");
    Ok(Json(state.sync.replay(commands, &scope)?))
}
