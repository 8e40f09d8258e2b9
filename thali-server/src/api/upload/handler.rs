//! Image Upload Handler

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use shared::models::Capability;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::StoredImage;
use crate::utils::{AppError, AppResult};

/// POST /api/upload - multipart field `file`
pub async fn upload(
    State(state): State<ServerState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Json<StoredImage>> {
    user.require(Capability::MenuManage)?;

    let mut upload: Option<(String, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart request: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::validation("No filename provided in file field"))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(format!("Multipart error: {}", e)))?;
        upload = Some((filename, data));
        break;
    }

    let (filename, data) =
        upload.ok_or_else(|| AppError::validation("No 'file' field found"))?;

    // Decoding and re-encoding is CPU bound
    let images = state.images.clone();
    let stored = tokio::task::spawn_blocking(move || images.store(&data, &filename))
        .await
        .map_err(|e| AppError::internal(format!("Image task failed: {}", e)))??;

    tracing::info!(user_id = user.id, filename = %stored.filename, "Image uploaded");
    Ok(Json(stored))
}

/// GET /images/:filename
pub async fn serve(State(state): State<ServerState>, Path(filename): Path<String>) -> Response {
    let Some(path) = state.images.resolve(&filename) else {
        return (StatusCode::BAD_REQUEST, "Invalid filename").into_response();
    };

    match tokio::fs::read(&path).await {
        Ok(content) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, mime.to_string()),
                    // Content-addressed, never changes
                    (header::CACHE_CONTROL, "public, max-age=31536000, immutable".to_string()),
                ],
                content,
            )
                .into_response()
        }
        Err(e) => {
            tracing::debug!(filename = %filename, error = %e, "Image not found");
            (StatusCode::NOT_FOUND, "File not found").into_response()
        }
    }
}
