//! Handlers for the managed image directory.
//!
//! Every client-supplied filename is validated against the admin filename
//! pattern before any filesystem call, so a request can never name a path
//! outside the image directory.

use std::io::ErrorKind;

use axum::extract::{Multipart, Path, State};
use axum::Json;
use dorama_core::naming::{is_image_file, validate_filename};

use crate::error::{AppError, AppResult};
use crate::response::MessageResponse;
use crate::state::AppState;

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "image";

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// GET /api/images
///
/// Image filenames (`.webp`, `.png`, `.jpg`, `.jpeg`, any case) in the image
/// directory, sorted.
pub async fn list_images(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    let dir = &state.config.image_dir;
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        AppError::InternalError(format!("Failed to list images in {}: {e}", dir.display()))
    })?;

    let mut images = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to list images: {e}")))?
    {
        if let Some(name) = entry.file_name().to_str() {
            if is_image_file(name) {
                images.push(name.to_string());
            }
        }
    }
    images.sort();
    Ok(Json(images))
}

/// POST /api/upload
///
/// Store the `image` field under its client-supplied filename, replacing any
/// existing file of that name.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<MessageResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        validate_filename(&filename)?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
        let path = state.config.image_dir.join(&filename);
        tokio::fs::write(&path, &bytes).await.map_err(|e| {
            AppError::InternalError(format!("Failed to write {}: {e}", path.display()))
        })?;

        tracing::info!(filename = %filename, size = bytes.len(), "Image uploaded");
        return Ok(Json(
            MessageResponse::new("Image uploaded successfully").with_filename(filename),
        ));
    }

    Err(AppError::BadRequest("No file uploaded".to_string()))
}

/// DELETE /api/images/{filename}
pub async fn delete_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    validate_filename(&filename)?;

    let path = state.config.image_dir.join(&filename);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => {
            tracing::info!(filename = %filename, "Image deleted");
            Ok(Json(MessageResponse::new("File deleted successfully")))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(AppError::NotFound("File not found".to_string()))
        }
        Err(e) => Err(AppError::InternalError(format!(
            "Failed to delete {}: {e}",
            path.display()
        ))),
    }
}
