use std::time::Duration;

use axum::extract::State;
use axum::Json;
use dorama_core::scripting::{ScriptExecutor, ScriptInput};

use crate::error::{AppError, AppResult};
use crate::response::MessageResponse;
use crate::state::AppState;

/// POST /api/convert-images
///
/// Run the conversion script from the parent of the image directory, passing
/// the image folder's name as its argument. A non-zero exit returns 500 with
/// the script's stderr.
pub async fn convert_images(State(state): State<AppState>) -> AppResult<Json<MessageResponse>> {
    let config = &state.config;
    let script = std::path::absolute(&config.convert_script)
        .map_err(|e| AppError::InternalError(format!("Invalid script path: {e}")))?;
    let script = script
        .to_str()
        .ok_or_else(|| AppError::InternalError("Script path is not valid UTF-8".to_string()))?;

    let mut input = ScriptInput::with_timeout(Duration::from_secs(config.convert_timeout_secs));
    if let Some(folder) = config.image_dir.file_name().and_then(|n| n.to_str()) {
        input = input.arg(folder);
    }
    if let Some(parent) = config.image_dir.parent().filter(|p| !p.as_os_str().is_empty()) {
        input = input.in_dir(parent);
    }

    tracing::info!(script = %script, "Starting image conversion");
    let output = state.executor.execute(script, input).await.map_err(AppError::from)?;
    tracing::info!(duration_ms = output.duration_ms, "Image conversion finished");

    Ok(Json(
        MessageResponse::new("Images converted successfully").with_output(output.stdout),
    ))
}
