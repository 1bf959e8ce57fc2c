use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::response::MessageResponse;
use crate::state::AppState;

/// POST /api/save-json
///
/// Overwrite the data file with the request body, which must be a JSON
/// array. Anything else is rejected before the file is opened.
pub async fn save_json(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> AppResult<Json<MessageResponse>> {
    let Value::Array(items) = &payload else {
        return Err(AppError::BadRequest(
            "Invalid data format. Expected array.".to_string(),
        ));
    };

    let bytes = to_pretty_json(&payload)?;
    let path = &state.config.data_file;
    tokio::fs::write(path, bytes).await.map_err(|e| {
        AppError::InternalError(format!("Failed to save {}: {e}", path.display()))
    })?;

    tracing::info!(path = %path.display(), items = items.len(), "Data file saved");
    Ok(Json(MessageResponse::new("JSON file saved successfully")))
}

/// Serialize with 4-space indentation.
fn to_pretty_json(value: &Value) -> AppResult<Vec<u8>> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value
        .serialize(&mut serializer)
        .map_err(|e| AppError::InternalError(format!("Failed to encode JSON: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_json_uses_four_spaces() {
        let value = serde_json::json!([{"id": 1}]);
        let text = String::from_utf8(to_pretty_json(&value).unwrap()).unwrap();
        assert_eq!(text, "[\n    {\n        \"id\": 1\n    }\n]");
    }
}
