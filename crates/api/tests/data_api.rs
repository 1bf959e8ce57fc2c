//! Integration tests for `POST /api/save-json`.

mod common;

use axum::http::StatusCode;
use common::{body_json, post_json, TestProject};
use serde_json::json;

#[tokio::test]
async fn array_payload_is_written_with_four_space_indent() {
    let project = TestProject::new();
    let payload = json!([{"id": 1, "title": "Goblin"}]);

    let response = post_json(project.app(), "/api/save-json", payload.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "JSON file saved successfully");

    let written = std::fs::read_to_string(project.data_file()).unwrap();
    assert!(written.starts_with("[\n    {\n        \""));
    let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed, payload);
}

#[tokio::test]
async fn non_array_payload_is_rejected_without_writing() {
    let project = TestProject::new();
    std::fs::write(project.data_file(), "[]").unwrap();

    for payload in [json!({"id": 1}), json!("text"), json!(42), json!(null)] {
        let response = post_json(project.app(), "/api/save-json", payload).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"],
            "Invalid data format. Expected array."
        );
    }
    assert_eq!(std::fs::read_to_string(project.data_file()).unwrap(), "[]");
}

#[tokio::test]
async fn unwritable_target_is_500() {
    let project = TestProject::new();
    std::fs::remove_dir_all(project.root.path().join("data")).unwrap();

    let response = post_json(project.app(), "/api/save-json", json!([])).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
