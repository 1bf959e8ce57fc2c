#![allow(dead_code)]

use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use dorama_api::config::AdminConfig;
use dorama_api::router::build_app_router;
use dorama_api::state::AppState;

/// A temporary project tree: `<root>/assets/img`, `<root>/data/dramas.json`,
/// `<root>/scripts/optimize_images.py`.
pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(root.path().join("assets/img")).expect("image dir");
        std::fs::create_dir_all(root.path().join("data")).expect("data dir");
        std::fs::create_dir_all(root.path().join("scripts")).expect("scripts dir");
        Self { root }
    }

    pub fn image_dir(&self) -> PathBuf {
        self.root.path().join("assets/img")
    }

    pub fn data_file(&self) -> PathBuf {
        self.root.path().join("data/dramas.json")
    }

    pub fn script(&self) -> PathBuf {
        self.root.path().join("scripts/optimize_images.py")
    }

    /// Write a shell script at the conversion script path. Tests run it with
    /// `sh` as the interpreter.
    pub fn write_script(&self, body: &str) {
        std::fs::write(self.script(), body).expect("write script");
    }

    pub fn touch_image(&self, name: &str) {
        std::fs::write(self.image_dir().join(name), b"img").expect("write image");
    }

    pub fn config(&self) -> AdminConfig {
        AdminConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["http://localhost:5173".to_string()],
            request_timeout_secs: 30,
            image_dir: self.image_dir(),
            data_file: self.data_file(),
            convert_script: self.script(),
            python_bin: "sh".to_string(),
            convert_timeout_secs: 10,
        }
    }

    /// Build the full application router with all middleware layers.
    pub fn app(&self) -> Router {
        build_app_router(AppState::new(self.config()))
    }
}

pub fn exists(path: &Path) -> bool {
    path.exists()
}

/// Send a GET request.
pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, Body::empty(), None).await
}

/// Send a DELETE request.
pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, Body::empty(), None).await
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response {
    send(
        app,
        Method::POST,
        uri,
        Body::from(json.to_string()),
        Some("application/json".to_string()),
    )
    .await
}

/// Send a POST request with no body.
pub async fn post_empty(app: Router, uri: &str) -> Response {
    send(app, Method::POST, uri, Body::empty(), None).await
}

pub const BOUNDARY: &str = "dorama-test-boundary";

/// Build a multipart body with one file field.
pub fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Send a multipart POST request.
pub async fn post_multipart(app: Router, uri: &str, body: Vec<u8>) -> Response {
    send(
        app,
        Method::POST,
        uri,
        Body::from(body),
        Some(format!("multipart/form-data; boundary={BOUNDARY}")),
    )
    .await
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Body,
    content_type: Option<String>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
