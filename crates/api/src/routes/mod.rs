pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /images                  list image filenames (GET)
/// /images/{filename}       delete one image (DELETE)
/// /upload                  multipart upload, field `image` (POST)
/// /save-json               overwrite the data file with a JSON array (POST)
/// /convert-images          run the image conversion script (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/images", get(handlers::images::list_images))
        .route("/images/{filename}", delete(handlers::images::delete_image))
        .route(
            "/upload",
            post(handlers::images::upload_image)
                .layer(DefaultBodyLimit::max(handlers::images::MAX_UPLOAD_BYTES)),
        )
        .route("/save-json", post(handlers::data::save_json))
        .route("/convert-images", post(handlers::convert::convert_images))
}
