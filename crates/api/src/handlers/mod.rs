pub mod admin;
pub mod auth;
pub mod health;
pub mod importer;
pub mod query;
pub mod reports;
pub mod sample_data;

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

/// Fallback for unknown routes.
pub async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Endpoint not found" })),
    )
}
