//! Liveness and database connectivity checks.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use fleetdesk_core::facade::Database;
use fleetdesk_core::types::Row;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    /// ISO-8601 UTC time the response was produced.
    pub timestamp: String,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
}

/// Result of `GET /api/db-test`.
#[derive(Debug, Serialize)]
pub struct DbTestResponse {
    pub status: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Row>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /api/health
///
/// Does not touch the database.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "Vehicle Management Backend is running",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /api/db-test
///
/// Runs `SELECT 1 as test` through the gateway.
pub async fn db_test(State(state): State<AppState>) -> (StatusCode, Json<DbTestResponse>) {
    let db = Database::new(state.gateway.as_ref());
    match db.select("SELECT 1 as test").await {
        Ok(results) => (
            StatusCode::OK,
            Json(DbTestResponse {
                status: "OK",
                message: "Database connection successful",
                results: Some(results),
                error: None,
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Database connection test failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DbTestResponse {
                    status: "ERROR",
                    message: "Database connection failed",
                    results: None,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}
