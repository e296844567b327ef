//! `POST /api/insert-sample-data`: run the configured fixture script.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fleetdesk_core::importer::{ExecutionSummary, ImportRunner};
use serde::Serialize;
use serde_json::json;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleDataResponse {
    pub success: bool,
    pub message: String,
    pub statements_executed: usize,
    pub skipped: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl From<&ExecutionSummary> for SampleDataResponse {
    fn from(summary: &ExecutionSummary) -> Self {
        let success = summary.is_success();
        let message = if success {
            format!(
                "Successfully inserted sample data. {} statements executed.",
                summary.succeeded
            )
        } else {
            format!(
                "Some statements failed. {} succeeded, {} failed.",
                summary.succeeded, summary.failed
            )
        };
        Self {
            success,
            message,
            statements_executed: summary.succeeded,
            skipped: summary.skipped,
            errors: summary.failures.clone(),
        }
    }
}

/// POST /api/insert-sample-data
///
/// The fixture goes through the same pipeline as an uploaded import, so
/// statements run in file order and benign duplicates are skipped. Responds
/// 500 if any statement failed hard or the file could not be read.
pub async fn insert_sample_data(State(state): State<AppState>) -> Response {
    let path = &state.config.sample_data_path;
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to read sample data file");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "message": "Failed to read or process SQL file",
                    "error": e.to_string(),
                })),
            )
                .into_response();
        }
    };

    let summary = ImportRunner::new(state.gateway.as_ref(), state.error_log.as_ref())
        .with_delay(state.config.import_statement_delay())
        .run_script(&content, |_| {})
        .await;

    let response = SampleDataResponse::from(&summary);
    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(response)).into_response()
}
