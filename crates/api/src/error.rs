use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fleetdesk_core::error::CoreError;
use fleetdesk_core::gateway::GatewayError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Gateway failures keep the wire shape clients of `/api/query` rely on;
/// everything else uses `{ "error", "code" }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `fleetdesk_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A statement sent through the gateway failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A database error from sqlx (tables the backend owns).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Gateway(err) => return gateway_error_response(err),

            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
                CoreError::Gateway(err) => return gateway_error_response(err),
            },

            // --- Database errors ---
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Gateway errors are returned verbatim: the driver's message, SQLSTATE and
/// errno for execution failures, a plain `error` for a missing query.
fn gateway_error_response(err: &GatewayError) -> Response {
    let (status, body) = match err {
        GatewayError::MissingQuery => (
            StatusCode::BAD_REQUEST,
            json!({ "error": err.to_string() }),
        ),
        GatewayError::QueryExecution {
            message,
            sql_state,
            errno,
        } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": message, "sqlState": sql_state, "errno": errno }),
        ),
        GatewayError::Transport(msg) => {
            tracing::error!(error = %msg, "Gateway transport error");
            (
                StatusCode::BAD_GATEWAY,
                json!({ "error": err.to_string(), "code": "BAD_GATEWAY" }),
            )
        }
    };

    (status, axum::Json(body)).into_response()
}
