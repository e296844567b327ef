//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no router needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use fleetdesk_api::error::AppError;
use fleetdesk_core::error::CoreError;
use fleetdesk_core::gateway::GatewayError;
use http_body_util::BodyExt;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Test: CoreError::NotFound maps to 404 with NOT_FOUND code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Vehicle",
        id: "1HGCM82633A004352".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Vehicle with id 1HGCM82633A004352 not found");
}

// ---------------------------------------------------------------------------
// Test: validation and auth errors keep their message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_error_returns_400() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Validation("bad input".into()))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "bad input");
}

#[tokio::test]
async fn unauthorized_and_forbidden_map_to_401_and_403() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Unauthorized("who are you".into()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");

    let (status, json) =
        error_to_response(AppError::Core(CoreError::Forbidden("not yours".into()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
    assert_eq!(json["error"], "not yours");
}

#[tokio::test]
async fn bad_request_error_returns_400() {
    let (status, json) =
        error_to_response(AppError::BadRequest("Missing required 'file' field".into())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "Missing required 'file' field");
}

// ---------------------------------------------------------------------------
// Test: internal errors do not leak details
// ---------------------------------------------------------------------------

#[tokio::test]
async fn internal_errors_are_sanitized() {
    let (status, json) =
        error_to_response(AppError::InternalError("secret path /etc/x".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");

    let (status, json) =
        error_to_response(AppError::Core(CoreError::Internal("pool exhausted".into()))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");

    let (status, json) = error_to_response(AppError::Database(sqlx::Error::PoolTimedOut)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
}

// ---------------------------------------------------------------------------
// Test: gateway errors keep the /api/query wire shape
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_query_returns_400_with_error_only() {
    let (status, json) = error_to_response(AppError::Gateway(GatewayError::MissingQuery)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, serde_json::json!({ "error": "SQL query is required" }));
}

#[tokio::test]
async fn query_execution_error_carries_sql_state_and_errno() {
    let err = GatewayError::QueryExecution {
        message: "Duplicate entry '1' for key 'PRIMARY'".into(),
        sql_state: Some("23000".into()),
        errno: Some(1062),
    };

    let (status, json) = error_to_response(AppError::Gateway(err)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Duplicate entry '1' for key 'PRIMARY'");
    assert_eq!(json["sqlState"], "23000");
    assert_eq!(json["errno"], 1062);
}

#[tokio::test]
async fn gateway_error_wrapped_in_core_error_keeps_shape() {
    let err = CoreError::Gateway(GatewayError::execution("connect ECONNREFUSED"));

    let (status, json) = error_to_response(AppError::Core(err)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "connect ECONNREFUSED");
    assert!(json["sqlState"].is_null());
    assert!(json["errno"].is_null());
}

#[tokio::test]
async fn transport_error_returns_502() {
    let err = GatewayError::Transport("connection reset".into());

    let (status, json) = error_to_response(AppError::Gateway(err)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "BAD_GATEWAY");
    assert_eq!(json["error"], "Gateway request failed: connection reset");
}
