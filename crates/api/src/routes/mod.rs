pub mod admin;
pub mod auth;
pub mod health;
pub mod importer;
pub mod query;
pub mod reports;

use std::time::Duration;

use axum::http::StatusCode;
use axum::Router;
use tower_http::timeout::TimeoutLayer;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                      liveness (no database access)
/// /db-test                     SELECT 1 through the gateway
/// /query                       raw SQL gateway (GET ?sql=, POST { sql })
///
/// /auth/login                  login (public)
/// /auth/me                     current session (requires auth)
///
/// /reports/summary             fleet analytics (requires auth)
///
/// /admin/clear-data            wipe and re-seed (admin only)
/// /admin/restore-admin         re-create the admin account (admin only)
/// /admin/error-log             recent import failures (admin only)
///
/// /import/preview              multipart SQL upload, parse only
/// /import                      multipart SQL upload, JSON report
/// /import/stream               multipart SQL upload, SSE progress
/// /insert-sample-data          run the configured fixture script
/// ```
///
/// The import routes sit outside the request timeout: a script runs for as
/// long as its statements take.
pub fn api_routes(request_timeout: Duration) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(query::router())
        .nest("/auth", auth::router())
        .nest("/reports", reports::router())
        .nest("/admin", admin::router())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .merge(importer::router())
}
