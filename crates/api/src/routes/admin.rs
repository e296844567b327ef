//! Route definitions for the `/admin` resource. Every handler requires the
//! admin role.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// POST /clear-data     -> clear_data
/// POST /restore-admin  -> restore_admin
/// GET  /error-log      -> error_log
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/clear-data", post(admin::clear_data))
        .route("/restore-admin", post(admin::restore_admin))
        .route("/error-log", get(admin::error_log))
}
