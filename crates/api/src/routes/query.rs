//! Route definitions for the SQL gateway.

use axum::routing::get;
use axum::Router;

use crate::handlers::query;
use crate::state::AppState;

/// ```text
/// GET  /query?sql=  -> get_query
/// POST /query       -> post_query
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/query", get(query::get_query).post(query::post_query))
}
