//! Route definitions for SQL imports.

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;

use crate::handlers::{importer, sample_data};
use crate::state::AppState;

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// ```text
/// POST /import/preview      -> preview_sql
/// POST /import              -> import_sql
/// POST /import/stream       -> import_sql_stream
/// POST /insert-sample-data  -> insert_sample_data
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/import/preview", post(importer::preview_sql))
        .route("/import", post(importer::import_sql))
        .route("/import/stream", post(importer::import_sql_stream))
        .route("/insert-sample-data", post(sample_data::insert_sample_data))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
