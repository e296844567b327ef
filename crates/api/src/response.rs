//! Shared response envelope types for API handlers.
//!
//! Endpoints added on top of the SQL gateway use a `{ "data": ... }`
//! envelope. The gateway, health and sample-data endpoints keep their
//! established flat shapes.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: report }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
