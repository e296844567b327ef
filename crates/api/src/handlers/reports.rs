//! Fleet analytics for the signed-in user.

use axum::extract::State;
use axum::Json;
use fleetdesk_core::facade::Database;
use fleetdesk_core::reports::{FleetReport, FleetReports};
use fleetdesk_core::session::report_scope;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/reports/summary
///
/// Admins see the whole fleet; other users only vehicles they own or owned.
pub async fn summary(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
) -> AppResult<Json<DataResponse<FleetReport>>> {
    let db = Database::new(state.gateway.as_ref());
    let report = FleetReports::new(&db, report_scope(&session)).all().await?;
    Ok(Json(DataResponse { data: report }))
}
