//! Admin maintenance: wiping data, restoring the admin account, reading the
//! import error log.

use axum::extract::{Query, State};
use axum::Json;
use fleetdesk_core::facade::Database;
use fleetdesk_core::importer::ErrorLogEntry;
use fleetdesk_core::maintenance::{self, AdminRestore};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_ERROR_LOG_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct ClearDataRequest {
    pub confirmation: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearDataResult {
    pub statements_executed: usize,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RestoreAdminResult {
    pub created: bool,
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ErrorLogParams {
    pub limit: Option<usize>,
}

/// POST /api/admin/clear-data
pub async fn clear_data(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<ClearDataRequest>,
) -> AppResult<Json<DataResponse<ClearDataResult>>> {
    tracing::warn!(user_id = admin.user_id, "Clearing all fleet data");
    let db = Database::new(state.gateway.as_ref());
    let statements_executed = maintenance::clear_all_data(&db, &input.confirmation).await?;

    Ok(Json(DataResponse {
        data: ClearDataResult {
            statements_executed,
            message: "All data cleared. Admin user and service types restored.",
        },
    }))
}

/// POST /api/admin/restore-admin
pub async fn restore_admin(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<RestoreAdminResult>>> {
    let db = Database::new(state.gateway.as_ref());
    let result = match maintenance::restore_admin(&db).await? {
        AdminRestore::Created => RestoreAdminResult {
            created: true,
            message: "Admin user restored",
        },
        AdminRestore::AlreadyExists => RestoreAdminResult {
            created: false,
            message: "Admin user already exists",
        },
    };
    Ok(Json(DataResponse { data: result }))
}

/// GET /api/admin/error-log?limit=
pub async fn error_log(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<ErrorLogParams>,
) -> AppResult<Json<DataResponse<Vec<ErrorLogEntry>>>> {
    let limit = params.limit.unwrap_or(DEFAULT_ERROR_LOG_LIMIT).max(1);
    let entries = state.error_log.recent(limit).await?;
    Ok(Json(DataResponse { data: entries }))
}
