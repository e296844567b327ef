//! Handlers for the `/auth` resource (login, current session).

use axum::extract::State;
use axum::Json;
use fleetdesk_core::error::CoreError;
use fleetdesk_core::facade::Database;
use fleetdesk_core::session::{accepts_password, SessionContext};
use fleetdesk_core::sql::quote;
use fleetdesk_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public user info embedded in [`LoginResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub username: String,
    pub email: Option<String>,
    pub role: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/login
///
/// Looks the username up in `Users`. Stored hashes are not checked; one of
/// the demo passwords is required instead.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<LoginResponse>>> {
    let username = input.username.trim();
    if username.is_empty() || input.password.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Username and password are required".into(),
        )));
    }

    let invalid = || {
        AppError::Core(CoreError::Unauthorized(
            "Invalid username or password".into(),
        ))
    };

    let db = Database::new(state.gateway.as_ref());
    let rows = db
        .select(&format!(
            "SELECT user_id, username, email FROM Users WHERE username = {}",
            quote(username)
        ))
        .await?;
    let row = rows.first().ok_or_else(invalid)?;

    if !accepts_password(&input.password) {
        return Err(invalid());
    }

    let user_id = row
        .get("user_id")
        .and_then(serde_json::Value::as_i64)
        .ok_or_else(|| AppError::InternalError("Users row without a numeric user_id".into()))?;
    let email = row
        .get("email")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string);

    let session = SessionContext::for_user(user_id, username);
    let access_token = generate_access_token(&session, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id, username, role = session.role.as_str(), "User logged in");

    Ok(Json(DataResponse {
        data: LoginResponse {
            access_token,
            expires_in: state.config.jwt.access_token_expiry_mins * 60,
            user: UserInfo {
                id: session.user_id,
                role: session.role.as_str().to_string(),
                username: session.username,
                email,
            },
        },
    }))
}

/// GET /api/auth/me
pub async fn me(AuthUser(session): AuthUser) -> Json<DataResponse<SessionContext>> {
    Json(DataResponse { data: session })
}
