//! Role-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose session does
//! not meet the requirement.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use fleetdesk_core::error::CoreError;
use fleetdesk_core::session::{self, SessionContext};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
pub struct RequireAdmin(pub SessionContext);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !session::is_admin(Some(&user)) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires any authenticated user.
///
/// Functionally equivalent to [`AuthUser`] but named for route definitions
/// where "this route requires authentication" should be self-documenting.
pub struct RequireAuth(pub SessionContext);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}
