//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the session from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireAuth`] -- Requires any authenticated user.

pub mod auth;
pub mod rbac;
