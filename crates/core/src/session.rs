//! Per-request session context and role checks.
//!
//! A [`SessionContext`] is built by the HTTP layer for each authenticated
//! request and passed to whatever needs it. All role checks here are pure
//! functions of that value.

use serde::{Deserialize, Serialize};

use crate::roles::{ADMIN_USERNAME, ROLE_ADMIN, ROLE_USER};
use crate::types::DbId;

/// Passwords accepted at login. Stored hashes are not verified; every
/// account signs in with one of these.
pub const DEMO_PASSWORDS: &[&str] = &["password", "admin"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::User => ROLE_USER,
        }
    }

    /// Parse a role name; anything other than `admin` is a plain user.
    pub fn from_name(name: &str) -> Self {
        if name == ROLE_ADMIN {
            Role::Admin
        } else {
            Role::User
        }
    }
}

/// The signed-in user for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub user_id: DbId,
    pub username: String,
    pub role: Role,
}

impl SessionContext {
    /// Build a session for a user, deriving the role from the username.
    pub fn for_user(user_id: DbId, username: impl Into<String>) -> Self {
        let username = username.into();
        let role = role_for_username(&username);
        Self {
            user_id,
            username,
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Which rows an aggregate query may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportScope {
    /// Every row in the fleet.
    All,
    /// Only rows for vehicles linked to this user through `Owns`.
    Owner(DbId),
}

/// The seeded `admin` account is the only administrator.
pub fn role_for_username(username: &str) -> Role {
    if username == ADMIN_USERNAME {
        Role::Admin
    } else {
        Role::User
    }
}

pub fn accepts_password(password: &str) -> bool {
    DEMO_PASSWORDS.contains(&password)
}

/// Admin check over an optional session; anonymous callers are never admins.
pub fn is_admin(session: Option<&SessionContext>) -> bool {
    session.is_some_and(SessionContext::is_admin)
}

/// Admins may edit any record; users only records they own.
pub fn can_edit_record(session: Option<&SessionContext>, owner_id: DbId) -> bool {
    match session {
        None => false,
        Some(s) if s.is_admin() => true,
        Some(s) => s.user_id == owner_id,
    }
}

pub fn report_scope(session: &SessionContext) -> ReportScope {
    if session.is_admin() {
        ReportScope::All
    } else {
        ReportScope::Owner(session.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_role_comes_from_username() {
        assert_eq!(SessionContext::for_user(1, "admin").role, Role::Admin);
        assert_eq!(SessionContext::for_user(2, "alice").role, Role::User);
        assert_eq!(SessionContext::for_user(3, "Admin").role, Role::User);
    }

    #[test]
    fn role_round_trips_through_name() {
        assert_eq!(Role::from_name(Role::Admin.as_str()), Role::Admin);
        assert_eq!(Role::from_name(Role::User.as_str()), Role::User);
        assert_eq!(Role::from_name("reviewer"), Role::User);
    }

    #[test]
    fn edit_permission_rules() {
        let admin = SessionContext::for_user(1, "admin");
        let alice = SessionContext::for_user(2, "alice");

        assert!(can_edit_record(Some(&admin), 99));
        assert!(can_edit_record(Some(&alice), 2));
        assert!(!can_edit_record(Some(&alice), 3));
        assert!(!can_edit_record(None, 2));
    }

    #[test]
    fn anonymous_is_not_admin() {
        assert!(!is_admin(None));
        assert!(is_admin(Some(&SessionContext::for_user(1, "admin"))));
    }

    #[test]
    fn scope_follows_role() {
        assert_eq!(report_scope(&SessionContext::for_user(1, "admin")), ReportScope::All);
        assert_eq!(
            report_scope(&SessionContext::for_user(7, "bob")),
            ReportScope::Owner(7)
        );
    }

    #[test]
    fn demo_passwords() {
        assert!(accepts_password("password"));
        assert!(accepts_password("admin"));
        assert!(!accepts_password("hunter2"));
    }
}
