//! Well-known role and account name constants.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// The seeded administrator account. Its username alone decides the role.
pub const ADMIN_USERNAME: &str = "admin";
