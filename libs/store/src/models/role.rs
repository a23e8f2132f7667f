//! Role model and related functionality

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const ADMIN: &str = "Admin";
pub const DEVELOPER: &str = "Developer";
pub const USER: &str = "User";

/// Roles present in every fresh store
pub const SEEDED_ROLES: [&str; 3] = [ADMIN, DEVELOPER, USER];

/// Role entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

/// New role creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewRole {
    pub role_name: String,
}

/// Role update payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleChanges {
    pub role_name: Option<String>,
}
