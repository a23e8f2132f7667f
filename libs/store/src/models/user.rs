//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::StoreResult;
use crate::password::hash_password;
use crate::validation::{normalize_email, validate_email, validate_name, validate_password};

/// User entity
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// New user creation payload, password already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Registration request as sent by clients
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    /// Validate the request and hash its password
    pub fn into_new_user(self) -> StoreResult<NewUser> {
        validate_name("first_name", &self.first_name)?;
        validate_name("last_name", &self.last_name)?;
        let email = normalize_email(&self.email);
        validate_email(&email)?;
        validate_password(&self.password)?;

        Ok(NewUser {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email,
            password_hash: hash_password(&self.password)?,
        })
    }
}

/// User update applied by the store
///
/// `profile_picture: Some(None)` clears the reference.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub profile_picture: Option<Option<String>>,
}

/// User login credentials
#[derive(Debug, Clone, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::password::verify_password;

    fn registration(email: &str) -> Registration {
        Registration {
            first_name: " Ada ".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            password: "x".to_string(),
        }
    }

    #[test]
    fn test_registration_normalizes_email() {
        let new_user = registration(" Ada@Example.COM ").into_new_user().unwrap();
        assert_eq!(new_user.email, "ada@example.com");
    }

    #[test]
    fn test_registration_hashes_password_and_trims_names() {
        let new_user = registration("ada@example.com").into_new_user().unwrap();

        assert_eq!(new_user.first_name, "Ada");
        assert_ne!(new_user.password_hash, "x");
        assert!(verify_password("x", &new_user.password_hash));
    }

    #[test]
    fn test_registration_rejects_bad_email() {
        assert!(matches!(
            registration("not-an-email").into_new_user(),
            Err(StoreError::Validation(_))
        ));
    }
}
