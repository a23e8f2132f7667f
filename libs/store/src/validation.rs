//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{StoreError, StoreResult};

/// Validate a first or last name
pub fn validate_name(field: &str, value: &str) -> StoreResult<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(StoreError::Validation(format!("{} is required", field)));
    }

    if value.chars().count() > 50 {
        return Err(StoreError::Validation(format!(
            "{} must be at most 50 characters long",
            field
        )));
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> StoreResult<()> {
    if email.is_empty() {
        return Err(StoreError::Validation("email is required".to_string()));
    }

    if email.len() > 120 {
        return Err(StoreError::Validation(
            "email must be at most 120 characters long".to_string(),
        ));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err(StoreError::Validation("Invalid email format".to_string()));
    }

    Ok(())
}

/// Canonical form of an email address: trimmed and lowercased
///
/// Addresses are unique regardless of case, so lookups and writes both go
/// through this.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate a password; only presence is enforced
pub fn validate_password(password: &str) -> StoreResult<()> {
    if password.is_empty() {
        return Err(StoreError::Validation("password is required".to_string()));
    }

    if password.len() > 128 {
        return Err(StoreError::Validation(
            "password must be at most 128 characters long".to_string(),
        ));
    }

    Ok(())
}

/// Validate a free-text required field such as a title or role name
pub fn validate_required(field: &str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_format() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("first.last+tag@example.co.uk").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
        assert_eq!(normalize_email("a@b.com"), "a@b.com");
    }

    #[test]
    fn test_single_character_password_is_accepted() {
        assert!(validate_password("x").is_ok());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_blank_names_are_rejected() {
        assert!(validate_name("first_name", "A").is_ok());
        assert!(validate_name("first_name", "   ").is_err());
        assert!(validate_name("last_name", &"x".repeat(51)).is_err());
    }
}
