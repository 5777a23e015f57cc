//! User account model and signup validation.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::CoreError;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;
pub const PASSWORD_MIN_CHARS: usize = 6;

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"))
}

/// A registered user. The password hash never leaves the server: it is
/// excluded from serialization entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl User {
    /// Creates a user from already-validated fields and a password hash.
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Validates and normalizes a display name: trimmed, 2..=50 characters.
pub fn validate_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        return Err(CoreError::validation("Name must be 2-50 characters"));
    }
    Ok(trimmed.to_string())
}

/// Validates and normalizes an email address: trimmed and lowercased.
pub fn validate_email(email: &str) -> Result<String, CoreError> {
    let normalized = email.trim().to_lowercase();
    if !email_regex().is_match(&normalized) {
        return Err(CoreError::validation("Valid email required"));
    }
    Ok(normalized)
}

/// Validates a plaintext password before hashing.
pub fn validate_password(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(CoreError::validation(
            "Password must be at least 6 characters",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_length_bounds() {
        assert!(validate_name("A").is_err());
        assert_eq!(validate_name("Al").unwrap(), "Al");
        assert_eq!(validate_name(&"n".repeat(50)).unwrap(), "n".repeat(50));
        assert!(validate_name(&"n".repeat(51)).is_err());
    }

    #[test]
    fn email_is_normalized() {
        assert_eq!(
            validate_email("  Alice@Example.COM ").unwrap(),
            "alice@example.com"
        );
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn password_minimum_length() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn password_hash_never_serialized() {
        let user = User::new(
            "Alice".to_string(),
            "alice@example.com".to_string(),
            "$argon2id$fake".to_string(),
        );
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "alice@example.com");
    }
}
