//! Password hashing (argon2id) and the password strength policy.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::core::error::{AppError, Result};
use crate::shared::validation::{DIGIT_REGEX, LOWERCASE_REGEX, SYMBOL_REGEX, UPPERCASE_REGEX};

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Returns false for a wrong password and for a malformed stored hash
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

/// Every rule the password breaks, in a stable order
pub fn strength_violations(password: &str) -> Vec<&'static str> {
    let mut violations = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        violations.push("Password must be at least 6 characters long");
    }
    if !UPPERCASE_REGEX.is_match(password) {
        violations.push("Password must contain an uppercase letter");
    }
    if !LOWERCASE_REGEX.is_match(password) {
        violations.push("Password must contain a lowercase letter");
    }
    if !DIGIT_REGEX.is_match(password) {
        violations.push("Password must contain a digit");
    }
    if !SYMBOL_REGEX.is_match(password) {
        violations.push("Password must contain a special character");
    }

    violations
}

pub fn ensure_strong_password(password: &str) -> Result<()> {
    let violations = strength_violations(password);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(violations.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Zaq1@wsx").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Zaq1@wsx", &hash));
        assert!(!verify_password("zaq1@wsx", &hash));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_strength_rules() {
        assert!(strength_violations("Ab1!xy").is_empty());
        assert_eq!(strength_violations("Ab1!x").len(), 1); // too short
        assert_eq!(
            strength_violations("ab1!xy"),
            vec!["Password must contain an uppercase letter"]
        );
        assert_eq!(
            strength_violations("AB1!XY"),
            vec!["Password must contain a lowercase letter"]
        );
        assert_eq!(
            strength_violations("Abc!xy"),
            vec!["Password must contain a digit"]
        );
        assert_eq!(
            strength_violations("Abc1xy"),
            vec!["Password must contain a special character"]
        );
        assert_eq!(strength_violations("").len(), 5);
    }

    #[test]
    fn test_weak_password_is_validation_error() {
        assert!(matches!(
            ensure_strong_password("password"),
            Err(AppError::Validation(_))
        ));
    }
}
