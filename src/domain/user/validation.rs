//! User validation utilities

use thiserror::Error;
use validator::ValidateEmail;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("user id should be a positive integer")]
    InvalidId,

    #[error("username, password and email can't be empty")]
    EmptyField,

    #[error("username and password can't have spaces")]
    FieldWithSpaces,

    #[error("password shorter than {0} characters")]
    PasswordTooShort(usize),

    #[error("password longer than {0} characters")]
    PasswordTooLong(usize),

    #[error("invalid email address")]
    InvalidEmail,
}

const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_PASSWORD_LENGTH: usize = 72;

/// Validate a user ID
pub fn validate_user_id(id: i64) -> Result<(), UserValidationError> {
    if id <= 0 {
        return Err(UserValidationError::InvalidId);
    }

    Ok(())
}

/// Validate a username, plaintext password and email together
///
/// Checks run in a fixed order so the first failing rule is reported:
/// 1. No field may be empty
/// 2. Username and password may not contain whitespace
/// 3. Password length (in bytes) within 6..=72
/// 4. Email must parse as an address
pub fn validate_user(username: &str, password: &str, email: &str) -> Result<(), UserValidationError> {
    if username.is_empty() || password.is_empty() || email.is_empty() {
        return Err(UserValidationError::EmptyField);
    }

    if has_whitespace(username) || has_whitespace(password) {
        return Err(UserValidationError::FieldWithSpaces);
    }

    validate_password(password)?;
    validate_email(email)?;

    Ok(())
}

/// Validate a password length
///
/// Rules:
/// - Minimum 6 bytes
/// - Maximum 72 bytes
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if !email.validate_email() {
        return Err(UserValidationError::InvalidEmail);
    }

    Ok(())
}

fn has_whitespace(value: &str) -> bool {
    value.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_user() {
        assert!(validate_user("luigi", "secret", "luigi@email.com").is_ok());
        assert!(validate_user("user_name-1", "P@ssw0rd!", "a@b.io").is_ok());
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(
            validate_user("", "", ""),
            Err(UserValidationError::EmptyField)
        );
        assert_eq!(
            validate_user("luigi", "secret", ""),
            Err(UserValidationError::EmptyField)
        );
    }

    #[test]
    fn test_fields_with_spaces() {
        assert_eq!(
            validate_user("User Name", "Pass Word", "luigi@email.com"),
            Err(UserValidationError::FieldWithSpaces)
        );
        assert_eq!(
            validate_user("luigi", "pass\tword", "luigi@email.com"),
            Err(UserValidationError::FieldWithSpaces)
        );
    }

    #[test]
    fn test_short_password() {
        assert_eq!(
            validate_user("luigi", "short", "luigi@email.com"),
            Err(UserValidationError::PasswordTooShort(6))
        );
    }

    #[test]
    fn test_long_password() {
        let long_password = "a".repeat(73);
        assert_eq!(
            validate_user("luigi", &long_password, "luigi@email.com"),
            Err(UserValidationError::PasswordTooLong(72))
        );
        assert!(validate_password(&"a".repeat(72)).is_ok());
    }

    #[test]
    fn test_invalid_email() {
        assert_eq!(
            validate_user("luigi", "secret", "a.b.com"),
            Err(UserValidationError::InvalidEmail)
        );
        assert_eq!(
            validate_user("luigi", "secret", "luigiEmail.com"),
            Err(UserValidationError::InvalidEmail)
        );
    }

    #[test]
    fn test_spaces_reported_before_length() {
        assert_eq!(
            validate_user("luigi", "a b", "luigi@email.com"),
            Err(UserValidationError::FieldWithSpaces)
        );
    }

    #[test]
    fn test_user_id() {
        assert!(validate_user_id(1).is_ok());
        assert_eq!(validate_user_id(0), Err(UserValidationError::InvalidId));
    }
}
