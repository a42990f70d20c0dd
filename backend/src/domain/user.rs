//! User identity and password policy.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors raised when constructing a [`Username`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsernameValidationError {
    /// Username is empty after trimming whitespace.
    #[error("username must not be empty")]
    Empty,
}

/// Account username, unique case-insensitively.
///
/// ## Invariants
/// - non-empty once trimmed of whitespace
/// - stored and compared in lowercase
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Trim, lowercase, and validate raw input.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UsernameValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UsernameValidationError::Empty);
        }
        Ok(Self(normalised))
    }

    /// Borrow the normalised username.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Stored user record: username plus password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Normalised account username.
    pub username: Username,
    /// PHC-format password hash.
    pub password_hash: String,
}

/// Minimum password length accepted at registration.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Password policy failures reported at registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    /// Missing a lowercase letter, an uppercase letter, or a digit, or
    /// shorter than [`PASSWORD_MIN_LEN`].
    #[error(
        "password must contain both uppercase and lowercase letters, as well as numbers, \
         and be at least {PASSWORD_MIN_LEN} characters long"
    )]
    TooWeak,
    /// The confirmation field does not match the password exactly.
    #[error("the password and confirmation password do not match")]
    ConfirmationMismatch,
}

/// Check password complexity and confirmation.
pub fn check_password(password: &str, confirmation: &str) -> Result<(), PasswordPolicyError> {
    let strong = password.chars().count() >= PASSWORD_MIN_LEN
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit());
    if !strong {
        return Err(PasswordPolicyError::TooWeak);
    }
    if password != confirmation {
        return Err(PasswordPolicyError::ConfirmationMismatch);
    }
    Ok(())
}
