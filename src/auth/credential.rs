//! Credential validation: turn an untyped submission into a [`Credential`].
//!
//! Nothing downstream of this module sees raw input. Every violation is
//! collected so a form can highlight all bad fields at once.

use once_cell::sync::Lazy;
use regex::Regex;
use secrecy::SecretString;
use serde_json::Value;
use std::fmt;

use super::error::{ValidationError, ValidationErrors};

pub const FIELD_EMAIL: &str = "email";
pub const FIELD_PASSWORD: &str = "password";
pub const FIELD_BODY: &str = "body";

pub const EMAIL_MAX_LENGTH: usize = 254;
pub const PASSWORD_MAX_LENGTH: usize = 1024;

static EMAIL_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

/// A structurally valid email/password pair.
pub struct Credential {
    email: String,
    password: SecretString,
}

impl Credential {
    /// Normalized (trimmed, lower-cased) email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &SecretString {
        &self.password
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Normalize an email for lookup/uniqueness checks.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
#[must_use]
pub fn valid_email(email_normalized: &str) -> bool {
    EMAIL_RE
        .as_ref()
        .is_some_and(|regex| regex.is_match(email_normalized))
}

/// Validate a raw submission against the password length policy.
///
/// # Errors
/// Returns every field violation found.
pub fn validate(raw: &Value, password_min_length: usize) -> Result<Credential, ValidationErrors> {
    let Some(object) = raw.as_object() else {
        return Err(ValidationErrors(vec![ValidationError::new(
            FIELD_BODY,
            "must be an object with email and password",
        )]));
    };

    let mut errors = Vec::new();

    let email = match object.get(FIELD_EMAIL) {
        Some(Value::String(email)) => {
            let normalized = normalize_email(email);
            if normalized.is_empty() {
                errors.push(ValidationError::new(FIELD_EMAIL, "is required"));
            } else if normalized.chars().count() > EMAIL_MAX_LENGTH {
                errors.push(ValidationError::new(
                    FIELD_EMAIL,
                    format!("must be at most {EMAIL_MAX_LENGTH} characters"),
                ));
            } else if !valid_email(&normalized) {
                errors.push(ValidationError::new(
                    FIELD_EMAIL,
                    "is not a valid email address",
                ));
            }
            Some(normalized)
        }
        Some(Value::Null) | None => {
            errors.push(ValidationError::new(FIELD_EMAIL, "is required"));
            None
        }
        Some(_) => {
            errors.push(ValidationError::new(FIELD_EMAIL, "must be a string"));
            None
        }
    };

    let password = match object.get(FIELD_PASSWORD) {
        Some(Value::String(password)) => {
            let length = password.chars().count();
            if length == 0 {
                errors.push(ValidationError::new(FIELD_PASSWORD, "is required"));
            } else if length < password_min_length {
                errors.push(ValidationError::new(
                    FIELD_PASSWORD,
                    format!("must be at least {password_min_length} characters"),
                ));
            } else if length > PASSWORD_MAX_LENGTH {
                errors.push(ValidationError::new(
                    FIELD_PASSWORD,
                    format!("must be at most {PASSWORD_MAX_LENGTH} characters"),
                ));
            }
            Some(SecretString::from(password.clone()))
        }
        Some(Value::Null) | None => {
            errors.push(ValidationError::new(FIELD_PASSWORD, "is required"));
            None
        }
        Some(_) => {
            errors.push(ValidationError::new(FIELD_PASSWORD, "must be a string"));
            None
        }
    };

    match (email, password) {
        (Some(email), Some(password)) if errors.is_empty() => Ok(Credential { email, password }),
        _ => Err(ValidationErrors(errors)),
    }
}
