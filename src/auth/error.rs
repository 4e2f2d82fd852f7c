//! Error taxonomy for the authentication core.
//!
//! Validation and credential errors are recovered at the request boundary and
//! rendered for the user. Session, hash format and repository errors are logged
//! server-side and only ever surface as a generic message.

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

/// A single field-level problem with a submitted credential.
#[derive(ToSchema, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Every violation found in one submission, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid credential input: {}", join(.0))]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Outcome of a failed `authenticate` call.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    InvalidInput(#[from] ValidationErrors),
    /// Unknown email and wrong password are deliberately the same variant.
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("internal authentication error: {0}")]
    Internal(anyhow::Error),
}

impl PartialEq for AuthError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Bad structure or signature; possibly tampered with.
    #[error("invalid session token")]
    Invalid,
    #[error("session expired")]
    Expired,
}

/// The stored value is not a password hash at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("corrupt password hash")]
pub struct HashFormatError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored user record is invalid: {0}")]
    InvalidRecord(String),
}
