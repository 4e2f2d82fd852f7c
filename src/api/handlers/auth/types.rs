//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{PublicUser, Session, ValidationError};

/// Shape of the login body; the handler validates the raw JSON itself.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub user: PublicUser,
    pub expires_at: i64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SessionResponse {
    pub user_id: String,
    pub email: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            user_id: session.user().id.to_string(),
            email: session.user().email.clone(),
            issued_at: session.issued_at(),
            expires_at: session.expires_at(),
        }
    }
}

#[derive(ToSchema, Serialize, Debug)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: Vec::new(),
        }
    }
}
