use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, instrument};

use super::{
    cookie::session_cookie,
    state::AuthState,
    types::{ErrorResponse, LoginRequest, LoginResponse},
};
use crate::auth::{AuthError, IssuedSession, ValidationError, ValidationErrors, credential::FIELD_BODY};

pub const INVALID_CREDENTIALS_MESSAGE: &str = "invalid email or password";
pub const INVALID_INPUT_MESSAGE: &str = "invalid input";
pub const INTERNAL_ERROR_MESSAGE: &str = "internal error";

/// Outcome of one sign-in attempt, shared by the JSON API and the HTML form.
pub(crate) async fn sign_in(auth_state: &AuthState, raw: &Value) -> Result<IssuedSession, AuthError> {
    let user = auth_state.authenticator().authenticate(raw).await?;
    auth_state.issuer().issue(&user).map_err(|err| {
        error!("Failed to issue session token: {err}");
        AuthError::Internal(err)
    })
}

/// Status and body for a failed sign-in.
pub(crate) fn auth_error_response(err: AuthError) -> (StatusCode, ErrorResponse) {
    match err {
        AuthError::InvalidInput(errors) => (
            StatusCode::BAD_REQUEST,
            ErrorResponse {
                message: INVALID_INPUT_MESSAGE.to_string(),
                errors: errors.0,
            },
        ),
        AuthError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            ErrorResponse::new(INVALID_CREDENTIALS_MESSAGE),
        ),
        AuthError::Internal(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new(INTERNAL_ERROR_MESSAGE),
        ),
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = LoginResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let raw = match payload {
        Ok(Json(raw)) => raw,
        Err(rejection) => {
            let err = AuthError::InvalidInput(ValidationErrors(vec![ValidationError::new(
                FIELD_BODY,
                rejection.body_text(),
            )]));
            let (status, body) = auth_error_response(err);
            return (status, Json(body)).into_response();
        }
    };

    let issued = match sign_in(&auth_state, &raw).await {
        Ok(issued) => issued,
        Err(err) => {
            let (status, body) = auth_error_response(err);
            return (status, Json(body)).into_response();
        }
    };

    let mut headers = HeaderMap::new();
    match session_cookie(&issued, auth_state.cookie_secure()) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(INTERNAL_ERROR_MESSAGE)),
            )
                .into_response();
        }
    }

    let response = LoginResponse {
        user: issued.session.user().clone(),
        expires_at: issued.session.expires_at(),
    };
    (StatusCode::OK, headers, Json(response)).into_response()
}
