//! Session endpoints for cookie and bearer auth.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::{
    cookie::{clear_session_cookie, extract_session_token},
    state::AuthState,
    types::{ErrorResponse, SessionResponse},
};
use crate::auth::{Session, SessionError};

pub const SIGN_IN_AGAIN_MESSAGE: &str = "please sign in again";

/// Outcome of resolving the request's session token.
pub(crate) enum SessionLookup {
    Active(Session),
    Missing,
    Rejected,
}

/// Resolve the request's token, logging rejections by severity.
///
/// Token contents never reach the log.
pub(crate) fn resolve_session(headers: &HeaderMap, auth_state: &AuthState) -> SessionLookup {
    let Some(token) = extract_session_token(headers) else {
        return SessionLookup::Missing;
    };
    match auth_state.issuer().decode(&token) {
        Ok(session) => SessionLookup::Active(session),
        Err(SessionError::Expired) => {
            debug!("Session expired");
            SessionLookup::Rejected
        }
        Err(SessionError::Invalid) => {
            warn!(security_event = true, "Rejected session token with invalid signature or format");
            SessionLookup::Rejected
        }
    }
}

/// Headers that drop the session cookie on the client.
pub(crate) fn clear_cookie_headers(auth_state: &AuthState) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(auth_state.cookie_secure()) {
        headers.insert(SET_COOKIE, cookie);
    }
    headers
}

#[utoipa::path(
    get,
    path = "/v1/auth/session",
    responses(
        (status = 200, description = "Session is active", body = SessionResponse),
        (status = 204, description = "No session token presented"),
        (status = 401, description = "Session expired or invalid", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn session(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    match resolve_session(&headers, &auth_state) {
        SessionLookup::Active(session) => {
            (StatusCode::OK, Json(SessionResponse::from(&session))).into_response()
        }
        SessionLookup::Missing => StatusCode::NO_CONTENT.into_response(),
        SessionLookup::Rejected => (
            StatusCode::UNAUTHORIZED,
            clear_cookie_headers(&auth_state),
            Json(ErrorResponse::new(SIGN_IN_AGAIN_MESSAGE)),
        )
            .into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    responses(
        (status = 204, description = "Session cookie cleared")
    ),
    tag = "auth"
)]
pub async fn logout(auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    // Stateless tokens: nothing to revoke server-side, only the cookie goes.
    (StatusCode::NO_CONTENT, clear_cookie_headers(&auth_state))
}
