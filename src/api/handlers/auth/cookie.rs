//! Session cookie formatting and token extraction.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{AUTHORIZATION, COOKIE, InvalidHeaderValue},
};
use chrono::{DateTime, Utc};

use crate::auth::IssuedSession;

pub const SESSION_COOKIE_NAME: &str = "signet_session";

/// Build an `HttpOnly` cookie carrying the token until the session expires.
pub fn session_cookie(
    issued: &IssuedSession,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let expires_at = issued.session.expires_at();
    let max_age = (expires_at - Utc::now().timestamp()).max(0);
    let expires = DateTime::<Utc>::from_timestamp(expires_at, 0)
        .map(|at| at.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
        .unwrap_or_default();

    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}",
        issued.token
    );
    if !expires.is_empty() {
        cookie.push_str("; Expires=");
        cookie.push_str(&expires);
    }
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub fn clear_session_cookie(secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Session token from `Authorization: Bearer` or the session cookie.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next().map(str::trim);
            let val = parts.next().map(str::trim);
            if let (Some(SESSION_COOKIE_NAME), Some(val)) = (key, val) {
                if !val.is_empty() {
                    return Some(val.to_string());
                }
            }
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
