//! Server-rendered sign-in form, dashboard and sign-out button.
//!
//! Thin HTML wrappers over the same sign-in and session resolution used by the
//! JSON API.

use axum::{
    Form,
    extract::{Extension, rejection::FormRejection},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde_json::{Map, Value};
use std::{collections::HashMap, sync::Arc};
use tracing::error;

use super::auth::{
    AuthState,
    cookie::session_cookie,
    login::{INTERNAL_ERROR_MESSAGE, auth_error_response, sign_in},
    session::{SessionLookup, clear_cookie_headers, resolve_session},
};

const DASHBOARD_PATH: &str = "/dashboard";

pub(crate) fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<div>\n<p>{title}</p>\n{body}\n</div>\n</body>\n</html>\n"
    ))
}

fn sign_in_form(email: &str, failure: Option<&str>) -> String {
    let alert = failure
        .map(|message| format!("<p role=\"alert\">Login failed: {}</p>\n", escape_html(message)))
        .unwrap_or_default();
    format!(
        "{alert}<form method=\"post\" action=\"/login\">\n\
         <label>Email <input name=\"email\" type=\"email\" value=\"{}\" required></label>\n\
         <label>Password <input name=\"password\" type=\"password\" required></label>\n\
         <button type=\"submit\">Sign In</button>\n\
         </form>",
        escape_html(email)
    )
}

fn sign_out_button() -> &'static str {
    "<form method=\"post\" action=\"/logout\">\n<button type=\"submit\">Sign Out</button>\n</form>"
}

pub async fn login_page(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    match resolve_session(&headers, &auth_state) {
        SessionLookup::Active(_) => {
            layout("Login Page", "<p>You are already signed in.</p>").into_response()
        }
        SessionLookup::Missing => layout("Login Page", &sign_in_form("", None)).into_response(),
        SessionLookup::Rejected => (
            clear_cookie_headers(&auth_state),
            layout("Login Page", &sign_in_form("", None)),
        )
            .into_response(),
    }
}

pub async fn login_submit(
    auth_state: Extension<Arc<AuthState>>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Response {
    // A rejected form is validated as an empty submission.
    let fields = form.map(|Form(fields)| fields).unwrap_or_default();
    let email = fields.get("email").cloned().unwrap_or_default();
    let raw = Value::Object(
        fields
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect::<Map<String, Value>>(),
    );

    match sign_in(&auth_state, &raw).await {
        Ok(issued) => match session_cookie(&issued, auth_state.cookie_secure()) {
            Ok(cookie) => {
                let mut headers = HeaderMap::new();
                headers.insert(SET_COOKIE, cookie);
                (headers, Redirect::to(DASHBOARD_PATH)).into_response()
            }
            Err(err) => {
                error!("Failed to build session cookie: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    layout("Login Page", &sign_in_form(&email, Some(INTERNAL_ERROR_MESSAGE))),
                )
                    .into_response()
            }
        },
        Err(err) => {
            let (status, body) = auth_error_response(err);
            let message = if body.errors.is_empty() {
                body.message
            } else {
                body.errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            (
                status,
                layout("Login Page", &sign_in_form(&email, Some(&message))),
            )
                .into_response()
        }
    }
}

pub async fn dashboard(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    match resolve_session(&headers, &auth_state) {
        SessionLookup::Active(session) => {
            let body = format!(
                "<div>\n<p>Email: {}</p>\n</div>\n{}",
                escape_html(&session.user().email),
                sign_out_button()
            );
            layout("Dashboard Page", &body).into_response()
        }
        SessionLookup::Missing => {
            layout("Dashboard Page", "<p>You are not signed in.</p>").into_response()
        }
        SessionLookup::Rejected => (
            clear_cookie_headers(&auth_state),
            layout("Dashboard Page", "<p>You are not signed in.</p>"),
        )
            .into_response(),
    }
}

pub async fn logout_submit(auth_state: Extension<Arc<AuthState>>) -> Response {
    (clear_cookie_headers(&auth_state), Redirect::to(DASHBOARD_PATH)).into_response()
}
