//! In-process tests for the HTTP surface.
//!
//! The router is driven with `tower::ServiceExt::oneshot` against an
//! in-memory user repository seeded with one account, so no database or
//! network listener is needed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{
        Request, Response, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
    },
};
use secrecy::SecretString;
use serde_json::{Value, json};
use signet::{
    api::{self, handlers::auth::AuthState},
    auth::{
        AuthConfig, MemoryUserRepository, PasswordHasher, RepositoryError, UserRecord,
        UserRepository,
    },
};
use std::sync::Arc;
use tower::ServiceExt;

const EMAIL: &str = "a@x.com";
const PASSWORD: &str = "Secret123";
const SECRET: &str = "integration-signing-secret-0123456789";

fn config() -> AuthConfig {
    AuthConfig::new(SecretString::from(SECRET.to_string()))
        .with_hash_cost(1)
        .with_hash_memory_kib(8)
        .with_session_ttl_seconds(3600)
}

async fn seeded_state() -> Result<Arc<AuthState>> {
    let repository = MemoryUserRepository::new();
    let hash = PasswordHasher::new(1, 8)?.hash(PASSWORD)?;
    repository.insert(EMAIL, hash).await;
    Ok(Arc::new(AuthState::new(&config(), Arc::new(repository))?))
}

async fn app() -> Result<Router> {
    Ok(api::router(seeded_state().await?))
}

fn json_login(body: &Value) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri("/v1/auth/login")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body)?))?)
}

async fn body_json(response: Response<Body>) -> Result<Value> {
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&body)?)
}

async fn body_text(response: Response<Body>) -> Result<String> {
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(body.to_vec())?)
}

fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn cookie_token(set_cookie: &str) -> Option<String> {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.strip_prefix("signet_session="))
        .map(str::to_string)
}

async fn login_token(app: &Router) -> Result<String> {
    let response = app
        .clone()
        .oneshot(json_login(&json!({"email": EMAIL, "password": PASSWORD}))?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    set_cookie(&response)
        .as_deref()
        .and_then(cookie_token)
        .context("login response has no session cookie")
}

#[tokio::test]
async fn login_succeeds_and_failures_are_indistinguishable() -> Result<()> {
    let app = app().await?;

    let response = app
        .clone()
        .oneshot(json_login(&json!({"email": "A@X.com ", "password": PASSWORD}))?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await?;
    assert_eq!(payload["user"]["email"], EMAIL);
    assert!(payload["expires_at"].as_i64().is_some());

    let wrong_password = app
        .clone()
        .oneshot(json_login(&json!({"email": EMAIL, "password": "wrongpass"}))?)
        .await?;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&wrong_password).is_none());
    let wrong_password = body_json(wrong_password).await?;

    let unknown_email = app
        .clone()
        .oneshot(json_login(&json!({"email": "nobody@x.com", "password": PASSWORD}))?)
        .await?;
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    let unknown_email = body_json(unknown_email).await?;

    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password["message"], "invalid email or password");
    Ok(())
}

#[tokio::test]
async fn login_cookie_carries_security_attributes() -> Result<()> {
    let app = app().await?;
    let response = app
        .oneshot(json_login(&json!({"email": EMAIL, "password": PASSWORD}))?)
        .await?;
    let cookie = set_cookie(&response).context("missing Set-Cookie")?;

    assert!(cookie.starts_with("signet_session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=3600") || cookie.contains("Max-Age=3599"));
    assert!(cookie.contains("Secure"));
    Ok(())
}

#[tokio::test]
async fn login_reports_every_invalid_field() -> Result<()> {
    let app = app().await?;
    let response = app
        .oneshot(json_login(&json!({"email": "not-an-email", "password": "short"}))?)
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let payload = body_json(response).await?;
    let fields: Vec<&str> = payload["errors"]
        .as_array()
        .context("errors should be a list")?
        .iter()
        .filter_map(|error| error["field"].as_str())
        .collect();
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
    Ok(())
}

#[tokio::test]
async fn login_rejects_malformed_json() -> Result<()> {
    let app = app().await?;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/auth/login")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = body_json(response).await?;
    assert_eq!(payload["errors"][0]["field"], "body");
    Ok(())
}

#[tokio::test]
async fn session_accepts_cookie_and_bearer() -> Result<()> {
    let app = app().await?;
    let token = login_token(&app).await?;

    let by_cookie = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/auth/session")
                .header(COOKIE, format!("signet_session={token}"))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(by_cookie.status(), StatusCode::OK);
    let payload = body_json(by_cookie).await?;
    assert_eq!(payload["email"], EMAIL);

    let by_bearer = app
        .oneshot(
            Request::builder()
                .uri("/v1/auth/session")
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(by_bearer.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn session_without_token_is_no_content() -> Result<()> {
    let app = app().await?;
    let response = app
        .oneshot(Request::builder().uri("/v1/auth/session").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn tampered_token_is_rejected_and_cookie_cleared() -> Result<()> {
    let app = app().await?;
    let token = login_token(&app).await?;
    let mut tampered = token.into_bytes();
    if let Some(last) = tampered.last_mut() {
        *last = if *last == b'A' { b'B' } else { b'A' };
    }
    let tampered = String::from_utf8(tampered)?;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/auth/session")
                .header(COOKIE, format!("signet_session={tampered}"))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let cookie = set_cookie(&response).context("missing Set-Cookie")?;
    assert!(cookie.contains("Max-Age=0"));
    let payload = body_json(response).await?;
    assert_eq!(payload["message"], "please sign in again");
    Ok(())
}

#[tokio::test]
async fn expired_token_is_rejected() -> Result<()> {
    let state = seeded_state().await?;
    let user = state
        .authenticator()
        .authenticate(&json!({"email": EMAIL, "password": PASSWORD}))
        .await?;
    let issued_at = chrono::Utc::now().timestamp() - 7200;
    let issued = state.issuer().issue_at(&user, issued_at)?;

    let response = api::router(state)
        .oneshot(
            Request::builder()
                .uri("/v1/auth/session")
                .header(AUTHORIZATION, format!("Bearer {}", issued.token))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn logout_clears_cookie() -> Result<()> {
    let app = app().await?;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/auth/logout")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = set_cookie(&response).context("missing Set-Cookie")?;
    assert!(cookie.starts_with("signet_session=;"));
    assert!(cookie.contains("Max-Age=0"));
    Ok(())
}

#[tokio::test]
async fn html_sign_in_redirects_to_dashboard() -> Result<()> {
    let app = app().await?;

    let login_page = app
        .clone()
        .oneshot(Request::builder().uri("/login").body(Body::empty())?)
        .await?;
    assert_eq!(login_page.status(), StatusCode::OK);
    assert!(body_text(login_page).await?.contains("<form method=\"post\" action=\"/login\">"));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("email=a%40x.com&password=Secret123"))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
        Some("/dashboard")
    );
    let token = set_cookie(&response)
        .as_deref()
        .and_then(cookie_token)
        .context("missing session cookie")?;

    let dashboard = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/dashboard")
                .header(COOKIE, format!("signet_session={token}"))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(dashboard.status(), StatusCode::OK);
    let html = body_text(dashboard).await?;
    assert!(html.contains("Dashboard Page"));
    assert!(html.contains("Email: a@x.com"));
    assert!(html.contains("Sign Out"));

    let signed_in_login = app
        .oneshot(
            Request::builder()
                .uri("/login")
                .header(COOKIE, format!("signet_session={token}"))
                .body(Body::empty())?,
        )
        .await?;
    assert!(body_text(signed_in_login).await?.contains("You are already signed in."));
    Ok(())
}

#[tokio::test]
async fn html_sign_in_failure_rerenders_form() -> Result<()> {
    let app = app().await?;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("email=a%40x.com&password=wrongpass"))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&response).is_none());
    let html = body_text(response).await?;
    assert!(html.contains("Login failed: invalid email or password"));
    assert!(html.contains("value=\"a@x.com\""));
    Ok(())
}

#[tokio::test]
async fn dashboard_without_session_and_html_sign_out() -> Result<()> {
    let app = app().await?;

    let dashboard = app
        .clone()
        .oneshot(Request::builder().uri("/dashboard").body(Body::empty())?)
        .await?;
    assert_eq!(dashboard.status(), StatusCode::OK);
    assert!(body_text(dashboard).await?.contains("You are not signed in."));

    let sign_out = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(sign_out.status(), StatusCode::SEE_OTHER);
    assert!(
        set_cookie(&sign_out)
            .as_deref()
            .is_some_and(|cookie| cookie.contains("Max-Age=0"))
    );
    Ok(())
}

#[tokio::test]
async fn requests_get_a_request_id() -> Result<()> {
    let app = app().await?;
    let response = app
        .oneshot(Request::builder().uri("/dashboard").body(Body::empty())?)
        .await?;
    assert!(response.headers().contains_key("x-request-id"));
    Ok(())
}

#[tokio::test]
async fn health_reports_repository_status() -> Result<()> {
    let app = app().await?;
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("X-App"));
    let payload = body_json(response).await?;
    assert_eq!(payload["name"], env!("CARGO_PKG_NAME"));
    assert_eq!(payload["database"], "ok");
    Ok(())
}

struct UnreachableRepository;

#[async_trait]
impl UserRepository for UnreachableRepository {
    async fn find_by_email(&self, _email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        Err(RepositoryError::InvalidRecord("unreachable".to_string()))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Err(RepositoryError::InvalidRecord("unreachable".to_string()))
    }
}

#[tokio::test]
async fn unreachable_repository_is_unhealthy_and_login_is_internal_error() -> Result<()> {
    let state = Arc::new(AuthState::new(&config(), Arc::new(UnreachableRepository))?);
    let app = api::router(state);

    let health = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;
    assert_eq!(health.status(), StatusCode::SERVICE_UNAVAILABLE);

    let login = app
        .oneshot(json_login(&json!({"email": EMAIL, "password": PASSWORD}))?)
        .await?;
    assert_eq!(login.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = body_json(login).await?;
    assert_eq!(payload["message"], "internal error");
    Ok(())
}
