//! Stateless session tokens.
//!
//! A token is a compact HS256 JWS: `base64url(header).base64url(claims).base64url(mac)`.
//! The signature is checked before any claim is interpreted, and a token only
//! reports [`SessionError::Expired`] once its signature is known to be good.
//!
//! There is no server-side store, so signing out only discards the client's
//! copy; a copied token stays valid until `exp`.

use anyhow::{Context, Result};
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use uuid::Uuid;

use super::{authenticator::AuthenticatedUser, error::SessionError, repository::PublicUser};

type HmacSha256 = Hmac<Sha256>;

pub const TOKEN_VERSION: u8 = 1;
const ALG: &str = "HS256";
const TYP: &str = "JWT";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct SessionHeader {
    alg: String,
    typ: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct SessionClaims {
    v: u8,
    sub: Uuid,
    email: String,
    iat: i64,
    exp: i64,
}

/// Decoded, verified session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: PublicUser,
    issued_at: i64,
    expires_at: i64,
}

impl Session {
    #[must_use]
    pub fn user(&self) -> &PublicUser {
        &self.user
    }

    /// Unix seconds.
    #[must_use]
    pub fn issued_at(&self) -> i64 {
        self.issued_at
    }

    /// Unix seconds.
    #[must_use]
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }
}

/// A freshly signed token together with the session it encodes.
pub struct IssuedSession {
    pub token: String,
    pub session: Session,
}

impl fmt::Debug for IssuedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedSession")
            .field("token", &"[REDACTED]")
            .field("session", &self.session)
            .finish()
    }
}

#[derive(Clone)]
pub struct SessionIssuer {
    secret: SecretString,
    ttl_seconds: i64,
}

impl fmt::Debug for SessionIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionIssuer")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_vec(value).context("failed to encode session json")?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, SessionError> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| SessionError::Invalid)?;
    serde_json::from_slice(&bytes).map_err(|_| SessionError::Invalid)
}

impl SessionIssuer {
    #[must_use]
    pub fn new(secret: SecretString, ttl_seconds: i64) -> Self {
        Self {
            secret,
            ttl_seconds,
        }
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    fn mac(&self) -> Result<HmacSha256, SessionError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| SessionError::Invalid)
    }

    /// Sign a session for an authenticated user, valid from now.
    ///
    /// # Errors
    /// Returns an error if the token cannot be encoded.
    pub fn issue(&self, user: &AuthenticatedUser) -> Result<IssuedSession> {
        self.issue_at(user, Utc::now().timestamp())
    }

    /// Sign a session as if the current time were `now` (unix seconds).
    ///
    /// # Errors
    /// Returns an error if the token cannot be encoded.
    pub fn issue_at(&self, user: &AuthenticatedUser, now: i64) -> Result<IssuedSession> {
        let user = user.user().clone();
        let expires_at = now.saturating_add(self.ttl_seconds);
        let header = SessionHeader {
            alg: ALG.to_string(),
            typ: TYP.to_string(),
        };
        let claims = SessionClaims {
            v: TOKEN_VERSION,
            sub: user.id,
            email: user.email.clone(),
            iat: now,
            exp: expires_at,
        };

        let signing_input = format!("{}.{}", b64e_json(&header)?, b64e_json(&claims)?);
        let mut mac = self
            .mac()
            .map_err(|_| anyhow::anyhow!("invalid session signing key"))?;
        mac.update(signing_input.as_bytes());
        let signature = Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes());

        Ok(IssuedSession {
            token: format!("{signing_input}.{signature}"),
            session: Session {
                user,
                issued_at: now,
                expires_at,
            },
        })
    }

    /// Verify a token and rebuild its session.
    ///
    /// # Errors
    /// [`SessionError::Invalid`] for malformed or badly signed tokens,
    /// [`SessionError::Expired`] for genuine tokens past their expiry.
    pub fn decode(&self, token: &str) -> Result<Session, SessionError> {
        self.decode_at(token, Utc::now().timestamp())
    }

    /// Like [`Self::decode`], evaluating expiry at `now` (unix seconds).
    ///
    /// # Errors
    /// See [`Self::decode`].
    pub fn decode_at(&self, token: &str, now: i64) -> Result<Session, SessionError> {
        let mut parts = token.split('.');
        let header_b64 = parts.next().ok_or(SessionError::Invalid)?;
        let claims_b64 = parts.next().ok_or(SessionError::Invalid)?;
        let sig_b64 = parts.next().ok_or(SessionError::Invalid)?;
        if parts.next().is_some() {
            return Err(SessionError::Invalid);
        }

        let signature = Base64UrlUnpadded::decode_vec(sig_b64).map_err(|_| SessionError::Invalid)?;
        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| SessionError::Invalid)?;

        let header: SessionHeader = b64d_json(header_b64)?;
        if header.alg != ALG {
            return Err(SessionError::Invalid);
        }

        let claims: SessionClaims = b64d_json(claims_b64)?;
        if claims.v != TOKEN_VERSION || claims.iat > claims.exp {
            return Err(SessionError::Invalid);
        }
        if claims.exp <= now {
            return Err(SessionError::Expired);
        }

        Ok(Session {
            user: PublicUser {
                id: claims.sub,
                email: claims.email,
            },
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}
