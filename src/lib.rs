//! # Signet (credential authentication service)
//!
//! `signet` verifies an email/password pair against stored Argon2id hashes and
//! issues a signed, time-limited session token carried in an `HttpOnly` cookie
//! or an `Authorization: Bearer` header.
//!
//! ## Flow
//!
//! Raw input is validated into a [`auth::Credential`], the user is looked up by
//! normalized email through an [`auth::UserRepository`], the password is
//! verified with [`auth::PasswordHasher`], and only then does the
//! [`auth::SessionIssuer`] mint a token. Unknown emails and wrong passwords are
//! indistinguishable to the caller, in both response and timing.
//!
//! ## Sessions
//!
//! Tokens are stateless HMAC-SHA256 signed JWS values. Signing out clears the
//! cookie; there is no server-side revocation.

pub mod api;
pub mod auth;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
