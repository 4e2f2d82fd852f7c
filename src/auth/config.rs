//! Startup configuration shared by the authenticator and the session issuer.

use anyhow::{Result, bail};
use secrecy::{ExposeSecret, SecretString};

pub const DEFAULT_PASSWORD_MIN_LENGTH: usize = 8;
pub const DEFAULT_HASH_COST: u32 = 3;
pub const DEFAULT_HASH_MEMORY_KIB: u32 = 19 * 1024;
pub const DEFAULT_HASH_CONCURRENCY: usize = 4;
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 24 * 60 * 60;
pub const MIN_SIGNING_SECRET_BYTES: usize = 32;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    password_min_length: usize,
    hash_cost: u32,
    hash_memory_kib: u32,
    hash_concurrency: usize,
    session_ttl_seconds: i64,
    signing_secret: SecretString,
    session_cookie_secure: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new(signing_secret: SecretString) -> Self {
        Self {
            password_min_length: DEFAULT_PASSWORD_MIN_LENGTH,
            hash_cost: DEFAULT_HASH_COST,
            hash_memory_kib: DEFAULT_HASH_MEMORY_KIB,
            hash_concurrency: DEFAULT_HASH_CONCURRENCY,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            signing_secret,
            session_cookie_secure: true,
        }
    }

    #[must_use]
    pub fn with_password_min_length(mut self, length: usize) -> Self {
        self.password_min_length = length;
        self
    }

    #[must_use]
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    #[must_use]
    pub fn with_hash_memory_kib(mut self, kib: u32) -> Self {
        self.hash_memory_kib = kib;
        self
    }

    #[must_use]
    pub fn with_hash_concurrency(mut self, permits: usize) -> Self {
        self.hash_concurrency = permits;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_cookie_secure(mut self, secure: bool) -> Self {
        self.session_cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn password_min_length(&self) -> usize {
        self.password_min_length
    }

    #[must_use]
    pub fn hash_cost(&self) -> u32 {
        self.hash_cost
    }

    #[must_use]
    pub fn hash_memory_kib(&self) -> u32 {
        self.hash_memory_kib
    }

    #[must_use]
    pub fn hash_concurrency(&self) -> usize {
        self.hash_concurrency
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn signing_secret(&self) -> &SecretString {
        &self.signing_secret
    }

    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.session_cookie_secure
    }

    /// Reject settings the service cannot run safely with.
    ///
    /// # Errors
    /// Returns an error describing the first unusable setting.
    pub fn validate(&self) -> Result<()> {
        if self.signing_secret.expose_secret().len() < MIN_SIGNING_SECRET_BYTES {
            bail!("signing secret must be at least {MIN_SIGNING_SECRET_BYTES} bytes");
        }
        if self.password_min_length == 0 {
            bail!("password minimum length must be at least 1");
        }
        if self.hash_cost == 0 {
            bail!("hash cost must be at least 1");
        }
        if self.hash_concurrency == 0 {
            bail!("hash concurrency must be at least 1");
        }
        if self.session_ttl_seconds <= 0 {
            bail!("session TTL must be positive");
        }
        Ok(())
    }
}
