//! Shared state for the auth handlers.

use anyhow::Result;
use std::sync::Arc;

use crate::auth::{AuthConfig, Authenticator, SessionIssuer, UserRepository};

pub struct AuthState {
    authenticator: Authenticator,
    issuer: SessionIssuer,
    cookie_secure: bool,
}

impl AuthState {
    /// Build the authenticator and session issuer from one validated config.
    ///
    /// # Errors
    /// Returns an error if the configuration is unusable.
    pub fn new(config: &AuthConfig, repository: Arc<dyn UserRepository>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            authenticator: Authenticator::new(config, repository)?,
            issuer: SessionIssuer::new(
                config.signing_secret().clone(),
                config.session_ttl_seconds(),
            ),
            cookie_secure: config.session_cookie_secure(),
        })
    }

    #[must_use]
    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    #[must_use]
    pub fn issuer(&self) -> &SessionIssuer {
        &self.issuer
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    #[must_use]
    pub fn repository(&self) -> &Arc<dyn UserRepository> {
        self.authenticator.repository()
    }
}
