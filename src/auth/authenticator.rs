//! Login decision: validate, look up, verify, project.
//!
//! Unknown emails and wrong passwords produce the same error and do the same
//! amount of Argon2 work: a missing user is verified against a dummy hash
//! computed at startup with the configured cost.

use anyhow::{Context, Result, anyhow};
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{RngCore, rngs::OsRng};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::{ops::Deref, sync::Arc};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument};

use super::{
    config::AuthConfig,
    credential,
    error::AuthError,
    password::PasswordHasher,
    repository::{PublicUser, UserRepository},
};

/// A [`PublicUser`] that has just proven its credentials.
///
/// Only the authenticator hands these out, and the session issuer only signs
/// these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(PublicUser);

impl AuthenticatedUser {
    pub(crate) fn new(user: PublicUser) -> Self {
        Self(user)
    }

    #[must_use]
    pub fn user(&self) -> &PublicUser {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> PublicUser {
        self.0
    }
}

impl Deref for AuthenticatedUser {
    type Target = PublicUser;

    fn deref(&self) -> &PublicUser {
        &self.0
    }
}

pub struct Authenticator {
    repository: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    password_min_length: usize,
    dummy_hash: Arc<str>,
    hash_permits: Arc<Semaphore>,
}

impl Authenticator {
    /// # Errors
    /// Returns an error if the hash parameters are invalid or the dummy hash
    /// cannot be computed.
    pub fn new(config: &AuthConfig, repository: Arc<dyn UserRepository>) -> Result<Self> {
        let hasher = PasswordHasher::new(config.hash_cost(), config.hash_memory_kib())?;

        let mut bytes = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut bytes)
            .context("failed to generate dummy password")?;
        let dummy_hash = hasher.hash(&Base64UrlUnpadded::encode_string(&bytes))?;

        Ok(Self {
            repository,
            hasher,
            password_min_length: config.password_min_length(),
            dummy_hash: Arc::from(dummy_hash),
            hash_permits: Arc::new(Semaphore::new(config.hash_concurrency())),
        })
    }

    #[must_use]
    pub fn repository(&self) -> &Arc<dyn UserRepository> {
        &self.repository
    }

    /// Check a raw `{email, password}` submission.
    ///
    /// # Errors
    /// - [`AuthError::InvalidInput`] when the submission is malformed.
    /// - [`AuthError::InvalidCredentials`] for an unknown email or wrong password.
    /// - [`AuthError::Internal`] for repository failures or corrupt stored hashes.
    #[instrument(skip_all)]
    pub async fn authenticate(&self, raw: &Value) -> Result<AuthenticatedUser, AuthError> {
        let credential = credential::validate(raw, self.password_min_length)?;

        let record = self
            .repository
            .find_by_email(credential.email())
            .await
            .map_err(|err| {
                error!("User lookup failed: {err}");
                AuthError::Internal(err.into())
            })?;

        let Some(record) = record else {
            // Result ignored: this only equalizes timing with the known-user path.
            let _ = self
                .verify(credential.password().clone(), self.dummy_hash.clone())
                .await;
            debug!("Login rejected: unknown account");
            return Err(AuthError::InvalidCredentials);
        };

        let matched = self
            .verify(
                credential.password().clone(),
                Arc::from(record.password_hash.as_str()),
            )
            .await?;
        if !matched {
            debug!(user_id = %record.id, "Login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = %record.id, "Login accepted");
        Ok(AuthenticatedUser::new(record.to_public()))
    }

    /// Run Argon2 verification on the blocking pool, bounded by the permit count.
    ///
    /// The permit lives inside the blocking task, so a cancelled caller keeps
    /// its slot until the hash actually finishes.
    async fn verify(&self, password: SecretString, hash: Arc<str>) -> Result<bool, AuthError> {
        let permit = self
            .hash_permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|err| AuthError::Internal(err.into()))?;

        let hasher = self.hasher.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            hasher.verify(password.expose_secret(), &hash)
        })
        .await
        .map_err(|err| AuthError::Internal(anyhow!("password verification task failed: {err}")))?;

        outcome.map_err(|err| {
            error!("Stored password hash is corrupt");
            AuthError::Internal(err.into())
        })
    }
}
