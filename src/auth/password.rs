//! Password hashing and verification (Argon2id, PHC strings).
//!
//! Every hash carries its own salt and cost parameters, so verification never
//! depends on the current configuration: raising the cost only affects new
//! hashes.

use anyhow::{Result, anyhow};
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier as _, Version,
    password_hash::{self, SaltString},
};
use rand::rngs::OsRng;
use tracing::warn;

use super::error::HashFormatError;

const PARALLELISM: u32 = 1;

#[derive(Clone, Debug)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Build a hasher with `cost` iterations over `memory_kib` KiB.
    ///
    /// # Errors
    /// Returns an error if Argon2 rejects the parameters.
    pub fn new(cost: u32, memory_kib: u32) -> Result<Self> {
        let params = Params::new(memory_kib, cost, PARALLELISM, None)
            .map_err(|err| anyhow!("invalid Argon2 parameters: {err}"))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password with a fresh random salt.
    ///
    /// # Errors
    /// Returns an error if the hash cannot be computed.
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|err| anyhow!("failed to hash password: {err}"))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored PHC string.
    ///
    /// Salt, algorithm and cost are taken from `hash`; the digest comparison
    /// is constant-time.
    ///
    /// # Errors
    /// Returns [`HashFormatError`] when `hash` is not a PHC string at all.
    pub fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, HashFormatError> {
        let parsed = PasswordHash::new(hash).map_err(|_| HashFormatError)?;
        match self.argon2().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => {
                warn!("Stored password hash cannot be verified: {err}");
                Ok(false)
            }
        }
    }
}
