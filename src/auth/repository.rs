//! User lookup by email.
//!
//! Emails are compared in normalized form (trimmed, lower-cased). A missing
//! user is `Ok(None)`, never an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};
use std::{collections::HashMap, fmt};
use tokio::sync::RwLock;
use tracing::{Instrument, info_span};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{credential::normalize_email, error::RepositoryError};

/// Stored user, including the password hash.
#[derive(Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

impl UserRecord {
    /// Projection without any secret fields.
    #[must_use]
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            email: self.email.clone(),
        }
    }
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError>;

    /// Cheap liveness probe for the health endpoint.
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Postgres-backed repository reading the `users` table.
#[derive(Clone, Debug)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let email = normalize_email(email);
        let query = r"
            SELECT id, email, password_hash
            FROM users
            WHERE lower(email) = $1
            LIMIT 1
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.sql.table = "users"
        );
        let row = sqlx::query(query)
            .bind(&email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: Uuid = row.try_get("id")?;
        let stored_email: String = row.try_get("email")?;
        let password_hash: String = row.try_get("password_hash")?;
        if password_hash.is_empty() {
            return Err(RepositoryError::InvalidRecord(format!(
                "user {id} has no password hash"
            )));
        }

        Ok(Some(UserRecord {
            id,
            email: normalize_email(&stored_email),
            password_hash,
        }))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        let span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .instrument(span)
            .await?;
        Ok(())
    }
}

/// In-process repository for tests and local development.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryUserRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a user under its normalized email, replacing any previous entry.
    pub async fn insert(&self, email: &str, password_hash: String) -> UserRecord {
        let email = normalize_email(email);
        let record = UserRecord {
            id: Uuid::new_v4(),
            email: email.clone(),
            password_hash,
        };
        self.users.write().await.insert(email, record.clone());
        record
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let email = normalize_email(email);
        Ok(self.users.read().await.get(&email).cloned())
    }
}
