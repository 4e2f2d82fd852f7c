use crate::{
    api,
    api::handlers::auth::AuthState,
    auth::{AuthConfig, MemoryUserRepository, PgUserRepository, UserRepository},
    cli::commands::auth::Options,
};
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<String>,
    pub auth: Options,
}

impl Args {
    #[must_use]
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::new(self.auth.signing_secret.clone())
            .with_password_min_length(self.auth.password_min_length)
            .with_hash_cost(self.auth.hash.cost)
            .with_hash_memory_kib(self.auth.hash.memory_kib)
            .with_hash_concurrency(self.auth.hash_concurrency)
            .with_session_ttl_seconds(self.auth.session_ttl_seconds)
            .with_session_cookie_secure(self.auth.cookie_secure)
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the configuration is invalid, the database is unreachable, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = args.auth_config();

    let repository: Arc<dyn UserRepository> = if let Some(dsn) = &args.dsn {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await
            .context("Failed to connect to database")?;

        info!("Using Postgres user repository");

        Arc::new(PgUserRepository::new(pool))
    } else {
        warn!("No DSN configured, using an empty in-memory user repository");

        Arc::new(MemoryUserRepository::new())
    };

    let auth_state = Arc::new(
        AuthState::new(&auth_config, repository).context("Invalid authentication configuration")?,
    );

    api::new(args.port, auth_state).await
}
