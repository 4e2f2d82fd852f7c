//! Credential authentication core.
//!
//! Flow: [`credential::validate`] → [`UserRepository::find_by_email`] →
//! [`PasswordHasher::verify`] → [`AuthenticatedUser`] → [`SessionIssuer::issue`].
//! The HTTP layer in [`crate::api`] only wires these together.

pub mod authenticator;
pub mod config;
pub mod credential;
pub mod error;
pub mod password;
pub mod repository;
pub mod session;

pub use authenticator::{AuthenticatedUser, Authenticator};
pub use config::AuthConfig;
pub use credential::Credential;
pub use error::{
    AuthError, HashFormatError, RepositoryError, SessionError, ValidationError, ValidationErrors,
};
pub use password::PasswordHasher;
pub use repository::{MemoryUserRepository, PgUserRepository, PublicUser, UserRecord, UserRepository};
pub use session::{IssuedSession, Session, SessionIssuer};
