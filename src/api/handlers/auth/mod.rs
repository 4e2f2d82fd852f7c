//! Auth API handlers: sign-in, session inspection and sign-out.

pub mod cookie;
pub mod login;
pub mod session;
pub mod state;
pub mod types;

pub use login::login;
pub use session::{logout, session};
pub use state::AuthState;
