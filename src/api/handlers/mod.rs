pub mod auth;
pub mod health;
pub mod pages;

pub use self::health::health;
