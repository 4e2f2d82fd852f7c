//! Credential, hashing and session arguments.

use clap::{Arg, ArgMatches, Command, builder::BoolishValueParser};
use secrecy::SecretString;

use crate::auth::config::{
    DEFAULT_HASH_CONCURRENCY, DEFAULT_HASH_COST, DEFAULT_HASH_MEMORY_KIB,
    DEFAULT_PASSWORD_MIN_LENGTH, DEFAULT_SESSION_TTL_SECONDS,
};

pub const ARG_PASSWORD_MIN_LENGTH: &str = "password-min-length";
pub const ARG_HASH_COST: &str = "hash-cost";
pub const ARG_HASH_MEMORY_KIB: &str = "hash-memory-kib";
pub const ARG_HASH_CONCURRENCY: &str = "hash-concurrency";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_SIGNING_SECRET: &str = "signing-secret";
pub const ARG_COOKIE_SECURE: &str = "cookie-secure";

#[derive(Debug)]
pub struct Options {
    pub password_min_length: usize,
    pub hash: HashOptions,
    pub hash_concurrency: usize,
    pub session_ttl_seconds: i64,
    pub signing_secret: SecretString,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashOptions {
    pub cost: u32,
    pub memory_kib: u32,
}

impl HashOptions {
    /// Parse Argon2 arguments from matches.
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        Self {
            cost: matches
                .get_one::<u32>(ARG_HASH_COST)
                .copied()
                .unwrap_or(DEFAULT_HASH_COST),
            memory_kib: matches
                .get_one::<u32>(ARG_HASH_MEMORY_KIB)
                .copied()
                .unwrap_or(DEFAULT_HASH_MEMORY_KIB),
        }
    }
}

impl Options {
    /// Parse auth arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the signing secret is missing.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let signing_secret = matches
            .get_one::<String>(ARG_SIGNING_SECRET)
            .filter(|v| !v.trim().is_empty())
            .map(|v| SecretString::from(v.clone()))
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --{ARG_SIGNING_SECRET}"))?;

        Ok(Self {
            password_min_length: matches
                .get_one::<usize>(ARG_PASSWORD_MIN_LENGTH)
                .copied()
                .unwrap_or(DEFAULT_PASSWORD_MIN_LENGTH),
            hash: HashOptions::parse(matches),
            hash_concurrency: matches
                .get_one::<usize>(ARG_HASH_CONCURRENCY)
                .copied()
                .unwrap_or(DEFAULT_HASH_CONCURRENCY),
            session_ttl_seconds: matches
                .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
                .copied()
                .unwrap_or(DEFAULT_SESSION_TTL_SECONDS),
            signing_secret,
            cookie_secure: matches
                .get_one::<bool>(ARG_COOKIE_SECURE)
                .copied()
                .unwrap_or(true),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    let command = with_hash_args(command);
    with_session_args(command)
}

fn with_hash_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PASSWORD_MIN_LENGTH)
                .long(ARG_PASSWORD_MIN_LENGTH)
                .help("Minimum password length in characters")
                .env("SIGNET_PASSWORD_MIN_LENGTH")
                .default_value("8")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new(ARG_HASH_COST)
                .long(ARG_HASH_COST)
                .help("Argon2id iterations (time cost)")
                .env("SIGNET_HASH_COST")
                .default_value("3")
                .global(true)
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_HASH_MEMORY_KIB)
                .long(ARG_HASH_MEMORY_KIB)
                .help("Argon2id memory cost in KiB")
                .env("SIGNET_HASH_MEMORY_KIB")
                .default_value("19456")
                .global(true)
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_HASH_CONCURRENCY)
                .long(ARG_HASH_CONCURRENCY)
                .help("Maximum concurrent password hash computations")
                .env("SIGNET_HASH_CONCURRENCY")
                .default_value("4")
                .value_parser(clap::value_parser!(usize)),
        )
}

fn with_session_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session token TTL in seconds")
                .env("SIGNET_SESSION_TTL_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_SIGNING_SECRET)
                .long(ARG_SIGNING_SECRET)
                .help("HMAC secret used to sign session tokens (at least 32 bytes)")
                .env("SIGNET_SIGNING_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_COOKIE_SECURE)
                .long(ARG_COOKIE_SECURE)
                .help("Mark the session cookie Secure (disable only for plain-HTTP development)")
                .env("SIGNET_COOKIE_SECURE")
                .default_value("true")
                .value_parser(BoolishValueParser::new()),
        )
}
