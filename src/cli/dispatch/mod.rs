//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to an action: hashing a password for
//! provisioning, or starting the API server with its full configuration.

use crate::cli::actions::{Action, hash_password, server};
use crate::cli::commands::{CMD_HASH_PASSWORD, auth};
use anyhow::Result;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    if let Some(sub_m) = matches.subcommand_matches(CMD_HASH_PASSWORD) {
        return Ok(Action::HashPassword(hash_password::Args {
            hash: auth::HashOptions::parse(sub_m),
        }));
    }

    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .filter(|v| !v.trim().is_empty());

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(server::Args {
        port,
        dsn,
        auth: auth_opts,
    }))
}
