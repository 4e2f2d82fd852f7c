use crate::{auth::PasswordHasher, cli::commands::auth::HashOptions};
use anyhow::{Context, Result, bail};
use secrecy::{ExposeSecret, SecretString};
use tokio::io::AsyncReadExt;

#[derive(Debug)]
pub struct Args {
    pub hash: HashOptions,
}

/// Strip the line terminator a shell pipe or prompt leaves behind.
fn read_password(input: String) -> Result<SecretString> {
    let password = input.trim_end_matches(['\n', '\r']);
    if password.is_empty() {
        bail!("no password provided on stdin");
    }
    Ok(SecretString::from(password.to_string()))
}

/// Read a password from stdin and print its PHC hash.
/// # Errors
/// Returns an error if stdin is empty or hashing fails.
pub async fn execute(args: Args) -> Result<()> {
    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("Failed to read password from stdin")?;

    let password = read_password(input)?;
    let hasher = PasswordHasher::new(args.hash.cost, args.hash.memory_kib)?;

    let hash = tokio::task::spawn_blocking(move || hasher.hash(password.expose_secret()))
        .await
        .context("Password hashing task failed")??;

    println!("{hash}");

    Ok(())
}
