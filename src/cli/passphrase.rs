//! Passphrase input
//!
//! `FINNEST_PASSPHRASE` wins over the interactive prompt so scripts and tests
//! can run unattended.

use crate::crypto::SecureString;
use crate::error::{FinnestError, FinnestResult};

pub const PASSPHRASE_ENV: &str = "FINNEST_PASSPHRASE";

/// Passphrase for decrypting an existing document
pub fn read_passphrase() -> FinnestResult<SecureString> {
    if let Some(from_env) = from_env() {
        return Ok(from_env);
    }
    prompt("Passphrase: ")
}

/// Passphrase for new uploads, asked twice when prompting
pub fn read_new_passphrase() -> FinnestResult<SecureString> {
    if let Some(from_env) = from_env() {
        return Ok(from_env);
    }

    let first = prompt("Passphrase: ")?;
    let second = prompt("Confirm passphrase: ")?;
    if first.as_str() != second.as_str() {
        return Err(FinnestError::Validation("Passphrases do not match".into()));
    }
    Ok(first)
}

fn from_env() -> Option<SecureString> {
    std::env::var(PASSPHRASE_ENV).ok().map(SecureString::new)
}

/// Hidden input
fn prompt(label: &str) -> FinnestResult<SecureString> {
    rpassword::prompt_password(label)
        .map(SecureString::new)
        .map_err(|e| FinnestError::Io(format!("Failed to read passphrase: {}", e)))
}
