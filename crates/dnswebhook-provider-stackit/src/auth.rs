//! Bearer credential resolution
//!
//! A key file either holds the bare token, or a JSON object carrying it in a
//! `token` or `access_token` field. The file is read once at construction.

use dnswebhook_core::config::Credentials;
use dnswebhook_core::{Error, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
struct KeyFile {
    token: Option<String>,
    access_token: Option<String>,
}

/// Resolve the bearer token of `credentials`.
///
/// # Errors
///
/// Returns [`Error::Config`] if the token is empty or the key file cannot
/// be read or holds no token.
pub fn resolve_token(credentials: &Credentials) -> Result<String> {
    let token = match credentials {
        Credentials::Token { token } => token.trim().to_string(),
        Credentials::KeyFile { path } => read_key_file(path)?,
    };

    if token.is_empty() {
        return Err(Error::config("STACKIT bearer token cannot be empty"));
    }

    Ok(token)
}

fn read_key_file(path: &Path) -> Result<String> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("cannot read key file {}: {}", path.display(), e))
    })?;

    token_from_key(&contents).ok_or_else(|| {
        Error::config(format!("key file {} holds no token", path.display()))
    })
}

fn token_from_key(contents: &str) -> Option<String> {
    let trimmed = contents.trim();
    if !trimmed.starts_with('{') {
        return Some(trimmed.to_string());
    }

    let key: KeyFile = serde_json::from_str(trimmed).ok()?;
    key.token
        .or(key.access_token)
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
