//! Access token discovery
//!
//! Lookup order: `GH_TOKEN`, `GITHUB_TOKEN`, the config file `token`, and
//! finally the session stored by the `gh` CLI.

use std::io::ErrorKind;
use std::process::Command;

use log::debug;

use crate::error::{ConfigError, Result};

/// Environment variables checked for a token, in order
pub const TOKEN_ENV_VARS: [&str; 2] = ["GH_TOKEN", "GITHUB_TOKEN"];

/// Resolve the access token for API calls.
pub fn resolve_token(config_token: Option<&str>) -> Result<String> {
    token_from_sources(|name| std::env::var(name).ok(), config_token, gh_auth_token)
}

/// Token lookup with injectable sources.
pub fn token_from_sources<E, G>(env: E, config_token: Option<&str>, gh: G) -> Result<String>
where
    E: Fn(&str) -> Option<String>,
    G: FnOnce() -> Result<String>,
{
    for name in TOKEN_ENV_VARS {
        if let Some(token) = env(name).map(|t| t.trim().to_string())
            && !token.is_empty()
        {
            debug!("Using token from {}", name);
            return Ok(token);
        }
    }

    if let Some(token) = config_token.map(str::trim).filter(|t| !t.is_empty()) {
        debug!("Using token from config file");
        return Ok(token.to_string());
    }

    debug!("Asking gh for a token");
    gh()
}

/// Run `gh auth token`
fn gh_auth_token() -> Result<String> {
    let output = match Command::new("gh").args(["auth", "token"]).output() {
        Ok(output) => output,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::MissingDependency("gh".to_string()).into());
        }
        Err(e) => return Err(e.into()),
    };

    if !output.status.success() {
        debug!(
            "gh auth token failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return Err(ConfigError::NotAuthenticated.into());
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(ConfigError::NotAuthenticated.into());
    }
    Ok(token)
}
