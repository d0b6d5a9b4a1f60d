//! Configuration management for ghops
//!
//! Settings live in `~/.ghops/config.yaml`. A missing file is not an error:
//! every field has a documented default, so the tool works with nothing more
//! than an authenticated `gh` session and an `--org` flag.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::report::daterange::{Quarter, Timeframe};
use crate::report::pulls::ReviewPolicy;

/// Public GitHub REST API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default organization for every report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,

    /// GitHub REST API base URL (GitHub Enterprise hosts use `https://host/api/v3`)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Access token; environment variables take precedence over this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Repository names that are never reported on or modified
    #[serde(default = "default_denylist")]
    pub denylist: Vec<String>,

    /// How many repositories may be fetched at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Record per-repository failures and keep going instead of aborting
    #[serde(default)]
    pub continue_on_error: bool,

    /// How individual reviews reduce to a pull request's review status
    #[serde(default)]
    pub review_policy: ReviewPolicy,

    /// Defaults for report flags
    #[serde(default)]
    pub defaults: Defaults,
}

/// Flag defaults that used to be hard-coded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Quarter used by `release-notes` when `--quarter` is omitted
    #[serde(default = "default_quarter")]
    pub quarter: Quarter,

    /// Window used by `pr-metrics` when `--timeframe` is omitted
    #[serde(default = "default_timeframe")]
    pub timeframe: Timeframe,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_denylist() -> Vec<String> {
    vec![".github".to_string()]
}

fn default_concurrency() -> usize {
    1
}

fn default_quarter() -> Quarter {
    Quarter::Q4
}

fn default_timeframe() -> Timeframe {
    Timeframe::OneMonth
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            quarter: default_quarter(),
            timeframe: default_timeframe(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            org: None,
            api_url: default_api_url(),
            token: None,
            denylist: default_denylist(),
            concurrency: default_concurrency(),
            continue_on_error: false,
            review_policy: ReviewPolicy::default(),
            defaults: Defaults::default(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".ghops").join("config.yaml"))
    }

    /// Resolve an explicit path or fall back to the default location
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from `path`, or the default location when `None`.
    ///
    /// A missing file yields the default configuration.
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        let path = Self::resolve_path(path)?;
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    /// Load configuration from a specific, existing path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(&path)?;
        Self::parse(&contents)
    }

    /// Parse and validate YAML configuration text
    pub fn parse(contents: &str) -> Result<Self> {
        // An empty file deserializes to null rather than an empty mapping
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(contents).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no command can work with
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".to_string()).into());
        }
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api_url must not be empty".to_string()).into());
        }
        Ok(())
    }

    /// Pick the organization: explicit override first, then the config file.
    pub fn require_org<'a>(&'a self, org_override: Option<&'a str>) -> Result<&'a str> {
        org_override
            .or(self.org.as_deref())
            .filter(|org| !org.is_empty())
            .ok_or_else(|| ConfigError::MissingOrg.into())
    }
}
