//! Command execution context
//!
//! Loads config, resolves the token and builds the API client once, so each
//! command handler starts from the same place.

use std::io::IsTerminal;
use std::sync::Arc;

use log::debug;
use tokio::sync::OnceCell;

use crate::cache::CachedGitHubClient;
use crate::cli::GlobalOptions;
use crate::client::{GitHubApi, GitHubClient, auth};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::report::FanOutPolicy;

/// Context for command execution containing config, client, and runtime options.
pub struct CommandContext {
    /// Loaded configuration with CLI overrides applied
    pub config: Config,
    /// Authenticated API client, caching only when the command asked for it
    pub client: Arc<CachedGitHubClient<GitHubClient>>,
    /// How repositories are fanned out
    pub policy: FanOutPolicy,
    login: OnceCell<String>,
}

impl CommandContext {
    /// Create a new command context with full initialization.
    ///
    /// The token is resolved before anything touches the network, so a
    /// missing `gh` or a logged-out session fails fast.
    pub fn new(opts: &GlobalOptions, use_cache: bool) -> Result<Self> {
        let mut config = Config::load_at(opts.config_ref())?;

        if let Some(org) = opts.org_ref() {
            config.org = Some(org.to_string());
        }
        if let Some(url) = opts.api_url_ref() {
            config.api_url = url.to_string();
        }

        let token = auth::resolve_token(config.token.as_deref())?;
        let raw_client = GitHubClient::new(token, &config.api_url)?;
        let client = Arc::new(CachedGitHubClient::new(raw_client, use_cache));
        debug!(
            "API {} (response cache {})",
            config.api_url,
            if client.is_enabled() { "on" } else { "off" }
        );

        let policy = Self::fan_out_policy(opts, &config);

        Ok(Self {
            config,
            client,
            policy,
            login: OnceCell::new(),
        })
    }

    /// CLI flags win over the config file; progress only on a terminal.
    pub fn fan_out_policy(opts: &GlobalOptions, config: &Config) -> FanOutPolicy {
        FanOutPolicy {
            jobs: opts.jobs.unwrap_or(config.concurrency).max(1),
            keep_going: opts.keep_going || config.continue_on_error,
            progress: std::io::stderr().is_terminal(),
        }
    }

    /// The organization every report runs against
    pub fn org(&self) -> Result<&str> {
        self.config.require_org(None)
    }

    /// Login of the token owner, fetched on first use
    pub async fn current_login(&self) -> Result<&str> {
        let login = self
            .login
            .get_or_try_init(|| async {
                let user = self.client.current_user().await?;
                Ok::<_, Error>(user.login)
            })
            .await?;
        Ok(login.as_str())
    }
}
