//! CLI command definitions and handlers

use clap::{Parser, Subcommand};
pub use clap_complete::Shell;

pub mod args;
pub mod cache;
pub mod completions;
pub mod context;
pub mod pending_releases;
pub mod pr_metrics;
pub mod pull_requests;
pub mod release_notes;
pub mod repo_settings;
pub mod security_alerts;

pub use args::GlobalOptions;
pub use context::CommandContext;
pub use repo_settings::SettingsAction;

use crate::report::daterange::{Quarter, Timeframe, parse_since, parse_until, parse_year};

/// ghops - reports and bulk settings for GitHub organizations
#[derive(Parser, Debug)]
#[command(name = "ghops")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Organization to report on (overrides config)
    #[arg(short, long, global = true, env = "GHOPS_ORG", hide_env = true)]
    pub org: Option<String>,

    /// Override config file location
    #[arg(long, global = true, env = "GHOPS_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// GitHub API base URL (GitHub Enterprise: https://HOST/api/v3)
    #[arg(long, global = true, env = "GHOPS_API_URL", hide_env = true)]
    pub api_url: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "GHOPS_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Report per-repository failures at the end instead of stopping
    #[arg(long, global = true)]
    pub keep_going: bool,

    /// Repositories to fetch at once
    #[arg(short, long, global = true, value_name = "N")]
    pub jobs: Option<usize>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Release notes published during a calendar quarter
    ReleaseNotes {
        /// Single repository (name or owner/name)
        #[arg(short, long)]
        repo: Option<String>,

        /// Quarter to report on (default from config, Q4 when unset)
        #[arg(short, long, value_enum, ignore_case = true)]
        quarter: Option<Quarter>,

        /// Four-digit year (default: current year)
        #[arg(short, long, value_parser = parse_year)]
        year: Option<i32>,
    },

    /// Apply repository settings across an organization
    RepoSettings {
        /// Single repository (name or owner/name)
        #[arg(short, long)]
        repo: Option<String>,

        /// Setting to apply
        #[arg(value_enum, default_value_t = SettingsAction::SecureAll)]
        action: SettingsAction,
    },

    /// Open Dependabot alerts grouped by repository
    SecurityAlerts {
        /// Single repository (name or owner/name)
        #[arg(short, long)]
        repo: Option<String>,

        /// Print CSV instead of a listing
        #[arg(short, long)]
        csv: bool,

        /// Only critical and high severity
        #[arg(short = 'H', long)]
        high_risk: bool,

        /// Advisories published on or after (YYYY-MM-DD or RFC 3339)
        #[arg(long, value_parser = parse_since)]
        since: Option<chrono::DateTime<chrono::Utc>>,

        /// Advisories published on or before (YYYY-MM-DD or RFC 3339)
        #[arg(long, value_parser = parse_until)]
        until: Option<chrono::DateTime<chrono::Utc>>,
    },

    /// Open pull requests with review status, optionally approve one
    PullRequests {
        /// Only repositories whose name contains this text
        filter: Option<String>,

        /// Only pull requests you authored
        #[arg(short, long)]
        mine: bool,

        /// Only pull requests assigned to you or awaiting your review
        #[arg(short, long)]
        involved: bool,

        /// Only pull requests without a decisive review
        #[arg(short, long)]
        pending: bool,

        /// Single repository (name or owner/name)
        #[arg(short, long)]
        repo: Option<String>,

        /// Only pull requests open at least this many days
        #[arg(short, long, value_name = "DAYS")]
        days: Option<u32>,

        /// Approve pull request N (needs --repo), or pick one interactively.
        /// A non-numeric value is read as the name filter.
        #[arg(short, long, value_name = "N", num_args = 0..=1)]
        approve: Option<Option<String>>,
    },

    /// Pull request and review velocity
    PrMetrics {
        /// Single repository (name or owner/name)
        #[arg(short, long)]
        repo: Option<String>,

        /// Pull requests fetched per repository at most
        #[arg(short, long)]
        limit: Option<usize>,

        /// Analysis window (default from config, 1m when unset)
        #[arg(short, long, value_enum)]
        timeframe: Option<Timeframe>,

        /// Only this author and reviewer
        #[arg(short, long)]
        user: Option<String>,

        /// Serve API responses from the local cache when fresh
        #[arg(long)]
        use_cache: bool,
    },

    /// Commits on the default branch since the latest release
    PendingReleases {
        /// Only repositories whose name contains this text
        filter: Option<String>,

        /// Single repository (name or owner/name)
        #[arg(short, long)]
        repo: Option<String>,
    },

    /// Manage the local response cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Generate shell completions
    #[command(after_help = "\
Install:
  bash:   ghops completion bash > /etc/bash_completion.d/ghops
  zsh:    ghops completion zsh > \"${fpath[1]}/_ghops\"
  fish:   ghops completion fish > ~/.config/fish/completions/ghops.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Cache management subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache statistics
    Status,
    /// Clear all cached data
    Clear,
}
