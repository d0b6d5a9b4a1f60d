//! ghops - reports and bulk settings for GitHub organizations

use clap::Parser;

mod cache;
mod cli;
mod client;
mod config;
mod error;
mod output;
mod report;

use cli::pr_metrics::PrMetricsArgs;
use cli::pull_requests::PullRequestsArgs;
use cli::release_notes::ReleaseNotesArgs;
use cli::security_alerts::SecurityAlertsArgs;
use cli::{CacheCommands, Cli, CommandContext, Commands, GlobalOptions};
use error::Result;
use report::alerts::AlertFilter;
use report::pulls::PullFilter;

#[tokio::main]
async fn main() {
    // Usage errors exit 1 rather than clap's default 2
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    init_logging(cli.debug);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; `--debug` only changes the default
fn init_logging(debug: bool) {
    let default_filter = if debug { "warn,ghops=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::ReleaseNotes {
            repo,
            quarter,
            year,
        } => {
            let ctx = CommandContext::new(&opts, false)?;
            cli::release_notes::run(
                &ctx,
                ReleaseNotesArgs {
                    repo,
                    quarter,
                    year,
                },
            )
            .await
        }
        Commands::RepoSettings { repo, action } => {
            let ctx = CommandContext::new(&opts, false)?;
            cli::repo_settings::run(&ctx, repo, action).await
        }
        Commands::SecurityAlerts {
            repo,
            csv,
            high_risk,
            since,
            until,
        } => {
            let ctx = CommandContext::new(&opts, false)?;
            let args = SecurityAlertsArgs {
                repo,
                csv,
                filter: AlertFilter {
                    high_risk_only: high_risk,
                    since,
                    until,
                },
            };
            cli::security_alerts::run(&ctx, args).await
        }
        Commands::PullRequests {
            filter,
            mine,
            involved,
            pending,
            repo,
            days,
            approve,
        } => {
            let args = PullRequestsArgs {
                name_filter: filter,
                repo,
                filter: PullFilter {
                    mine,
                    involved,
                    pending,
                    min_days: days,
                },
                approve: None,
            }
            .with_approve(approve)?;
            cli::pull_requests::validate(&args)?;
            let ctx = CommandContext::new(&opts, false)?;
            cli::pull_requests::run(&ctx, args).await
        }
        Commands::PrMetrics {
            repo,
            limit,
            timeframe,
            user,
            use_cache,
        } => {
            let ctx = CommandContext::new(&opts, use_cache)?;
            let args = PrMetricsArgs {
                repo,
                limit,
                timeframe,
                user,
            };
            cli::pr_metrics::run(&ctx, args).await
        }
        Commands::PendingReleases { filter, repo } => {
            let ctx = CommandContext::new(&opts, false)?;
            cli::pending_releases::run(&ctx, repo, filter).await
        }
        Commands::Cache(cache_cmd) => match cache_cmd {
            CacheCommands::Status => cli::cache::status(),
            CacheCommands::Clear => cli::cache::clear(),
        },
        Commands::Completion { shell } => {
            cli::completions::run(shell);
            Ok(())
        }
    }
}
