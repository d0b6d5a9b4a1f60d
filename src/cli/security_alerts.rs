//! Security alerts command

use colored::Colorize;
use log::warn;

use crate::cli::CommandContext;
use crate::client::{GitHubApi, Repository};
use crate::error::{ApiError, Error, Result};
use crate::output::csv::alerts_csv;
use crate::output::formatters::{count_noun, format_date, severity_icon};
use crate::report::alerts::{AlertFilter, AlertRecord, select};
use crate::report::{FanOut, FanOutPolicy, RepoSelector, enumerate, for_each_repo};

/// Parsed `security-alerts` flags
#[derive(Debug, Clone, Default)]
pub struct SecurityAlertsArgs {
    pub repo: Option<String>,
    pub csv: bool,
    pub filter: AlertFilter,
}

/// Alerts of one repository; `None` when Dependabot alerts are unavailable there
pub type RepoAlerts = Option<Vec<AlertRecord>>;

/// Run the security-alerts command
pub async fn run(ctx: &CommandContext, args: SecurityAlertsArgs) -> Result<()> {
    let org = ctx.org()?;
    let selector = RepoSelector::from_args(args.repo.as_deref(), None);
    let repos = enumerate(ctx.client.as_ref(), org, &selector, &ctx.config.denylist).await?;

    let out = collect(ctx.client.as_ref(), &repos, &args.filter, ctx.policy).await?;
    if args.csv {
        print!("{}", alerts_csv(&flatten(&out)));
    } else {
        print!("{}", render(&out));
    }
    out.warn_failures();

    Ok(())
}

/// Open alerts matching `filter`, per repository
pub async fn collect<A>(
    api: &A,
    repos: &[Repository],
    filter: &AlertFilter,
    policy: FanOutPolicy,
) -> Result<FanOut<RepoAlerts>>
where
    A: GitHubApi + ?Sized,
{
    for_each_repo(repos, policy, |repo| async move {
        let target = repo.repo_ref();
        match api.list_open_alerts(&target).await {
            Ok(alerts) => Ok(Some(select(&target, &alerts, filter))),
            // Disabled Dependabot or missing admin rights look the same
            Err(Error::Api(ApiError::Forbidden(_) | ApiError::NotFound(_))) => {
                warn!("Dependabot alerts unavailable for {}, skipping", target);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    })
    .await
}

/// All records in enumeration order
pub fn flatten(out: &FanOut<RepoAlerts>) -> Vec<AlertRecord> {
    out.done()
        .filter_map(|(_, alerts)| alerts.as_ref())
        .flatten()
        .cloned()
        .collect()
}

/// Listing grouped by repository, most severe first
pub fn render(out: &FanOut<RepoAlerts>) -> String {
    let mut text = String::new();
    let mut total = 0;
    let mut affected = 0;

    for (repo, alerts) in out.done() {
        let Some(alerts) = alerts else {
            continue;
        };
        if alerts.is_empty() {
            continue;
        }
        total += alerts.len();
        affected += 1;

        text.push_str(&format!(
            "\n{} ({})\n",
            repo.full_name.bold(),
            count_noun(alerts.len(), "alert", "alerts")
        ));
        for alert in alerts {
            text.push_str(&format!(
                "  {} {:<8} {} ({})  {}  {}\n",
                severity_icon(alert.severity),
                alert.severity.to_string(),
                alert.package.bold(),
                alert.ecosystem,
                alert.ghsa_id,
                format_date(Some(alert.published))
            ));
            text.push_str(&format!("      {}\n", alert.summary));
            text.push_str(&format!("      {}\n", alert.url.dimmed()));
        }
    }

    if total == 0 {
        text.push_str("No open alerts found.\n");
    } else {
        text.push_str(&format!(
            "\n{} in {}\n",
            count_noun(total, "open alert", "open alerts"),
            count_noun(affected, "repository", "repositories")
        ));
    }
    text
}
