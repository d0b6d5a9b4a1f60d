//! PR metrics command

use chrono::Utc;
use colored::Colorize;
use log::debug;
use tabled::Tabled;

use crate::cli::CommandContext;
use crate::client::{GitHubApi, PullQuery, Repository};
use crate::error::Result;
use crate::output::formatters::{format_days, format_pct, format_per_week};
use crate::output::table::format_table;
use crate::report::metrics::{MetricsBucket, MetricsReport, PullSample, Summary, aggregate};
use crate::report::{DateRange, FanOut, FanOutPolicy, RepoSelector, Timeframe, enumerate, for_each_repo};

/// Parsed `pr-metrics` flags
#[derive(Debug, Clone, Default)]
pub struct PrMetricsArgs {
    pub repo: Option<String>,
    pub limit: Option<usize>,
    pub timeframe: Option<Timeframe>,
    pub user: Option<String>,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "METRIC")]
    metric: &'static str,
    #[tabled(rename = "VALUE")]
    value: String,
}

#[derive(Tabled)]
struct AuthorRow {
    #[tabled(rename = "AUTHOR")]
    author: String,
    #[tabled(rename = "PRS")]
    prs: usize,
    #[tabled(rename = "MERGED")]
    merged: usize,
    #[tabled(rename = "MERGE RATE")]
    merge_rate: String,
    #[tabled(rename = "AVG TO MERGE")]
    avg_merge: String,
    #[tabled(rename = "VELOCITY")]
    velocity: String,
}

impl From<&MetricsBucket> for AuthorRow {
    fn from(bucket: &MetricsBucket) -> Self {
        Self {
            author: bucket.key.clone(),
            prs: bucket.count,
            merged: bucket.merged,
            merge_rate: format_pct(bucket.merge_rate),
            avg_merge: format_days(bucket.avg_merge_days),
            velocity: format_per_week(bucket.velocity),
        }
    }
}

#[derive(Tabled)]
struct ReviewerRow {
    #[tabled(rename = "REVIEWER")]
    reviewer: String,
    #[tabled(rename = "REVIEWS")]
    reviews: usize,
    #[tabled(rename = "AVG TO REVIEW")]
    avg_review: String,
    #[tabled(rename = "VELOCITY")]
    velocity: String,
}

impl From<&MetricsBucket> for ReviewerRow {
    fn from(bucket: &MetricsBucket) -> Self {
        Self {
            reviewer: bucket.key.clone(),
            reviews: bucket.count,
            avg_review: format_days(bucket.avg_review_days),
            velocity: format_per_week(bucket.velocity),
        }
    }
}

fn summary_rows(summary: &Summary) -> Vec<SummaryRow> {
    vec![
        SummaryRow {
            metric: "Pull requests",
            value: summary.total_prs.to_string(),
        },
        SummaryRow {
            metric: "Merged",
            value: summary.merged_prs.to_string(),
        },
        SummaryRow {
            metric: "Merge rate",
            value: format_pct(summary.merge_rate),
        },
        SummaryRow {
            metric: "Avg time to merge",
            value: format_days(summary.avg_merge_days),
        },
        SummaryRow {
            metric: "PR velocity",
            value: format_per_week(summary.pr_velocity),
        },
        SummaryRow {
            metric: "Reviews",
            value: summary.total_reviews.to_string(),
        },
        SummaryRow {
            metric: "Avg time to review",
            value: format_days(summary.avg_review_days),
        },
        SummaryRow {
            metric: "Review velocity",
            value: format_per_week(summary.review_velocity),
        },
    ]
}

/// Run the pr-metrics command
pub async fn run(ctx: &CommandContext, args: PrMetricsArgs) -> Result<()> {
    let timeframe = args.timeframe.unwrap_or(ctx.config.defaults.timeframe);
    let window = DateRange::trailing(timeframe.days(), Utc::now());

    let org = ctx.org()?;
    let selector = RepoSelector::from_args(args.repo.as_deref(), None);
    let repos = enumerate(ctx.client.as_ref(), org, &selector, &ctx.config.denylist).await?;

    let out = collect(ctx.client.as_ref(), &repos, &window, args.limit, ctx.policy).await?;
    let samples: Vec<PullSample> = out.done().flat_map(|(_, s)| s.iter().cloned()).collect();
    let report = aggregate(&samples, &window, args.user.as_deref());

    print!("{}", render(org, timeframe, args.user.as_deref(), &report));
    out.warn_failures();
    Ok(())
}

/// Pull requests created inside `window`, with their reviews, per repository
pub async fn collect<A>(
    api: &A,
    repos: &[Repository],
    window: &DateRange,
    limit: Option<usize>,
    policy: FanOutPolicy,
) -> Result<FanOut<Vec<PullSample>>>
where
    A: GitHubApi + ?Sized,
{
    // Hour granularity keeps the cache key stable; the window filter below is exact
    let query = PullQuery::all_since(window.start_hour()).limit(limit);
    let query = &query;

    for_each_repo(repos, policy, |repo| async move {
        let target = repo.repo_ref();
        let pulls = api.list_pulls(&target, query).await?;
        debug!("{}: {} pull requests in window", target, pulls.len());

        let mut samples = Vec::with_capacity(pulls.len());
        for pr in pulls.iter().filter(|pr| window.contains(pr.created_at)) {
            let reviews = api.list_reviews(&target, pr.number).await?;
            samples.push(PullSample::from_pull(pr, &reviews));
        }
        Ok(samples)
    })
    .await
}

/// Summary table, then per-author and per-reviewer tables when non-empty
pub fn render(org: &str, timeframe: Timeframe, user: Option<&str>, report: &MetricsReport) -> String {
    let mut heading = format!(
        "PR metrics for {} ({}, {} days)",
        org,
        timeframe.label(),
        report.window_days
    );
    if let Some(user) = user {
        heading.push_str(&format!(" - {}", user));
    }

    let mut text = format!("{}\n\n", heading.bold());
    text.push_str(&format_table(&summary_rows(&report.summary)));
    text.push('\n');

    if !report.authors.is_empty() {
        let rows: Vec<AuthorRow> = report.authors.iter().map(AuthorRow::from).collect();
        text.push_str(&format!("\n{}\n", "Authors".bold()));
        text.push_str(&format_table(&rows));
        text.push('\n');
    }

    if !report.reviewers.is_empty() {
        let rows: Vec<ReviewerRow> = report.reviewers.iter().map(ReviewerRow::from).collect();
        text.push_str(&format!("\n{}\n", "Reviewers".bold()));
        text.push_str(&format_table(&rows));
        text.push('\n');
    }

    text
}
