//! Release notes command

use chrono::{Datelike, Utc};
use colored::Colorize;

use crate::cli::CommandContext;
use crate::client::{GitHubApi, Release, Repository};
use crate::error::Result;
use crate::output::formatters::{count_noun, format_date};
use crate::report::releases::releases_in_range;
use crate::report::{DateRange, FanOut, FanOutPolicy, Quarter, RepoSelector, enumerate, for_each_repo};

/// Parsed `release-notes` flags
#[derive(Debug, Clone)]
pub struct ReleaseNotesArgs {
    pub repo: Option<String>,
    pub quarter: Option<Quarter>,
    pub year: Option<i32>,
}

/// Run the release-notes command
pub async fn run(ctx: &CommandContext, args: ReleaseNotesArgs) -> Result<()> {
    let quarter = args.quarter.unwrap_or(ctx.config.defaults.quarter);
    let year = args.year.unwrap_or_else(|| Utc::now().year());
    let range = DateRange::for_quarter(quarter, year)?;

    let org = ctx.org()?;
    let selector = RepoSelector::from_args(args.repo.as_deref(), None);
    let repos = enumerate(ctx.client.as_ref(), org, &selector, &ctx.config.denylist).await?;

    let out = collect(ctx.client.as_ref(), &repos, &range, ctx.policy).await?;
    print!("{}", render(quarter, year, &range, &out));
    out.warn_failures();

    Ok(())
}

/// Releases published in `range`, per repository
pub async fn collect<A>(
    api: &A,
    repos: &[Repository],
    range: &DateRange,
    policy: FanOutPolicy,
) -> Result<FanOut<Vec<Release>>>
where
    A: GitHubApi + ?Sized,
{
    for_each_repo(repos, policy, |repo| async move {
        let releases = api.list_releases(&repo.repo_ref()).await?;
        Ok(releases_in_range(releases, range))
    })
    .await
}

/// Markdown-flavored notes; repositories without releases are left out
pub fn render(quarter: Quarter, year: i32, range: &DateRange, out: &FanOut<Vec<Release>>) -> String {
    let mut text = format!(
        "{}\n",
        format!(
            "Release notes for {} {} ({} to {})",
            quarter,
            year,
            format_date(Some(range.start)),
            format_date(Some(range.end))
        )
        .bold()
    );

    let mut total = 0;
    for (repo, releases) in out.done() {
        if releases.is_empty() {
            continue;
        }
        total += releases.len();

        text.push_str(&format!("\n## {}\n", repo.full_name.cyan().bold()));
        for release in releases {
            text.push_str(&format!(
                "\n### {} ({}) - {}\n{}\n",
                release.title(),
                release.tag_name,
                format_date(release.published_at),
                release.html_url.dimmed()
            ));
            if let Some(body) = release.body.as_deref().map(str::trim)
                && !body.is_empty()
            {
                text.push_str(&format!("\n{}\n", body));
            }
        }
    }

    if total == 0 {
        text.push_str("\nNo releases found.\n");
    } else {
        text.push_str(&format!("\n{}\n", count_noun(total, "release", "releases")));
    }
    text
}
