//! Pending releases command

use colored::Colorize;

use crate::cli::CommandContext;
use crate::client::{GitHubApi, Repository};
use crate::error::Result;
use crate::output::formatters::{count_noun, format_date};
use crate::report::pending::{PendingRelease, check_repo};
use crate::report::{FanOut, FanOutPolicy, RepoSelector, enumerate, for_each_repo};

/// Run the pending-releases command
pub async fn run(ctx: &CommandContext, repo: Option<String>, filter: Option<String>) -> Result<()> {
    let org = ctx.org()?;
    let selector = RepoSelector::from_args(repo.as_deref(), filter.as_deref());
    let repos = enumerate(ctx.client.as_ref(), org, &selector, &ctx.config.denylist).await?;

    let out = collect(ctx.client.as_ref(), &repos, ctx.policy).await?;
    print!("{}", render(&out));
    out.warn_failures();
    Ok(())
}

/// Compare each repository's latest release with its default branch
pub async fn collect<A>(
    api: &A,
    repos: &[Repository],
    policy: FanOutPolicy,
) -> Result<FanOut<Option<PendingRelease>>>
where
    A: GitHubApi + ?Sized,
{
    for_each_repo(repos, policy, |repo| check_repo(api, repo)).await
}

/// One block per repository that is ahead; nothing for the rest
pub fn render(out: &FanOut<Option<PendingRelease>>) -> String {
    let mut text = String::new();

    for pending in out.done().filter_map(|(_, p)| p.as_ref()) {
        text.push_str(&format!(
            "{}: {} since {}\n",
            pending.repo.to_string().bold(),
            count_noun(pending.ahead_by as usize, "commit", "commits").yellow(),
            pending.tag
        ));
        for commit in &pending.commits {
            text.push_str(&format!(
                "  {} {} ({}, {})\n",
                commit.short_sha.dimmed(),
                commit.subject,
                commit.author,
                format_date(commit.date)
            ));
        }
    }
    text
}
