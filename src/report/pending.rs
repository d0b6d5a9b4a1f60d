//! Unreleased commits on the default branch

use chrono::{DateTime, Utc};
use log::debug;

use crate::client::{CommitEntry, Comparison, GitHubApi, RepoRef, Repository};
use crate::error::Result;

const SHORT_SHA_LEN: usize = 7;

/// A repository whose default branch is ahead of its latest release
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRelease {
    pub repo: RepoRef,
    pub tag: String,
    pub branch: String,
    pub ahead_by: u64,
    /// Newest first
    pub commits: Vec<PendingCommit>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingCommit {
    pub short_sha: String,
    pub subject: String,
    pub author: String,
    pub date: Option<DateTime<Utc>>,
}

impl From<&CommitEntry> for PendingCommit {
    fn from(entry: &CommitEntry) -> Self {
        Self {
            short_sha: entry.sha.chars().take(SHORT_SHA_LEN).collect(),
            subject: entry.subject().to_string(),
            author: entry.author_name().to_string(),
            date: entry.commit.author.as_ref().and_then(|a| a.date),
        }
    }
}

/// `Some` only when `branch` is strictly ahead of `tag`
pub fn pending_from_comparison(
    repo: RepoRef,
    tag: &str,
    branch: &str,
    comparison: &Comparison,
) -> Option<PendingRelease> {
    if comparison.ahead_by == 0 {
        return None;
    }

    Some(PendingRelease {
        repo,
        tag: tag.to_string(),
        branch: branch.to_string(),
        ahead_by: comparison.ahead_by,
        commits: comparison.commits.iter().rev().map(PendingCommit::from).collect(),
    })
}

/// Compare the latest release of `repo` with its default branch.
///
/// Repositories without a published release have nothing pending.
pub async fn check_repo<A>(api: &A, repo: &Repository) -> Result<Option<PendingRelease>>
where
    A: GitHubApi + ?Sized,
{
    let target = repo.repo_ref();
    let Some(latest) = api.latest_release(&target).await? else {
        debug!("{} has no releases", target);
        return Ok(None);
    };

    let comparison = api
        .compare(&target, &latest.tag_name, &repo.default_branch)
        .await?;

    Ok(pending_from_comparison(
        target,
        &latest.tag_name,
        &repo.default_branch,
        &comparison,
    ))
}
