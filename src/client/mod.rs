//! GitHub API client

use async_trait::async_trait;

use crate::error::Result;

pub mod auth;
#[cfg(test)]
pub mod fixtures;
pub mod github;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod pagination;

pub use github::GitHubClient;
#[cfg(test)]
pub use mock::MockGitHubClient;
pub use models::{
    CommitEntry, Comparison, DependabotAlert, NewRuleset, PullQuery, PullRequest, Release,
    RepoRef, RepoSettingsPatch, Repository, Review, ReviewEvent, ReviewState, Ruleset, Severity,
    SimpleUser,
};

/// GitHub REST operations used by the reports.
///
/// Implemented by [`GitHubClient`] over HTTP, by the caching wrapper, and by
/// a mock in tests. List methods return every page.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    // ========================================================================
    // Identity
    // ========================================================================

    /// The account the token belongs to
    async fn current_user(&self) -> Result<SimpleUser>;

    // ========================================================================
    // Repositories
    // ========================================================================

    /// All repositories of an organization
    async fn list_org_repos(&self, org: &str) -> Result<Vec<Repository>>;

    /// A single repository; `ApiError::NotFound` when missing or hidden
    async fn get_repo(&self, repo: &RepoRef) -> Result<Repository>;

    /// Update repository settings
    async fn update_repo(&self, repo: &RepoRef, patch: &RepoSettingsPatch) -> Result<Repository>;

    /// Whether Dependabot alerts are enabled
    async fn vulnerability_alerts_enabled(&self, repo: &RepoRef) -> Result<bool>;

    /// Turn on Dependabot alerts
    async fn enable_vulnerability_alerts(&self, repo: &RepoRef) -> Result<()>;

    /// Repository rulesets
    async fn list_rulesets(&self, repo: &RepoRef) -> Result<Vec<Ruleset>>;

    /// Create a repository ruleset
    async fn create_ruleset(&self, repo: &RepoRef, ruleset: &NewRuleset) -> Result<Ruleset>;

    // ========================================================================
    // Releases
    // ========================================================================

    /// All releases, drafts included
    async fn list_releases(&self, repo: &RepoRef) -> Result<Vec<Release>>;

    /// Latest published release, `None` when the repository has none
    async fn latest_release(&self, repo: &RepoRef) -> Result<Option<Release>>;

    /// Compare two refs (`base...head`)
    async fn compare(&self, repo: &RepoRef, base: &str, head: &str) -> Result<Comparison>;

    // ========================================================================
    // Security
    // ========================================================================

    /// Open Dependabot alerts
    async fn list_open_alerts(&self, repo: &RepoRef) -> Result<Vec<DependabotAlert>>;

    // ========================================================================
    // Pull requests
    // ========================================================================

    /// Pull requests, newest first
    async fn list_pulls(&self, repo: &RepoRef, query: &PullQuery) -> Result<Vec<PullRequest>>;

    /// Reviews of a pull request in submission order
    async fn list_reviews(&self, repo: &RepoRef, number: u64) -> Result<Vec<Review>>;

    /// Submit a review without a body
    async fn submit_review(&self, repo: &RepoRef, number: u64, event: ReviewEvent) -> Result<()>;
}
