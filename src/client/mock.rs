//! Mock GitHub API client for testing
//!
//! Serves canned data keyed by `owner/name` and records every write so
//! handler tests can assert on what would have been sent.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::models::{
    Comparison, DependabotAlert, NewRuleset, PullQuery, PullRequest, PullState, Release, RepoRef,
    RepoSettingsPatch, Repository, Review, ReviewEvent, Ruleset, SimpleUser,
};
use super::GitHubApi;
use crate::error::{ApiError, Result};

/// Mock API client for testing.
///
/// # Example
/// ```ignore
/// let mock = MockGitHubClient::new()
///     .with_repos(vec![test_repo("web")])
///     .await
///     .with_alerts("acme/web", vec![alert(1, "lodash", Severity::High, "2024-01-01T00:00:00Z")])
///     .await;
/// ```
pub struct MockGitHubClient {
    /// Login returned from current_user
    user: Arc<Mutex<String>>,
    /// Repositories of every org
    repos: Arc<Mutex<Vec<Repository>>>,
    releases: Arc<Mutex<HashMap<String, Vec<Release>>>>,
    comparisons: Arc<Mutex<HashMap<String, Comparison>>>,
    alerts: Arc<Mutex<HashMap<String, Vec<DependabotAlert>>>>,
    pulls: Arc<Mutex<HashMap<String, Vec<PullRequest>>>>,
    reviews: Arc<Mutex<HashMap<(String, u64), Vec<Review>>>>,
    rulesets: Arc<Mutex<HashMap<String, Vec<Ruleset>>>>,
    /// Repositories with Dependabot alerts switched on
    vulnerability_alerts: Arc<Mutex<Vec<String>>>,
    /// Errors returned for (method, repository) pairs on every call
    failures: Arc<Mutex<HashMap<(&'static str, String), ApiError>>>,
    /// Error to return on the next call, consumed on first use
    error: Arc<Mutex<Option<ApiError>>>,
    call_count: Arc<Mutex<CallCounts>>,
    recorded: Arc<Mutex<RecordedWrites>>,
}

impl Default for MockGitHubClient {
    fn default() -> Self {
        Self {
            user: Arc::new(Mutex::new("octocat".to_string())),
            repos: Arc::new(Mutex::new(Vec::new())),
            releases: Arc::new(Mutex::new(HashMap::new())),
            comparisons: Arc::new(Mutex::new(HashMap::new())),
            alerts: Arc::new(Mutex::new(HashMap::new())),
            pulls: Arc::new(Mutex::new(HashMap::new())),
            reviews: Arc::new(Mutex::new(HashMap::new())),
            rulesets: Arc::new(Mutex::new(HashMap::new())),
            vulnerability_alerts: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
            error: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(CallCounts::default())),
            recorded: Arc::new(Mutex::new(RecordedWrites::default())),
        }
    }
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub current_user: usize,
    pub list_org_repos: usize,
    pub get_repo: usize,
    pub list_releases: usize,
    pub latest_release: usize,
    pub compare: usize,
    pub list_open_alerts: usize,
    pub list_pulls: usize,
    pub list_reviews: usize,
    pub list_rulesets: usize,
    pub vulnerability_alerts_enabled: usize,
}

impl CallCounts {
    /// Total number of read calls made.
    pub fn total(&self) -> usize {
        self.current_user
            + self.list_org_repos
            + self.get_repo
            + self.list_releases
            + self.latest_release
            + self.compare
            + self.list_open_alerts
            + self.list_pulls
            + self.list_reviews
            + self.list_rulesets
            + self.vulnerability_alerts_enabled
    }
}

/// Writes the code under test attempted
#[derive(Default, Debug, Clone)]
pub struct RecordedWrites {
    pub patches: Vec<(String, RepoSettingsPatch)>,
    pub rulesets: Vec<(String, NewRuleset)>,
    pub enabled_alerts: Vec<String>,
    pub reviews: Vec<(String, u64, ReviewEvent)>,
}

impl MockGitHubClient {
    /// Create a new mock client with empty responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the login returned from current_user.
    pub async fn with_user(self, login: &str) -> Self {
        *self.user.lock().await = login.to_string();
        self
    }

    pub async fn with_repos(self, repos: Vec<Repository>) -> Self {
        *self.repos.lock().await = repos;
        self
    }

    pub async fn with_releases(self, repo: &str, releases: Vec<Release>) -> Self {
        self.releases.lock().await.insert(repo.to_string(), releases);
        self
    }

    /// Configure the comparison returned for any base/head of `repo`.
    pub async fn with_comparison(self, repo: &str, comparison: Comparison) -> Self {
        self.comparisons
            .lock()
            .await
            .insert(repo.to_string(), comparison);
        self
    }

    pub async fn with_alerts(self, repo: &str, alerts: Vec<DependabotAlert>) -> Self {
        self.alerts.lock().await.insert(repo.to_string(), alerts);
        self
    }

    pub async fn with_pulls(self, repo: &str, pulls: Vec<PullRequest>) -> Self {
        self.pulls.lock().await.insert(repo.to_string(), pulls);
        self
    }

    pub async fn with_reviews(self, repo: &str, number: u64, reviews: Vec<Review>) -> Self {
        self.reviews
            .lock()
            .await
            .insert((repo.to_string(), number), reviews);
        self
    }

    pub async fn with_rulesets(self, repo: &str, rulesets: Vec<Ruleset>) -> Self {
        self.rulesets.lock().await.insert(repo.to_string(), rulesets);
        self
    }

    pub async fn with_vulnerability_alerts(self, repo: &str) -> Self {
        self.vulnerability_alerts.lock().await.push(repo.to_string());
        self
    }

    /// Make `method` fail for `repo` on every call.
    pub async fn with_failure(self, method: &'static str, repo: &str, error: ApiError) -> Self {
        self.failures
            .lock()
            .await
            .insert((method, repo.to_string()), error);
        self
    }

    /// Configure an error to return on the next API call.
    pub async fn with_error(self, error: ApiError) -> Self {
        *self.error.lock().await = Some(error);
        self
    }

    /// Get the call counts for verification in tests.
    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    /// Writes recorded so far
    pub async fn recorded(&self) -> RecordedWrites {
        self.recorded.lock().await.clone()
    }

    /// Check the one-shot error and any per-repository failure.
    async fn check_error(&self, method: &'static str, repo: &str) -> Result<()> {
        if let Some(e) = self.error.lock().await.take() {
            return Err(e.into());
        }

        let failures = self.failures.lock().await;
        if let Some(e) = failures.get(&(method, repo.to_string())) {
            return Err(e.clone().into());
        }

        Ok(())
    }

    async fn find_repo(&self, repo: &RepoRef) -> Result<Repository> {
        let key = repo.to_string();
        self.repos
            .lock()
            .await
            .iter()
            .find(|r| r.full_name.eq_ignore_ascii_case(&key))
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("repos/{key}")).into())
    }
}

#[async_trait]
impl GitHubApi for MockGitHubClient {
    async fn current_user(&self) -> Result<SimpleUser> {
        self.check_error("current_user", "").await?;
        self.call_count.lock().await.current_user += 1;
        Ok(SimpleUser::new(self.user.lock().await.clone()))
    }

    async fn list_org_repos(&self, org: &str) -> Result<Vec<Repository>> {
        self.check_error("list_org_repos", org).await?;
        self.call_count.lock().await.list_org_repos += 1;

        Ok(self
            .repos
            .lock()
            .await
            .iter()
            .filter(|r| r.owner.login.eq_ignore_ascii_case(org))
            .cloned()
            .collect())
    }

    async fn get_repo(&self, repo: &RepoRef) -> Result<Repository> {
        self.check_error("get_repo", &repo.to_string()).await?;
        self.call_count.lock().await.get_repo += 1;
        self.find_repo(repo).await
    }

    async fn update_repo(&self, repo: &RepoRef, patch: &RepoSettingsPatch) -> Result<Repository> {
        let key = repo.to_string();
        self.check_error("update_repo", &key).await?;
        self.recorded
            .lock()
            .await
            .patches
            .push((key.clone(), patch.clone()));

        let mut repos = self.repos.lock().await;
        let stored = repos
            .iter_mut()
            .find(|r| r.full_name.eq_ignore_ascii_case(&key))
            .ok_or_else(|| ApiError::NotFound(format!("repos/{key}")))?;
        if let Some(v) = patch.allow_auto_merge {
            stored.allow_auto_merge = Some(v);
        }
        if let Some(v) = patch.delete_branch_on_merge {
            stored.delete_branch_on_merge = Some(v);
        }
        Ok(stored.clone())
    }

    async fn vulnerability_alerts_enabled(&self, repo: &RepoRef) -> Result<bool> {
        let key = repo.to_string();
        self.check_error("vulnerability_alerts_enabled", &key).await?;
        self.call_count.lock().await.vulnerability_alerts_enabled += 1;
        Ok(self.vulnerability_alerts.lock().await.contains(&key))
    }

    async fn enable_vulnerability_alerts(&self, repo: &RepoRef) -> Result<()> {
        let key = repo.to_string();
        self.check_error("enable_vulnerability_alerts", &key).await?;
        self.recorded.lock().await.enabled_alerts.push(key.clone());
        self.vulnerability_alerts.lock().await.push(key);
        Ok(())
    }

    async fn list_rulesets(&self, repo: &RepoRef) -> Result<Vec<Ruleset>> {
        let key = repo.to_string();
        self.check_error("list_rulesets", &key).await?;
        self.call_count.lock().await.list_rulesets += 1;
        Ok(self
            .rulesets
            .lock()
            .await
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_ruleset(&self, repo: &RepoRef, ruleset: &NewRuleset) -> Result<Ruleset> {
        let key = repo.to_string();
        self.check_error("create_ruleset", &key).await?;
        self.recorded
            .lock()
            .await
            .rulesets
            .push((key.clone(), ruleset.clone()));

        let mut rulesets = self.rulesets.lock().await;
        let entry = rulesets.entry(key).or_default();
        let created = Ruleset {
            id: entry.len() as u64 + 1,
            name: ruleset.name.clone(),
            target: Some(ruleset.target.clone()),
            enforcement: ruleset.enforcement.clone(),
        };
        entry.push(created.clone());
        Ok(created)
    }

    async fn list_releases(&self, repo: &RepoRef) -> Result<Vec<Release>> {
        let key = repo.to_string();
        self.check_error("list_releases", &key).await?;
        self.call_count.lock().await.list_releases += 1;
        Ok(self
            .releases
            .lock()
            .await
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }

    async fn latest_release(&self, repo: &RepoRef) -> Result<Option<Release>> {
        let key = repo.to_string();
        self.check_error("latest_release", &key).await?;
        self.call_count.lock().await.latest_release += 1;

        let releases = self.releases.lock().await;
        Ok(releases.get(&key).and_then(|list| {
            list.iter()
                .filter(|r| !r.draft && !r.prerelease)
                .max_by_key(|r| r.published_at)
                .cloned()
        }))
    }

    async fn compare(&self, repo: &RepoRef, _base: &str, _head: &str) -> Result<Comparison> {
        let key = repo.to_string();
        self.check_error("compare", &key).await?;
        self.call_count.lock().await.compare += 1;
        self.comparisons
            .lock()
            .await
            .get(&key)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("repos/{key}/compare")).into())
    }

    async fn list_open_alerts(&self, repo: &RepoRef) -> Result<Vec<DependabotAlert>> {
        let key = repo.to_string();
        self.check_error("list_open_alerts", &key).await?;
        self.call_count.lock().await.list_open_alerts += 1;

        let alerts = self.alerts.lock().await;
        Ok(alerts
            .get(&key)
            .map(|list| list.iter().filter(|a| a.is_open()).cloned().collect())
            .unwrap_or_default())
    }

    async fn list_pulls(&self, repo: &RepoRef, query: &PullQuery) -> Result<Vec<PullRequest>> {
        let key = repo.to_string();
        self.check_error("list_pulls", &key).await?;
        self.call_count.lock().await.list_pulls += 1;

        let mut pulls: Vec<PullRequest> = self
            .pulls
            .lock()
            .await
            .get(&key)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|pr| match query.state {
                PullState::Open => pr.closed_at.is_none(),
                PullState::Closed => pr.closed_at.is_some(),
                PullState::All => true,
            })
            .collect();

        // Same ordering and early stop as the HTTP client
        pulls.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(since) = query.since {
            pulls.retain(|pr| pr.created_at >= since);
        }
        if let Some(limit) = query.limit {
            pulls.truncate(limit);
        }
        Ok(pulls)
    }

    async fn list_reviews(&self, repo: &RepoRef, number: u64) -> Result<Vec<Review>> {
        let key = repo.to_string();
        self.check_error("list_reviews", &key).await?;
        self.call_count.lock().await.list_reviews += 1;
        Ok(self
            .reviews
            .lock()
            .await
            .get(&(key, number))
            .cloned()
            .unwrap_or_default())
    }

    async fn submit_review(&self, repo: &RepoRef, number: u64, event: ReviewEvent) -> Result<()> {
        let key = repo.to_string();
        self.check_error("submit_review", &key).await?;
        self.recorded.lock().await.reviews.push((key, number, event));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures::*;

    #[tokio::test]
    async fn test_mock_client_default_empty() {
        let mock = MockGitHubClient::new();
        assert!(mock.list_org_repos("acme").await.unwrap().is_empty());
        assert_eq!(mock.current_user().await.unwrap().login, "octocat");
    }

    #[tokio::test]
    async fn test_mock_client_get_repo_not_found() {
        let mock = MockGitHubClient::new()
            .with_repos(vec![test_repo("web")])
            .await;

        assert!(mock.get_repo(&RepoRef::new("acme", "web")).await.is_ok());
        let err = mock
            .get_repo(&RepoRef::new("acme", "nope"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_mock_client_with_error_is_consumed() {
        let mock = MockGitHubClient::new()
            .with_error(ApiError::Unauthorized)
            .await;

        assert!(mock.current_user().await.is_err());
        assert!(mock.current_user().await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_client_per_repo_failure() {
        let mock = MockGitHubClient::new()
            .with_failure(
                "list_open_alerts",
                "acme/api",
                ApiError::Forbidden("disabled".to_string()),
            )
            .await;

        assert!(mock
            .list_open_alerts(&RepoRef::new("acme", "api"))
            .await
            .is_err());
        assert!(mock
            .list_open_alerts(&RepoRef::new("acme", "web"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_mock_client_list_pulls_query() {
        let mock = MockGitHubClient::new()
            .with_pulls(
                "acme/web",
                vec![
                    PullRequestBuilder::new(1, "a", "2024-01-01T00:00:00Z").build(),
                    PullRequestBuilder::new(2, "a", "2024-03-01T00:00:00Z")
                        .merged_at("2024-03-02T00:00:00Z")
                        .build(),
                    PullRequestBuilder::new(3, "b", "2024-02-01T00:00:00Z").build(),
                ],
            )
            .await;
        let repo = RepoRef::new("acme", "web");

        let open = mock.list_pulls(&repo, &PullQuery::open()).await.unwrap();
        assert_eq!(open.iter().map(|p| p.number).collect::<Vec<_>>(), vec![3, 1]);

        let recent = mock
            .list_pulls(&repo, &PullQuery::all_since(ts("2024-01-15T00:00:00Z")))
            .await
            .unwrap();
        assert_eq!(recent.iter().map(|p| p.number).collect::<Vec<_>>(), vec![2, 3]);

        assert_eq!(mock.call_counts().await.list_pulls, 2);
    }

    #[tokio::test]
    async fn test_mock_client_records_writes() {
        let mock = MockGitHubClient::new()
            .with_repos(vec![test_repo("web")])
            .await;
        let repo = RepoRef::new("acme", "web");

        let patch = RepoSettingsPatch {
            allow_auto_merge: Some(true),
            ..Default::default()
        };
        let updated = mock.update_repo(&repo, &patch).await.unwrap();
        assert_eq!(updated.allow_auto_merge, Some(true));

        mock.submit_review(&repo, 7, ReviewEvent::Approve)
            .await
            .unwrap();

        let recorded = mock.recorded().await;
        assert_eq!(recorded.patches.len(), 1);
        assert_eq!(
            recorded.reviews,
            vec![("acme/web".to_string(), 7, ReviewEvent::Approve)]
        );
    }
}
