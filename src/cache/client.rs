//! Caching decorator for any `GitHubApi`
//!
//! Reads are looked up in `CacheStorage` first; writes always go to the API
//! and invalidate the reads they affect.

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use crate::cache::{CacheStorage, CacheTtl, cache_key};
use crate::client::{
    Comparison, DependabotAlert, GitHubApi, NewRuleset, PullQuery, PullRequest, Release, RepoRef,
    RepoSettingsPatch, Repository, Review, ReviewEvent, Ruleset, SimpleUser,
};
use crate::error::Result;

/// Cached wrapper for any GitHubApi implementation.
///
/// With `enabled == false` (or when the store cannot be opened) every call
/// goes straight to the inner client.
pub struct CachedGitHubClient<C: GitHubApi> {
    inner: C,
    cache: Option<Mutex<CacheStorage>>,
}

impl<C: GitHubApi> CachedGitHubClient<C> {
    pub fn new(inner: C, enabled: bool) -> Self {
        let cache = if enabled {
            match CacheStorage::open() {
                Ok(storage) => Some(Mutex::new(storage)),
                Err(e) => {
                    log::warn!("Response cache unavailable: {}", e);
                    None
                }
            }
        } else {
            None
        };
        Self { inner, cache }
    }

    /// Wrap `inner` with an already opened store
    #[cfg(test)]
    pub fn with_storage(inner: C, storage: CacheStorage) -> Self {
        Self {
            inner,
            cache: Some(Mutex::new(storage)),
        }
    }

    #[cfg(test)]
    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }

    fn get_cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let cache = self.cache.as_ref()?;
        let guard = cache.lock().ok()?;
        guard
            .get(key)
            .ok()
            .flatten()
            .and_then(|data| serde_json::from_slice(&data).ok())
    }

    fn set_cached<T: Serialize>(
        &self,
        key: &str,
        data: &T,
        endpoint: &str,
        scope: Option<&str>,
        ttl: Duration,
    ) {
        if let Some(ref cache) = self.cache
            && let Ok(guard) = cache.lock()
            && let Ok(json) = serde_json::to_vec(data)
            && let Err(e) = guard.put(key, &json, endpoint, scope, ttl)
        {
            log::debug!("Cache write for {} failed: {}", endpoint, e);
        }
    }

    fn invalidate(&self, endpoint: &str, scope: Option<&str>) {
        if let Some(ref cache) = self.cache
            && let Ok(guard) = cache.lock()
            && let Err(e) = guard.invalidate(endpoint, scope)
        {
            log::debug!("Cache invalidation for {} failed: {}", endpoint, e);
        }
    }

    /// Serve from cache or run `fetch` and remember its result
    async fn read_through<T, F, Fut>(
        &self,
        endpoint: &str,
        scope: Option<&str>,
        params: &[(&str, &str)],
        ttl: Duration,
        fetch: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
    {
        if self.cache.is_none() {
            return fetch().await;
        }

        let key = cache_key(endpoint, scope, params);
        if let Some(cached) = self.get_cached(&key) {
            log::debug!("Cache hit: {} {}", endpoint, scope.unwrap_or(""));
            return Ok(cached);
        }

        let result = fetch().await?;
        self.set_cached(&key, &result, endpoint, scope, ttl);
        Ok(result)
    }
}

#[async_trait]
impl<C: GitHubApi> GitHubApi for CachedGitHubClient<C> {
    async fn current_user(&self) -> Result<SimpleUser> {
        self.read_through("current_user", None, &[], CacheTtl::USER, || {
            self.inner.current_user()
        })
        .await
    }

    async fn list_org_repos(&self, org: &str) -> Result<Vec<Repository>> {
        self.read_through("list_org_repos", Some(org), &[], CacheTtl::REPOS, || {
            self.inner.list_org_repos(org)
        })
        .await
    }

    async fn get_repo(&self, repo: &RepoRef) -> Result<Repository> {
        let scope = repo.to_string();
        self.read_through("get_repo", Some(&scope), &[], CacheTtl::REPOS, || {
            self.inner.get_repo(repo)
        })
        .await
    }

    async fn update_repo(&self, repo: &RepoRef, patch: &RepoSettingsPatch) -> Result<Repository> {
        let updated = self.inner.update_repo(repo, patch).await?;
        self.invalidate("get_repo", Some(&repo.to_string()));
        self.invalidate("list_org_repos", Some(&repo.owner));
        Ok(updated)
    }

    // Settings state is checked right before writing it, so never cached
    async fn vulnerability_alerts_enabled(&self, repo: &RepoRef) -> Result<bool> {
        self.inner.vulnerability_alerts_enabled(repo).await
    }

    async fn enable_vulnerability_alerts(&self, repo: &RepoRef) -> Result<()> {
        self.inner.enable_vulnerability_alerts(repo).await
    }

    async fn list_rulesets(&self, repo: &RepoRef) -> Result<Vec<Ruleset>> {
        self.inner.list_rulesets(repo).await
    }

    async fn create_ruleset(&self, repo: &RepoRef, ruleset: &NewRuleset) -> Result<Ruleset> {
        self.inner.create_ruleset(repo, ruleset).await
    }

    async fn list_releases(&self, repo: &RepoRef) -> Result<Vec<Release>> {
        let scope = repo.to_string();
        self.read_through("list_releases", Some(&scope), &[], CacheTtl::RELEASES, || {
            self.inner.list_releases(repo)
        })
        .await
    }

    async fn latest_release(&self, repo: &RepoRef) -> Result<Option<Release>> {
        let scope = repo.to_string();
        self.read_through("latest_release", Some(&scope), &[], CacheTtl::RELEASES, || {
            self.inner.latest_release(repo)
        })
        .await
    }

    async fn compare(&self, repo: &RepoRef, base: &str, head: &str) -> Result<Comparison> {
        let scope = repo.to_string();
        self.read_through(
            "compare",
            Some(&scope),
            &[("base", base), ("head", head)],
            CacheTtl::COMPARE,
            || self.inner.compare(repo, base, head),
        )
        .await
    }

    async fn list_open_alerts(&self, repo: &RepoRef) -> Result<Vec<DependabotAlert>> {
        let scope = repo.to_string();
        self.read_through("list_open_alerts", Some(&scope), &[], CacheTtl::ALERTS, || {
            self.inner.list_open_alerts(repo)
        })
        .await
    }

    async fn list_pulls(&self, repo: &RepoRef, query: &PullQuery) -> Result<Vec<PullRequest>> {
        let scope = repo.to_string();
        let since = query.since.map(|s| s.to_rfc3339()).unwrap_or_default();
        let limit = query.limit.map(|l| l.to_string()).unwrap_or_default();
        let params = [
            ("state", query.state.as_str()),
            ("since", since.as_str()),
            ("limit", limit.as_str()),
        ];

        self.read_through("list_pulls", Some(&scope), &params, CacheTtl::PULLS, || {
            self.inner.list_pulls(repo, query)
        })
        .await
    }

    async fn list_reviews(&self, repo: &RepoRef, number: u64) -> Result<Vec<Review>> {
        let scope = repo.to_string();
        let number_str = number.to_string();
        self.read_through(
            "list_reviews",
            Some(&scope),
            &[("number", number_str.as_str())],
            CacheTtl::REVIEWS,
            || self.inner.list_reviews(repo, number),
        )
        .await
    }

    async fn submit_review(&self, repo: &RepoRef, number: u64, event: ReviewEvent) -> Result<()> {
        self.inner.submit_review(repo, number, event).await?;
        self.invalidate("list_reviews", Some(&repo.to_string()));
        Ok(())
    }
}
