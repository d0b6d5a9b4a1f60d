//! GitHub REST API client implementation

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, LINK};
use reqwest::{Client as HttpClient, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::pagination::{PaginationParams, SortOrder, next_page_url};
use super::{
    Comparison, DependabotAlert, GitHubApi, NewRuleset, PullQuery, PullRequest, Release, RepoRef,
    RepoSettingsPatch, Repository, Review, ReviewEvent, Ruleset, SimpleUser,
};
use crate::error::{ApiError, Result};

/// Client-side pacing; GitHub's own quota is 5000 requests per hour
const RATE_LIMIT_PER_SECOND: u32 = 10;

/// REST API version pinned through `X-GitHub-Api-Version`
const API_VERSION: &str = "2022-11-28";

/// GitHub REST API client
pub struct GitHubClient {
    http: HttpClient,
    base_url: String,
    token: String,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl GitHubClient {
    /// Create a client for `base_url` (e.g. `https://api.github.com`)
    pub fn new(token: String, base_url: &str) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("ghops/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota = Quota::per_second(
            NonZeroU32::new(RATE_LIMIT_PER_SECOND).unwrap_or(NonZeroU32::MIN),
        );

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Absolute URL for an API path; `Link` targets are already absolute
    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// Send an authenticated request and map error statuses
    async fn send<B: Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        url: &str,
        query: &[(&'static str, String)],
        body: Option<&B>,
    ) -> Result<Response> {
        self.rate_limiter.until_ready().await;

        debug!("{} {}", method, url);
        let mut request = self
            .http
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ApiError::from)?;
        check_status(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .send(Method::GET, &self.url(path), &[], None::<&()>)
            .await?;
        parse_json(response).await
    }

    /// GET that treats 404 as absence
    async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        match self.get_json(path).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.send(method, &self.url(path), &[], Some(body)).await?;
        parse_json(response).await
    }

    /// Fetch every page of a list endpoint.
    ///
    /// Stops early at the first item `keep` rejects or once `limit` items
    /// have been collected.
    async fn paginate<T, F>(
        &self,
        path: &str,
        params: &PaginationParams,
        limit: Option<usize>,
        mut keep: F,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
        F: FnMut(&T) -> bool + Send,
    {
        let mut items = Vec::new();
        let mut query = params.to_query_params();
        let mut next = Some(self.url(path));

        while let Some(url) = next.take() {
            let response = self.send(Method::GET, &url, &query, None::<&()>).await?;
            // The next link carries its own query string
            query.clear();

            next = response
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_page_url);

            let page: Vec<T> = parse_json(response).await?;
            debug!("Page from {} returned {} items", url, page.len());

            for item in page {
                if !keep(&item) {
                    debug!("Stopping pagination early at {}", url);
                    return Ok(items);
                }
                items.push(item);
                if limit.is_some_and(|limit| items.len() >= limit) {
                    return Ok(items);
                }
            }
        }

        Ok(items)
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)).into())
}

/// Map non-2xx responses to `ApiError`
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let path = response.url().path().trim_start_matches('/').to_string();

    match status {
        StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized.into()),
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
            if let Some(wait) = rate_limit_wait(response.headers(), status) {
                return Err(ApiError::RateLimit(wait).into());
            }
            Err(ApiError::Forbidden(error_message(response).await).into())
        }
        StatusCode::NOT_FOUND => Err(ApiError::NotFound(path).into()),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            Err(ApiError::BadRequest(error_message(response).await).into())
        }
        StatusCode::CONFLICT => Err(ApiError::Conflict(error_message(response).await).into()),
        status if status.is_server_error() => {
            Err(ApiError::ServerError(error_message(response).await).into())
        }
        _ => {
            let error_msg = format!("Unexpected status code: {}", status);
            Err(ApiError::InvalidResponse(error_msg).into())
        }
    }
}

/// How long to wait when a 403/429 is a rate limit rather than a permission problem
fn rate_limit_wait(headers: &HeaderMap, status: StatusCode) -> Option<Duration> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    if let Some(secs) = header("retry-after").and_then(|v| v.parse::<u64>().ok()) {
        return Some(Duration::from_secs(secs));
    }

    if header("x-ratelimit-remaining") == Some("0") {
        let reset = header("x-ratelimit-reset")
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0);
        let wait = (reset - Utc::now().timestamp()).max(0) as u64;
        return Some(Duration::from_secs(wait));
    }

    (status == StatusCode::TOO_MANY_REQUESTS).then(|| Duration::from_secs(60))
}

/// GitHub error bodies look like `{"message": "...", "documentation_url": "..."}`
async fn error_message(response: Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .or_else(|| (!text.trim().is_empty()).then(|| text.trim().to_string()))
        .unwrap_or_else(|| status.to_string())
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn current_user(&self) -> Result<SimpleUser> {
        self.get_json("/user").await
    }

    async fn list_org_repos(&self, org: &str) -> Result<Vec<Repository>> {
        let params = PaginationParams::new()
            .sort_by("full_name")
            .sort_order(SortOrder::Asc)
            .filter("type", "all");

        match self
            .paginate(&format!("/orgs/{}/repos", org), &params, None, |_| true)
            .await
        {
            Err(err) if err.is_not_found() => {
                // Personal accounts have no /orgs endpoint
                debug!("{} is not an organization, listing user repositories", org);
                let params = PaginationParams::new().filter("type", "owner");
                self.paginate(&format!("/users/{}/repos", org), &params, None, |_| true)
                    .await
            }
            other => other,
        }
    }

    async fn get_repo(&self, repo: &RepoRef) -> Result<Repository> {
        self.get_json(&repo.api_path()).await
    }

    async fn update_repo(&self, repo: &RepoRef, patch: &RepoSettingsPatch) -> Result<Repository> {
        self.send_json(Method::PATCH, &repo.api_path(), patch).await
    }

    async fn vulnerability_alerts_enabled(&self, repo: &RepoRef) -> Result<bool> {
        let url = self.url(&format!("{}/vulnerability-alerts", repo.api_path()));
        match self.send(Method::GET, &url, &[], None::<&()>).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn enable_vulnerability_alerts(&self, repo: &RepoRef) -> Result<()> {
        let url = self.url(&format!("{}/vulnerability-alerts", repo.api_path()));
        self.send(Method::PUT, &url, &[], None::<&()>).await?;
        Ok(())
    }

    async fn list_rulesets(&self, repo: &RepoRef) -> Result<Vec<Ruleset>> {
        let path = format!("{}/rulesets", repo.api_path());
        self.paginate(&path, &PaginationParams::new(), None, |_| true)
            .await
    }

    async fn create_ruleset(&self, repo: &RepoRef, ruleset: &NewRuleset) -> Result<Ruleset> {
        let path = format!("{}/rulesets", repo.api_path());
        self.send_json(Method::POST, &path, ruleset).await
    }

    async fn list_releases(&self, repo: &RepoRef) -> Result<Vec<Release>> {
        let path = format!("{}/releases", repo.api_path());
        self.paginate(&path, &PaginationParams::new(), None, |_| true)
            .await
    }

    async fn latest_release(&self, repo: &RepoRef) -> Result<Option<Release>> {
        self.get_optional(&format!("{}/releases/latest", repo.api_path()))
            .await
    }

    async fn compare(&self, repo: &RepoRef, base: &str, head: &str) -> Result<Comparison> {
        self.get_json(&format!("{}/compare/{}...{}", repo.api_path(), base, head))
            .await
    }

    async fn list_open_alerts(&self, repo: &RepoRef) -> Result<Vec<DependabotAlert>> {
        let path = format!("{}/dependabot/alerts", repo.api_path());
        let params = PaginationParams::new().filter("state", "open");
        self.paginate(&path, &params, None, |_| true).await
    }

    async fn list_pulls(&self, repo: &RepoRef, query: &PullQuery) -> Result<Vec<PullRequest>> {
        let path = format!("{}/pulls", repo.api_path());
        let params = PaginationParams::new()
            .sort_by("created")
            .sort_order(SortOrder::Desc)
            .filter("state", query.state.as_str());

        let since = query.since;
        self.paginate(&path, &params, query.limit, move |pr: &PullRequest| {
            since.is_none_or(|since| pr.created_at >= since)
        })
        .await
    }

    async fn list_reviews(&self, repo: &RepoRef, number: u64) -> Result<Vec<Review>> {
        let path = format!("{}/pulls/{}/reviews", repo.api_path(), number);
        self.paginate(&path, &PaginationParams::new(), None, |_| true)
            .await
    }

    async fn submit_review(&self, repo: &RepoRef, number: u64, event: ReviewEvent) -> Result<()> {
        let path = format!("{}/pulls/{}/reviews", repo.api_path(), number);
        let body = serde_json::json!({ "event": event });
        let _: serde_json::Value = self.send_json(Method::POST, &path, &body).await?;
        Ok(())
    }
}
