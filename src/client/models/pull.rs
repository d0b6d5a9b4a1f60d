//! Pull request and review models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SimpleUser;

/// Pull request from `/repos/{owner}/{repo}/pulls`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,

    pub title: String,

    /// Null when the author account was deleted
    #[serde(default)]
    pub user: Option<SimpleUser>,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub html_url: String,

    #[serde(default)]
    pub draft: bool,

    #[serde(default)]
    pub assignees: Vec<SimpleUser>,

    #[serde(default)]
    pub requested_reviewers: Vec<SimpleUser>,

    #[serde(default)]
    pub state: String,
}

impl PullRequest {
    /// Author login, `ghost` for deleted accounts like the GitHub UI shows
    pub fn author(&self) -> &str {
        self.user.as_ref().map(|u| u.login.as_str()).unwrap_or("ghost")
    }

    pub fn is_assigned_to(&self, login: &str) -> bool {
        self.assignees
            .iter()
            .any(|u| u.login.eq_ignore_ascii_case(login))
    }

    pub fn is_review_requested_from(&self, login: &str) -> bool {
        self.requested_reviewers
            .iter()
            .any(|u| u.login.eq_ignore_ascii_case(login))
    }
}

/// Review from `/repos/{owner}/{repo}/pulls/{number}/reviews`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,

    #[serde(default)]
    pub user: Option<SimpleUser>,

    pub state: ReviewState,

    /// Absent while the review is still pending
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Review {
    pub fn reviewer(&self) -> &str {
        self.user.as_ref().map(|u| u.login.as_str()).unwrap_or("ghost")
    }
}

/// Review decision state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
}

/// Event submitted when creating a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewEvent {
    Approve,
    RequestChanges,
    Comment,
}

/// `state` query parameter of the pull request listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PullState {
    #[default]
    Open,
    Closed,
    All,
}

impl PullState {
    pub fn as_str(self) -> &'static str {
        match self {
            PullState::Open => "open",
            PullState::Closed => "closed",
            PullState::All => "all",
        }
    }
}

/// Listing options for pull requests.
///
/// Results come newest-created first. `since` stops pagination at the first
/// pull request created before it; `limit` caps the number returned.
#[derive(Debug, Clone, Default)]
pub struct PullQuery {
    pub state: PullState,
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl PullQuery {
    pub fn open() -> Self {
        Self::default()
    }

    pub fn all_since(since: DateTime<Utc>) -> Self {
        Self {
            state: PullState::All,
            since: Some(since),
            limit: None,
        }
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}
