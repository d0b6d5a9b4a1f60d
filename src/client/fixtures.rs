//! Test fixtures and builders for API model types
//!
//! Import via `use crate::client::fixtures::*` in test modules.

#![allow(dead_code)]

use chrono::{DateTime, Utc};

use super::models::{
    AlertDependency, AlertPackage, CommitDetail, CommitEntry, Comparison, DependabotAlert,
    GitActor, PullRequest, Release, Repository, Review, ReviewState, SecurityAdvisory, Severity,
    SimpleUser,
};

/// Parse an RFC 3339 timestamp
pub fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid RFC 3339 timestamp")
        .with_timezone(&Utc)
}

// ============================================================================
// RepositoryBuilder
// ============================================================================

/// Builder for test Repository instances owned by `acme`.
///
/// # Example
/// ```ignore
/// let repo = RepositoryBuilder::new("widgets").archived().build();
/// ```
#[derive(Debug, Clone)]
pub struct RepositoryBuilder {
    owner: String,
    name: String,
    archived: bool,
    default_branch: String,
    allow_auto_merge: Option<bool>,
    delete_branch_on_merge: Option<bool>,
}

impl RepositoryBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            owner: "acme".to_string(),
            name: name.into(),
            archived: false,
            default_branch: "main".to_string(),
            allow_auto_merge: Some(false),
            delete_branch_on_merge: Some(false),
        }
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    pub fn archived(mut self) -> Self {
        self.archived = true;
        self
    }

    pub fn default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = branch.into();
        self
    }

    pub fn auto_merge(mut self, enabled: bool) -> Self {
        self.allow_auto_merge = Some(enabled);
        self
    }

    pub fn auto_delete(mut self, enabled: bool) -> Self {
        self.delete_branch_on_merge = Some(enabled);
        self
    }

    pub fn build(self) -> Repository {
        Repository {
            full_name: format!("{}/{}", self.owner, self.name),
            html_url: format!("https://github.com/{}/{}", self.owner, self.name),
            owner: SimpleUser::new(self.owner),
            name: self.name,
            archived: self.archived,
            default_branch: self.default_branch,
            allow_auto_merge: self.allow_auto_merge,
            delete_branch_on_merge: self.delete_branch_on_merge,
            private: false,
        }
    }
}

/// Active repository with defaults
pub fn test_repo(name: &str) -> Repository {
    RepositoryBuilder::new(name).build()
}

// ============================================================================
// PullRequestBuilder
// ============================================================================

/// Builder for test PullRequest instances.
#[derive(Debug, Clone)]
pub struct PullRequestBuilder {
    pr: PullRequest,
}

impl PullRequestBuilder {
    pub fn new(number: u64, author: &str, created_at: &str) -> Self {
        Self {
            pr: PullRequest {
                number,
                title: format!("Change #{number}"),
                user: Some(SimpleUser::new(author)),
                created_at: ts(created_at),
                merged_at: None,
                closed_at: None,
                html_url: format!("https://github.com/acme/repo/pull/{number}"),
                draft: false,
                assignees: Vec::new(),
                requested_reviewers: Vec::new(),
                state: "open".to_string(),
            },
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.pr.title = title.to_string();
        self
    }

    pub fn draft(mut self) -> Self {
        self.pr.draft = true;
        self
    }

    pub fn merged_at(mut self, at: &str) -> Self {
        self.pr.merged_at = Some(ts(at));
        self.pr.closed_at = Some(ts(at));
        self.pr.state = "closed".to_string();
        self
    }

    pub fn closed_at(mut self, at: &str) -> Self {
        self.pr.closed_at = Some(ts(at));
        self.pr.state = "closed".to_string();
        self
    }

    pub fn assignee(mut self, login: &str) -> Self {
        self.pr.assignees.push(SimpleUser::new(login));
        self
    }

    pub fn reviewer(mut self, login: &str) -> Self {
        self.pr.requested_reviewers.push(SimpleUser::new(login));
        self
    }

    pub fn build(self) -> PullRequest {
        self.pr
    }
}

/// Submitted review
pub fn review(id: u64, reviewer: &str, state: ReviewState, submitted_at: &str) -> Review {
    Review {
        id,
        user: Some(SimpleUser::new(reviewer)),
        state,
        submitted_at: Some(ts(submitted_at)),
    }
}

/// Open Dependabot alert
pub fn alert(number: u64, package: &str, severity: Severity, published_at: &str) -> DependabotAlert {
    DependabotAlert {
        number,
        state: "open".to_string(),
        dependency: AlertDependency {
            package: Some(AlertPackage {
                ecosystem: "npm".to_string(),
                name: package.to_string(),
            }),
            manifest_path: Some("package-lock.json".to_string()),
        },
        security_advisory: SecurityAdvisory {
            ghsa_id: format!("GHSA-test-{number:04}"),
            cve_id: None,
            summary: format!("Vulnerability in {package}"),
            severity,
            published_at: ts(published_at),
        },
        html_url: format!("https://github.com/acme/repo/security/dependabot/{number}"),
        created_at: ts(published_at),
    }
}

/// Published release
pub fn release(tag: &str, published_at: &str) -> Release {
    Release {
        tag_name: tag.to_string(),
        name: Some(format!("Release {tag}")),
        body: Some(format!("Notes for {tag}")),
        draft: false,
        prerelease: false,
        published_at: Some(ts(published_at)),
        html_url: format!("https://github.com/acme/repo/releases/tag/{tag}"),
    }
}

/// Draft release without a publish date
pub fn draft_release(tag: &str) -> Release {
    Release {
        draft: true,
        published_at: None,
        ..release(tag, "2000-01-01T00:00:00Z")
    }
}

/// Commit inside a comparison
pub fn commit(sha: &str, message: &str, author: &str, date: &str) -> CommitEntry {
    CommitEntry {
        sha: sha.to_string(),
        commit: CommitDetail {
            message: message.to_string(),
            author: Some(GitActor {
                name: author.to_string(),
                date: Some(ts(date)),
            }),
        },
        author: Some(SimpleUser::new(author)),
    }
}

/// Comparison where head is `commits.len()` commits ahead of base
pub fn ahead_comparison(commits: Vec<CommitEntry>) -> Comparison {
    let ahead = commits.len() as u64;
    Comparison {
        status: if ahead > 0 { "ahead" } else { "identical" }.to_string(),
        ahead_by: ahead,
        behind_by: 0,
        total_commits: ahead,
        commits,
    }
}
