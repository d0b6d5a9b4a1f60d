//! Branch comparison models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SimpleUser;

/// Result of `/repos/{owner}/{repo}/compare/{base}...{head}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    /// ahead, behind, diverged or identical
    pub status: String,

    pub ahead_by: u64,

    pub behind_by: u64,

    #[serde(default)]
    pub total_commits: u64,

    /// Oldest first, as GitHub returns them
    #[serde(default)]
    pub commits: Vec<CommitEntry>,
}

/// Commit in a comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitEntry {
    pub sha: String,

    pub commit: CommitDetail,

    /// Linked GitHub account, absent for unknown emails
    #[serde(default)]
    pub author: Option<SimpleUser>,
}

/// Git-level commit data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetail {
    pub message: String,

    #[serde(default)]
    pub author: Option<GitActor>,
}

/// Git author or committer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitActor {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl CommitEntry {
    /// GitHub login when linked, otherwise the git author name
    pub fn author_name(&self) -> &str {
        if let Some(user) = &self.author {
            return &user.login;
        }
        self.commit
            .author
            .as_ref()
            .map(|a| a.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("unknown")
    }

    /// First line of the commit message
    pub fn subject(&self) -> &str {
        self.commit.message.lines().next().unwrap_or("").trim()
    }
}
