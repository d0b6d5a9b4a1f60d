//! Repository models

use serde::{Deserialize, Serialize};
use std::fmt;

use super::SimpleUser;
use crate::error::{Error, Result};

/// Repository as returned by `/orgs/{org}/repos` and `/repos/{owner}/{repo}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// Repository name without owner
    pub name: String,

    /// `owner/name`
    pub full_name: String,

    /// Owning account
    pub owner: SimpleUser,

    /// Archived repositories are read-only
    #[serde(default)]
    pub archived: bool,

    /// Default branch name
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// Whether auto-merge may be enabled on pull requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_auto_merge: Option<bool>,

    /// Whether head branches are deleted after merge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_branch_on_merge: Option<bool>,

    /// Private repository flag
    #[serde(default)]
    pub private: bool,

    /// Web URL
    #[serde(default)]
    pub html_url: String,
}

fn default_branch() -> String {
    "main".to_string()
}

impl Repository {
    /// Owner/name pair for API paths
    pub fn repo_ref(&self) -> RepoRef {
        RepoRef::new(&self.owner.login, &self.name)
    }
}

/// Owner/name pair identifying a repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse `repo` or `owner/repo`, filling in `default_owner` for the short form.
    pub fn parse(spec: &str, default_owner: &str) -> Result<Self> {
        let spec = spec.trim();
        let (owner, name) = match spec.split_once('/') {
            Some((owner, name)) => (owner, name),
            None => (default_owner, spec),
        };

        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(Error::Usage(format!("invalid repository name: '{spec}'")));
        }

        Ok(Self::new(owner, name))
    }

    /// `/repos/{owner}/{name}` path prefix
    pub fn api_path(&self) -> String {
        format!("/repos/{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Body for `PATCH /repos/{owner}/{repo}`; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RepoSettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_auto_merge: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_branch_on_merge: Option<bool>,
}
