//! Release models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Release from `/repos/{owner}/{repo}/releases`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    /// Git tag the release points at
    pub tag_name: String,

    /// Release title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Markdown body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(default)]
    pub draft: bool,

    #[serde(default)]
    pub prerelease: bool,

    /// Null for drafts
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub html_url: String,
}

impl Release {
    /// Title, falling back to the tag when the release has no name
    pub fn title(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.tag_name)
    }
}
