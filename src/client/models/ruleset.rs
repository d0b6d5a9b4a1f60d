//! Repository ruleset models used for branch protection

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Ruleset summary from `/repos/{owner}/{repo}/rulesets`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ruleset {
    pub id: u64,

    pub name: String,

    /// branch, tag or push
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default)]
    pub enforcement: String,
}

/// Body for `POST /repos/{owner}/{repo}/rulesets`
#[derive(Debug, Clone, Serialize)]
pub struct NewRuleset {
    pub name: String,
    pub target: String,
    pub enforcement: String,
    pub conditions: serde_json::Value,
    pub rules: Vec<RulesetRule>,
}

/// Single rule in a ruleset
#[derive(Debug, Clone, Serialize)]
pub struct RulesetRule {
    #[serde(rename = "type")]
    pub rule_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

impl RulesetRule {
    fn bare(rule_type: &str) -> Self {
        Self {
            rule_type: rule_type.to_string(),
            parameters: None,
        }
    }
}

impl NewRuleset {
    /// Active ruleset on the default branch: no deletion, no force push,
    /// changes only through a pull request with one approval.
    pub fn protect_default_branch(name: &str) -> Self {
        Self {
            name: name.to_string(),
            target: "branch".to_string(),
            enforcement: "active".to_string(),
            conditions: json!({
                "ref_name": { "include": ["~DEFAULT_BRANCH"], "exclude": [] }
            }),
            rules: vec![
                RulesetRule::bare("deletion"),
                RulesetRule::bare("non_fast_forward"),
                RulesetRule {
                    rule_type: "pull_request".to_string(),
                    parameters: Some(json!({
                        "required_approving_review_count": 1,
                        "dismiss_stale_reviews_on_push": true,
                        "require_code_owner_review": false,
                        "require_last_push_approval": false,
                        "required_review_thread_resolution": false
                    })),
                },
            ],
        }
    }
}
