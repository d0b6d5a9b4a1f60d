//! Dependabot alert models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Alert from `/repos/{owner}/{repo}/dependabot/alerts`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependabotAlert {
    /// Alert number within the repository
    pub number: u64,

    /// open, dismissed, fixed or auto_dismissed
    pub state: String,

    pub dependency: AlertDependency,

    pub security_advisory: SecurityAdvisory,

    pub html_url: String,

    pub created_at: DateTime<Utc>,
}

impl DependabotAlert {
    pub fn is_open(&self) -> bool {
        self.state == "open"
    }

    /// Affected package name, `unknown` when GitHub omits it
    pub fn package_name(&self) -> &str {
        self.dependency
            .package
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or("unknown")
    }
}

/// Vulnerable dependency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertDependency {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<AlertPackage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_path: Option<String>,
}

/// Package coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertPackage {
    pub ecosystem: String,
    pub name: String,
}

/// Advisory behind an alert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityAdvisory {
    pub ghsa_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cve_id: Option<String>,

    #[serde(default)]
    pub summary: String,

    pub severity: Severity,

    pub published_at: DateTime<Utc>,
}

/// Advisory severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Critical and high alerts
    pub fn is_high_risk(self) -> bool {
        matches!(self, Severity::Critical | Severity::High)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALERT_JSON: &str = r#"{
        "number": 7,
        "state": "open",
        "dependency": {
            "package": { "ecosystem": "npm", "name": "lodash" },
            "manifest_path": "package-lock.json",
            "scope": "runtime"
        },
        "security_advisory": {
            "ghsa_id": "GHSA-jf85-cpcp-j695",
            "cve_id": "CVE-2019-10744",
            "summary": "Prototype Pollution in lodash",
            "severity": "critical",
            "published_at": "2019-07-10T19:45:23Z"
        },
        "html_url": "https://github.com/acme/web/security/dependabot/7",
        "created_at": "2024-01-05T08:00:00Z"
    }"#;

    #[test]
    fn test_alert_deserialize() {
        let alert: DependabotAlert = serde_json::from_str(ALERT_JSON).unwrap();
        assert!(alert.is_open());
        assert_eq!(alert.package_name(), "lodash");
        assert_eq!(alert.security_advisory.severity, Severity::Critical);
        assert_eq!(alert.security_advisory.ghsa_id, "GHSA-jf85-cpcp-j695");
    }

    #[test]
    fn test_severity_ordering_and_risk() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::High.is_high_risk());
        assert!(!Severity::Medium.is_high_risk());
        assert_eq!(Severity::Critical.to_string(), "critical");
    }
}
