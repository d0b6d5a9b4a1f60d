//! Security alert records and filters

use chrono::{DateTime, Utc};

use crate::client::{DependabotAlert, RepoRef, Severity};

/// One open alert flattened for reporting
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRecord {
    pub repository: String,
    pub package: String,
    pub ecosystem: String,
    pub severity: Severity,
    pub ghsa_id: String,
    pub summary: String,
    pub published: DateTime<Utc>,
    pub url: String,
}

impl AlertRecord {
    pub fn from_alert(repo: &RepoRef, alert: &DependabotAlert) -> Self {
        let ecosystem = alert
            .dependency
            .package
            .as_ref()
            .map(|p| p.ecosystem.clone())
            .unwrap_or_default();

        Self {
            repository: repo.to_string(),
            package: alert.package_name().to_string(),
            ecosystem,
            severity: alert.security_advisory.severity,
            ghsa_id: alert.security_advisory.ghsa_id.clone(),
            summary: alert.security_advisory.summary.clone(),
            published: alert.security_advisory.published_at,
            url: alert.html_url.clone(),
        }
    }
}

/// Which alerts to keep
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertFilter {
    /// Critical and high only
    pub high_risk_only: bool,
    /// Advisory published at or after
    pub since: Option<DateTime<Utc>>,
    /// Advisory published at or before
    pub until: Option<DateTime<Utc>>,
}

impl AlertFilter {
    pub fn matches(&self, record: &AlertRecord) -> bool {
        if self.high_risk_only && !record.severity.is_high_risk() {
            return false;
        }
        if self.since.is_some_and(|since| record.published < since) {
            return false;
        }
        if self.until.is_some_and(|until| record.published > until) {
            return false;
        }
        true
    }
}

/// Open alerts of one repository that pass `filter`, most severe first
pub fn select(repo: &RepoRef, alerts: &[DependabotAlert], filter: &AlertFilter) -> Vec<AlertRecord> {
    let mut records: Vec<AlertRecord> = alerts
        .iter()
        .filter(|a| a.is_open())
        .map(|a| AlertRecord::from_alert(repo, a))
        .filter(|r| filter.matches(r))
        .collect();

    records.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| b.published.cmp(&a.published))
    });
    records
}
