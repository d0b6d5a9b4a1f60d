//! Reusable formatting helpers for report output

use chrono::{DateTime, Utc};

use crate::client::Severity;

/// Colored circle for a severity
pub fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🔴",
        Severity::High => "🟠",
        Severity::Medium => "🟡",
        Severity::Low => "🔵",
    }
}

/// `YYYY-MM-DD`, or `N/A` when absent
pub fn format_date(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Days with one decimal, e.g. `2.5d`
pub fn format_days(days: f64) -> String {
    format!("{:.1}d", days)
}

/// Percentage with one decimal, e.g. `66.7%`
pub fn format_pct(pct: f64) -> String {
    format!("{:.1}%", pct)
}

/// Weekly rate with one decimal, e.g. `3.5/wk`
pub fn format_per_week(rate: f64) -> String {
    format!("{:.1}/wk", rate)
}

/// Pluralize a count: `1 alert`, `3 alerts`
pub fn count_noun(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
