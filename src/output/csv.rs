//! CSV rendering (RFC 4180)

use std::borrow::Cow;

use crate::report::alerts::AlertRecord;

/// Header row of the security alert export
pub const ALERTS_HEADER: &str = "Repository,Package,Severity,GHSA ID,Published,URL";

/// Quote a field when it contains a comma, quote or line break
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn row(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// Header plus one line per alert, or nothing at all without alerts
pub fn alerts_csv(records: &[AlertRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(64 * (records.len() + 1));
    out.push_str(ALERTS_HEADER);
    out.push('\n');

    for record in records {
        let severity = record.severity.to_string();
        let published = record.published.format("%Y-%m-%dT%H:%M:%SZ").to_string();
        out.push_str(&row(&[
            record.repository.as_str(),
            record.package.as_str(),
            severity.as_str(),
            record.ghsa_id.as_str(),
            published.as_str(),
            record.url.as_str(),
        ]));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures::*;
    use crate::client::{RepoRef, Severity};

    fn record(package: &str) -> AlertRecord {
        AlertRecord::from_alert(
            &RepoRef::new("acme", "web"),
            &alert(1, package, Severity::High, "2024-02-03T04:05:06Z"),
        )
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_empty_alerts_produce_nothing() {
        assert_eq!(alerts_csv(&[]), "");
    }

    #[test]
    fn test_one_header_and_one_line_per_alert() {
        let out = alerts_csv(&[record("lodash"), record("minimist")]);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], ALERTS_HEADER);
        assert_eq!(
            lines[1],
            "acme/web,lodash,high,GHSA-test-0001,2024-02-03T04:05:06Z,https://github.com/acme/repo/security/dependabot/1"
        );
    }

    #[test]
    fn test_package_with_comma_is_quoted() {
        let out = alerts_csv(&[record("@scope/pkg,extra")]);
        assert!(out.contains(",\"@scope/pkg,extra\","));
    }
}
