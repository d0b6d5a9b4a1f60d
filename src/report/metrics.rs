//! Pull request and review velocity metrics

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::client::{PullRequest, Review, ReviewState};
use crate::report::DateRange;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// First submitted review by one reviewer on one pull request
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSample {
    pub reviewer: String,
    pub submitted_at: DateTime<Utc>,
}

/// The parts of a pull request the metrics need
#[derive(Debug, Clone, PartialEq)]
pub struct PullSample {
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub reviews: Vec<ReviewSample>,
}

impl PullSample {
    /// Keep each reviewer's first submitted review, skipping the author's
    /// own reviews and unsubmitted ones.
    pub fn from_pull(pr: &PullRequest, reviews: &[Review]) -> Self {
        let author = pr.author().to_string();
        let mut first: BTreeMap<String, DateTime<Utc>> = BTreeMap::new();

        for review in reviews {
            if review.state == ReviewState::Pending {
                continue;
            }
            let Some(submitted_at) = review.submitted_at else {
                continue;
            };
            let reviewer = review.reviewer();
            if reviewer.eq_ignore_ascii_case(&author) {
                continue;
            }
            first
                .entry(reviewer.to_string())
                .and_modify(|at| *at = (*at).min(submitted_at))
                .or_insert(submitted_at);
        }

        Self {
            author,
            created_at: pr.created_at,
            merged_at: pr.merged_at,
            reviews: first
                .into_iter()
                .map(|(reviewer, submitted_at)| ReviewSample {
                    reviewer,
                    submitted_at,
                })
                .collect(),
        }
    }

    fn merge_days(&self) -> Option<f64> {
        self.merged_at.map(|at| days_between(self.created_at, at))
    }
}

/// Aggregates for one author or reviewer
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsBucket {
    /// Author or reviewer login
    pub key: String,
    /// Pull requests authored, or pull requests reviewed
    pub count: usize,
    /// Merged pull requests (authors only)
    pub merged: usize,
    /// Mean days from creation to merge over merged pull requests
    pub avg_merge_days: f64,
    /// Mean days from creation to first review
    pub avg_review_days: f64,
    /// `count` per week over the window
    pub velocity: f64,
    /// merged / count, percent
    pub merge_rate: f64,
}

/// Totals over every matching pull request and review
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_prs: usize,
    pub merged_prs: usize,
    pub merge_rate: f64,
    pub avg_merge_days: f64,
    pub pr_velocity: f64,
    pub total_reviews: usize,
    pub avg_review_days: f64,
    pub review_velocity: f64,
}

/// Full metrics report
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsReport {
    pub window_days: i64,
    pub summary: Summary,
    pub authors: Vec<MetricsBucket>,
    pub reviewers: Vec<MetricsBucket>,
}

/// Aggregate samples taken from `window`.
///
/// `user` narrows authors for pull request stats and reviewers for review
/// stats. Empty groups produce zeros.
pub fn aggregate(samples: &[PullSample], window: &DateRange, user: Option<&str>) -> MetricsReport {
    let window_days = window.days();
    let wanted = |login: &str| user.is_none_or(|u| u.eq_ignore_ascii_case(login));

    let authored: Vec<&PullSample> = samples.iter().filter(|s| wanted(s.author.as_str())).collect();

    // (reviewer, days to first review) pairs
    let reviewed: Vec<(&str, f64)> = samples
        .iter()
        .flat_map(|s| {
            s.reviews
                .iter()
                .map(move |r| (r.reviewer.as_str(), days_between(s.created_at, r.submitted_at)))
        })
        .filter(|(reviewer, _)| wanted(*reviewer))
        .collect();

    let mut by_author: BTreeMap<&str, Vec<&PullSample>> = BTreeMap::new();
    for sample in authored.iter().copied() {
        by_author.entry(sample.author.as_str()).or_default().push(sample);
    }

    let mut authors: Vec<MetricsBucket> = by_author
        .into_iter()
        .map(|(author, prs)| {
            let merge_days: Vec<f64> = prs.iter().filter_map(|s| s.merge_days()).collect();
            MetricsBucket {
                key: author.to_string(),
                count: prs.len(),
                merged: merge_days.len(),
                avg_merge_days: round1(mean(&merge_days)),
                avg_review_days: 0.0,
                velocity: per_week(prs.len(), window_days),
                merge_rate: rate_pct(merge_days.len(), prs.len()),
            }
        })
        .collect();

    let mut by_reviewer: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for &(reviewer, days) in &reviewed {
        by_reviewer.entry(reviewer).or_default().push(days);
    }

    let mut reviewers: Vec<MetricsBucket> = by_reviewer
        .into_iter()
        .map(|(reviewer, days)| MetricsBucket {
            key: reviewer.to_string(),
            count: days.len(),
            merged: 0,
            avg_merge_days: 0.0,
            avg_review_days: round1(mean(&days)),
            velocity: per_week(days.len(), window_days),
            merge_rate: 0.0,
        })
        .collect();

    // Busiest first, ties by name
    let by_count = |a: &MetricsBucket, b: &MetricsBucket| {
        b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key))
    };
    authors.sort_by(by_count);
    reviewers.sort_by(by_count);

    let merge_days: Vec<f64> = authored.iter().filter_map(|s| s.merge_days()).collect();
    let review_days: Vec<f64> = reviewed.iter().map(|(_, d)| *d).collect();

    let summary = Summary {
        total_prs: authored.len(),
        merged_prs: merge_days.len(),
        merge_rate: rate_pct(merge_days.len(), authored.len()),
        avg_merge_days: round1(mean(&merge_days)),
        pr_velocity: per_week(authored.len(), window_days),
        total_reviews: review_days.len(),
        avg_review_days: round1(mean(&review_days)),
        review_velocity: per_week(review_days.len(), window_days),
    };

    MetricsReport {
        window_days,
        summary,
        authors,
        reviewers,
    }
}

fn days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    ((end - start).num_seconds().max(0) as f64) / SECONDS_PER_DAY
}

/// Arithmetic mean, 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Events per week over a window of `days`, one decimal
pub fn per_week(count: usize, days: i64) -> f64 {
    if days <= 0 {
        return 0.0;
    }
    round1(count as f64 * 7.0 / days as f64)
}

/// `part / total` as a percentage with one decimal, 0 when `total` is 0
pub fn rate_pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(part.min(total) as f64 / total as f64 * 100.0)
}
