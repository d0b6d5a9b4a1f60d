//! Pull request review status and listing filters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::client::{PullRequest, RepoRef, Review, ReviewState};

/// Aggregate review state of a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStatus {
    Approved,
    ChangesRequested,
    Pending,
}

impl ReviewStatus {
    pub fn icon(self) -> &'static str {
        match self {
            ReviewStatus::Approved => "✅",
            ReviewStatus::ChangesRequested => "❌",
            ReviewStatus::Pending => "⏳",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReviewStatus::Approved => "approved",
            ReviewStatus::ChangesRequested => "changes requested",
            ReviewStatus::Pending => "pending",
        }
    }
}

/// How individual reviews reduce to a `ReviewStatus`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewPolicy {
    /// Each reviewer's latest approval, change request or dismissal counts.
    /// Any outstanding change request wins over approvals.
    #[default]
    LatestPerReviewer,
    /// Any approval at all wins, then any change request
    ApprovalPrecedence,
}

/// Reduce reviews (in submission order) to a status
pub fn review_status(reviews: &[Review], policy: ReviewPolicy) -> ReviewStatus {
    match policy {
        ReviewPolicy::ApprovalPrecedence => {
            if reviews.iter().any(|r| r.state == ReviewState::Approved) {
                ReviewStatus::Approved
            } else if reviews
                .iter()
                .any(|r| r.state == ReviewState::ChangesRequested)
            {
                ReviewStatus::ChangesRequested
            } else {
                ReviewStatus::Pending
            }
        }
        ReviewPolicy::LatestPerReviewer => {
            let mut latest: HashMap<&str, (Option<DateTime<Utc>>, ReviewState)> = HashMap::new();
            for review in reviews {
                if !matches!(
                    review.state,
                    ReviewState::Approved | ReviewState::ChangesRequested | ReviewState::Dismissed
                ) {
                    continue;
                }
                // Equal or missing timestamps fall back to list order
                let newer = latest
                    .get(review.reviewer())
                    .is_none_or(|(at, _)| review.submitted_at >= *at);
                if newer {
                    latest.insert(review.reviewer(), (review.submitted_at, review.state));
                }
            }

            let states: Vec<ReviewState> = latest.into_values().map(|(_, s)| s).collect();
            if states.contains(&ReviewState::ChangesRequested) {
                ReviewStatus::ChangesRequested
            } else if states.contains(&ReviewState::Approved) {
                ReviewStatus::Approved
            } else {
                ReviewStatus::Pending
            }
        }
    }
}

/// Listing filters for `pull-requests`
#[derive(Debug, Clone, Default)]
pub struct PullFilter {
    /// Authored by the current user
    pub mine: bool,
    /// Assigned to or awaiting review from the current user
    pub involved: bool,
    /// Review status is still pending
    pub pending: bool,
    /// Open at least this many days
    pub min_days: Option<u32>,
}

impl PullFilter {
    /// Whether the current user's login is needed to evaluate the filter
    pub fn needs_identity(&self) -> bool {
        self.mine || self.involved
    }

    /// Checks that do not need reviews. Drafts never match.
    pub fn matches(&self, pr: &PullRequest, me: Option<&str>, now: DateTime<Utc>) -> bool {
        if pr.draft {
            return false;
        }

        if let Some(me) = me {
            if self.mine && !pr.author().eq_ignore_ascii_case(me) {
                return false;
            }
            if self.involved && !(pr.is_assigned_to(me) || pr.is_review_requested_from(me)) {
                return false;
            }
        }

        if let Some(days) = self.min_days
            && (now - pr.created_at).num_days() < i64::from(days)
        {
            return false;
        }

        true
    }

    /// Check applied once the review status is known
    pub fn matches_status(&self, status: ReviewStatus) -> bool {
        !self.pending || status == ReviewStatus::Pending
    }
}

/// An open pull request with its derived review status
#[derive(Debug, Clone)]
pub struct PullEntry {
    pub repo: RepoRef,
    pub pr: PullRequest,
    pub status: ReviewStatus,
}

/// Time since creation as `"{d}d {h}h"`, or `"{h}h"` under a day
pub fn time_open(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - created_at).max(chrono::Duration::zero());
    let days = elapsed.num_days();
    let hours = elapsed.num_hours() - days * 24;

    if days >= 1 {
        format!("{}d {}h", days, hours)
    } else {
        format!("{}h", hours)
    }
}
