//! Release selection for release notes

use crate::client::Release;
use crate::report::DateRange;

/// Published releases inside `range`, newest first.
///
/// Drafts have no publish date and never qualify.
pub fn releases_in_range(releases: Vec<Release>, range: &DateRange) -> Vec<Release> {
    let mut selected: Vec<Release> = releases
        .into_iter()
        .filter(|r| !r.draft)
        .filter(|r| r.published_at.is_some_and(|at| range.contains(at)))
        .collect();

    selected.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    selected
}
