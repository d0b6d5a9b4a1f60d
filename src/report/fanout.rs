//! Per-repository fan-out
//!
//! Runs one future per repository with at most `jobs` in flight. Results come
//! back in enumeration order regardless of completion order.

use std::future::Future;

use colored::Colorize;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, warn};

use crate::client::Repository;
use crate::error::{Error, Result};

/// How repositories are processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanOutPolicy {
    /// Repositories in flight at once, at least 1
    pub jobs: usize,
    /// Record failures and continue instead of aborting on the first one
    pub keep_going: bool,
    /// Draw a progress bar on stderr
    pub progress: bool,
}

impl Default for FanOutPolicy {
    fn default() -> Self {
        Self {
            jobs: 1,
            keep_going: false,
            progress: false,
        }
    }
}

/// Result of processing one repository
#[derive(Debug)]
pub enum RepoOutcome<T> {
    Done(Repository, T),
    Failed(Repository, Error),
}

/// Outcomes of a whole run, in enumeration order
#[derive(Debug)]
pub struct FanOut<T> {
    pub outcomes: Vec<RepoOutcome<T>>,
}

impl<T> FanOut<T> {
    /// Successful results with their repository
    pub fn done(&self) -> impl Iterator<Item = (&Repository, &T)> {
        self.outcomes.iter().filter_map(|o| match o {
            RepoOutcome::Done(repo, value) => Some((repo, value)),
            RepoOutcome::Failed(..) => None,
        })
    }

    /// Consume into successful results
    pub fn into_done(self) -> Vec<(Repository, T)> {
        self.outcomes
            .into_iter()
            .filter_map(|o| match o {
                RepoOutcome::Done(repo, value) => Some((repo, value)),
                RepoOutcome::Failed(..) => None,
            })
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Repository, &Error)> {
        self.outcomes.iter().filter_map(|o| match o {
            RepoOutcome::Failed(repo, err) => Some((repo, err)),
            RepoOutcome::Done(..) => None,
        })
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Print one warning line per failed repository to stderr
    pub fn warn_failures(&self) {
        let count = self.failure_count();
        if count == 0 {
            return;
        }

        eprintln!();
        eprintln!(
            "{} {} {} failed:",
            "⚠".yellow(),
            count,
            if count == 1 { "repository" } else { "repositories" }
        );
        for (repo, err) in self.failures() {
            eprintln!("  {} {}: {}", "✗".red(), repo.full_name, err);
        }
    }
}

/// Run `task` for every repository under `policy`.
///
/// Without `keep_going` the first failure is returned and the remaining
/// in-flight work is dropped.
pub async fn for_each_repo<'a, T, F, Fut>(
    repos: &'a [Repository],
    policy: FanOutPolicy,
    task: F,
) -> Result<FanOut<T>>
where
    F: Fn(&'a Repository) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let jobs = policy.jobs.max(1);
    debug!("Processing {} repositories, {} at a time", repos.len(), jobs);

    let progress = progress_bar(repos.len(), policy.progress);

    let mut results = stream::iter(repos.iter().map(|repo| {
        let fut = task(repo);
        async move { (repo, fut.await) }
    }))
    .buffered(jobs);

    let mut outcomes = Vec::with_capacity(repos.len());
    while let Some((repo, result)) = results.next().await {
        progress.inc(1);
        match result {
            Ok(value) => outcomes.push(RepoOutcome::Done(repo.clone(), value)),
            Err(err) if policy.keep_going => {
                warn!("{} failed: {}", repo.full_name, err);
                outcomes.push(RepoOutcome::Failed(repo.clone(), err));
            }
            Err(err) => {
                progress.finish_and_clear();
                return Err(err);
            }
        }
    }
    progress.finish_and_clear();

    Ok(FanOut { outcomes })
}

fn progress_bar(len: usize, enabled: bool) -> ProgressBar {
    if !enabled || len < 2 {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::with_draw_target(Some(len as u64), ProgressDrawTarget::stderr());
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} [{bar:30.cyan/blue}] {pos}/{len} repositories")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}
