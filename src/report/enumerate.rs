//! Repository enumeration for an organization

use log::{debug, warn};

use crate::client::{GitHubApi, RepoRef, Repository};
use crate::error::{ApiError, Error, Result};

/// Which repositories a command targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoSelector {
    /// Every repository of the organization
    All,
    /// Repositories whose name contains the text, ignoring case
    Matching(String),
    /// One repository, `name` or `owner/name`
    Single(String),
}

impl RepoSelector {
    /// `--repo` wins over a positional name filter
    pub fn from_args(repo: Option<&str>, filter: Option<&str>) -> Self {
        match (repo, filter) {
            (Some(repo), _) => RepoSelector::Single(repo.to_string()),
            (None, Some(filter)) if !filter.trim().is_empty() => {
                RepoSelector::Matching(filter.trim().to_string())
            }
            _ => RepoSelector::All,
        }
    }

    fn matches(&self, repo: &Repository) -> bool {
        match self {
            RepoSelector::All | RepoSelector::Single(_) => true,
            RepoSelector::Matching(text) => repo
                .name
                .to_ascii_lowercase()
                .contains(&text.to_ascii_lowercase()),
        }
    }
}

/// Candidate repositories for `org`, sorted by name.
///
/// Archived and denylisted repositories are always dropped. A single named
/// repository that does not exist is an error; an empty listing is not.
pub async fn enumerate<A>(
    api: &A,
    org: &str,
    selector: &RepoSelector,
    denylist: &[String],
) -> Result<Vec<Repository>>
where
    A: GitHubApi + ?Sized,
{
    let candidates = match selector {
        RepoSelector::Single(spec) => {
            let target = RepoRef::parse(spec, org)?;
            match api.get_repo(&target).await {
                Ok(repo) => vec![repo],
                Err(Error::Api(ApiError::NotFound(_))) => {
                    return Err(Error::RepoNotFound(target.to_string()));
                }
                Err(e) => return Err(e),
            }
        }
        RepoSelector::All | RepoSelector::Matching(_) => api.list_org_repos(org).await?,
    };

    let total = candidates.len();
    let mut repos: Vec<Repository> = candidates
        .into_iter()
        .filter(|repo| selector.matches(repo))
        .filter(|repo| {
            if repo.archived {
                if matches!(selector, RepoSelector::Single(_)) {
                    warn!("Skipping archived repository {}", repo.full_name);
                }
                return false;
            }
            if is_denied(denylist, &repo.name) {
                debug!("Skipping denylisted repository {}", repo.full_name);
                return false;
            }
            true
        })
        .collect();

    repos.sort_by(|a, b| {
        a.name
            .to_ascii_lowercase()
            .cmp(&b.name.to_ascii_lowercase())
    });

    debug!("{} of {} repositories selected in {}", repos.len(), total, org);
    Ok(repos)
}

/// Denylist entries match repository names without regard to case
pub fn is_denied(denylist: &[String], name: &str) -> bool {
    denylist.iter().any(|denied| denied.eq_ignore_ascii_case(name))
}
