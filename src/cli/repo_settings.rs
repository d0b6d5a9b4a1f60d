//! Repository settings command
//!
//! Every (repository, step) pair is attempted independently. A step that is
//! already in place is skipped rather than rewritten, and one failure never
//! stops the others.

use colored::Colorize;
use log::debug;

use crate::cli::CommandContext;
use crate::client::{GitHubApi, NewRuleset, RepoSettingsPatch, Repository};
use crate::error::{ApiError, Error, Result};
use crate::report::{FanOutPolicy, RepoSelector, enumerate, for_each_repo};

/// Name of the ruleset created by `protect-default`
pub const PROTECT_RULESET_NAME: &str = "ghops-protect-default";

/// Setting to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SettingsAction {
    /// Every step below
    SecureAll,
    /// Allow auto-merge
    AutoMerge,
    /// Delete head branches after merge
    AutoDelete,
    /// Ruleset on the default branch requiring pull requests
    ProtectDefault,
    /// Dependabot vulnerability alerts
    VulnerabilityAlerts,
}

impl SettingsAction {
    pub fn steps(self) -> Vec<Step> {
        match self {
            SettingsAction::SecureAll => vec![
                Step::AutoMerge,
                Step::AutoDelete,
                Step::ProtectDefault,
                Step::VulnerabilityAlerts,
            ],
            SettingsAction::AutoMerge => vec![Step::AutoMerge],
            SettingsAction::AutoDelete => vec![Step::AutoDelete],
            SettingsAction::ProtectDefault => vec![Step::ProtectDefault],
            SettingsAction::VulnerabilityAlerts => vec![Step::VulnerabilityAlerts],
        }
    }
}

/// One setting change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    AutoMerge,
    AutoDelete,
    ProtectDefault,
    VulnerabilityAlerts,
}

impl Step {
    pub fn label(self) -> &'static str {
        match self {
            Step::AutoMerge => "auto-merge",
            Step::AutoDelete => "auto-delete",
            Step::ProtectDefault => "protect-default",
            Step::VulnerabilityAlerts => "vulnerability-alerts",
        }
    }
}

/// Result of one step on one repository
#[derive(Debug)]
pub enum StepOutcome {
    Applied,
    /// Already configured
    Skipped,
    Failed(Error),
}

/// Per-outcome counters printed at the end
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub applied: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Tally {
    fn record(&mut self, outcome: &StepOutcome) {
        match outcome {
            StepOutcome::Applied => self.applied += 1,
            StepOutcome::Skipped => self.skipped += 1,
            StepOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Outcomes for one repository, in step order
pub type RepoResult = (Repository, Vec<(Step, StepOutcome)>);

/// Run the repo-settings command
pub async fn run(ctx: &CommandContext, repo: Option<String>, action: SettingsAction) -> Result<()> {
    let org = ctx.org()?;
    let selector = RepoSelector::from_args(repo.as_deref(), None);
    let repos = enumerate(ctx.client.as_ref(), org, &selector, &ctx.config.denylist).await?;

    if repos.is_empty() {
        return Err(Error::NoRepositories(org.to_string()));
    }

    println!(
        "Applying {} to {} repositories in {}",
        action.steps().iter().map(|s| s.label()).collect::<Vec<_>>().join(", "),
        repos.len(),
        org
    );

    let results = apply_all(ctx.client.as_ref(), &repos, action, ctx.policy).await?;
    let (text, _) = render(&results);
    print!("{}", text);

    Ok(())
}

/// Apply `action` to every repository
pub async fn apply_all<A>(
    api: &A,
    repos: &[Repository],
    action: SettingsAction,
    policy: FanOutPolicy,
) -> Result<Vec<RepoResult>>
where
    A: GitHubApi + ?Sized,
{
    let steps = action.steps();
    let out = for_each_repo(repos, policy, |repo| {
        let steps = steps.clone();
        async move {
            let mut outcomes = Vec::with_capacity(steps.len());
            for step in steps {
                outcomes.push((step, apply_step(api, repo, step).await));
            }
            Ok::<_, Error>(outcomes)
        }
    })
    .await?;

    Ok(out.into_done())
}

/// Apply one step, checking current state first
pub async fn apply_step<A>(api: &A, repo: &Repository, step: Step) -> StepOutcome
where
    A: GitHubApi + ?Sized,
{
    match try_step(api, repo, step).await {
        Ok(outcome) => outcome,
        Err(e) if is_already_configured(&e) => {
            debug!("{} {}: {}", repo.full_name, step.label(), e);
            StepOutcome::Skipped
        }
        Err(e) => StepOutcome::Failed(e),
    }
}

async fn try_step<A>(api: &A, repo: &Repository, step: Step) -> Result<StepOutcome>
where
    A: GitHubApi + ?Sized,
{
    let target = repo.repo_ref();
    match step {
        Step::AutoMerge => {
            if repo.allow_auto_merge == Some(true) {
                return Ok(StepOutcome::Skipped);
            }
            let patch = RepoSettingsPatch {
                allow_auto_merge: Some(true),
                ..Default::default()
            };
            api.update_repo(&target, &patch).await?;
        }
        Step::AutoDelete => {
            if repo.delete_branch_on_merge == Some(true) {
                return Ok(StepOutcome::Skipped);
            }
            let patch = RepoSettingsPatch {
                delete_branch_on_merge: Some(true),
                ..Default::default()
            };
            api.update_repo(&target, &patch).await?;
        }
        Step::ProtectDefault => {
            let existing = api.list_rulesets(&target).await?;
            if existing.iter().any(|r| r.name == PROTECT_RULESET_NAME) {
                return Ok(StepOutcome::Skipped);
            }
            let ruleset = NewRuleset::protect_default_branch(PROTECT_RULESET_NAME);
            api.create_ruleset(&target, &ruleset).await?;
        }
        Step::VulnerabilityAlerts => {
            if api.vulnerability_alerts_enabled(&target).await? {
                return Ok(StepOutcome::Skipped);
            }
            api.enable_vulnerability_alerts(&target).await?;
        }
    }
    Ok(StepOutcome::Applied)
}

/// Validation errors GitHub returns when the setting is already in place
fn is_already_configured(err: &Error) -> bool {
    match err {
        Error::Api(ApiError::Conflict(msg)) | Error::Api(ApiError::BadRequest(msg)) => {
            let msg = msg.to_ascii_lowercase();
            msg.contains("already exists") || msg.contains("must be unique")
        }
        _ => false,
    }
}

/// Per-repository lines followed by the counters
pub fn render(results: &[RepoResult]) -> (String, Tally) {
    let mut tally = Tally::default();
    let mut text = String::new();

    for (repo, outcomes) in results {
        text.push_str(&format!("\n{}\n", repo.full_name.bold()));
        for (step, outcome) in outcomes {
            tally.record(outcome);
            let line = match outcome {
                StepOutcome::Applied => format!("  {} {}", "✓".green(), step.label()),
                StepOutcome::Skipped => {
                    format!("  {} {} (already configured)", "-".dimmed(), step.label())
                }
                StepOutcome::Failed(e) => format!("  {} {}: {}", "✗".red(), step.label(), e),
            };
            text.push_str(&line);
            text.push('\n');
        }
    }

    text.push_str(&format!(
        "\n{} applied, {} skipped, {} failed\n",
        tally.applied.to_string().green(),
        tally.skipped,
        if tally.failed > 0 {
            tally.failed.to_string().red()
        } else {
            tally.failed.to_string().normal()
        }
    ));

    (text, tally)
}
