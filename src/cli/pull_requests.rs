//! Pull requests command: listing and approval

use chrono::{DateTime, Utc};
use colored::Colorize;
use dialoguer::{Input, theme::ColorfulTheme};

use crate::cli::CommandContext;
use crate::client::{GitHubApi, PullQuery, RepoRef, Repository, ReviewEvent};
use crate::error::{Error, Result};
use crate::output::formatters::count_noun;
use crate::report::pulls::{PullEntry, PullFilter, ReviewPolicy, review_status, time_open};
use crate::report::{FanOut, FanOutPolicy, RepoSelector, enumerate, for_each_repo};

const APPROVE_NEEDS_REPO: &str =
    "The --repo flag is required when approving a pull request by number";

/// Parsed `pull-requests` flags
#[derive(Debug, Clone, Default)]
pub struct PullRequestsArgs {
    pub name_filter: Option<String>,
    pub repo: Option<String>,
    pub filter: PullFilter,
    /// `Some(None)` picks interactively, `Some(Some(n))` approves `n`
    pub approve: Option<Option<u64>>,
}

impl PullRequestsArgs {
    /// Split the raw `--approve` value: a number targets one pull request,
    /// anything else is the name filter written after the flag.
    pub fn with_approve(mut self, raw: Option<Option<String>>) -> Result<Self> {
        self.approve = match raw {
            None => None,
            Some(None) => Some(None),
            Some(Some(value)) => match value.parse::<u64>() {
                Ok(number) => Some(Some(number)),
                Err(_) if self.name_filter.is_none() => {
                    self.name_filter = Some(value);
                    Some(None)
                }
                Err(_) => {
                    return Err(Error::Usage(format!(
                        "'{value}' is not a pull request number for --approve"
                    )));
                }
            },
        };
        Ok(self)
    }
}

/// Flag combinations clap cannot express. Checked before authenticating.
pub fn validate(args: &PullRequestsArgs) -> Result<()> {
    if matches!(args.approve, Some(Some(_))) && args.repo.is_none() {
        return Err(Error::Usage(APPROVE_NEEDS_REPO.to_string()));
    }
    Ok(())
}

/// Run the pull-requests command
pub async fn run(ctx: &CommandContext, args: PullRequestsArgs) -> Result<()> {
    validate(&args)?;
    let org = ctx.org()?;

    if let (Some(Some(number)), Some(repo)) = (args.approve, args.repo.as_deref()) {
        let target = RepoRef::parse(repo, org)?;
        return approve(ctx.client.as_ref(), &target, number).await;
    }

    let me = if args.filter.needs_identity() {
        Some(ctx.current_login().await?)
    } else {
        None
    };

    let selector = RepoSelector::from_args(args.repo.as_deref(), args.name_filter.as_deref());
    let repos = enumerate(ctx.client.as_ref(), org, &selector, &ctx.config.denylist).await?;

    let scope = PullScope {
        filter: &args.filter,
        me,
        now: Utc::now(),
        policy: ctx.config.review_policy,
    };
    let out = collect(ctx.client.as_ref(), &repos, &scope, ctx.policy).await?;

    if args.approve.is_some() {
        out.warn_failures();
        let entries: Vec<PullEntry> = out.into_done().into_iter().flat_map(|(_, e)| e).collect();
        return approve_interactively(ctx.client.as_ref(), &entries, scope.now).await;
    }

    print!("{}", render(&out, scope.now));
    out.warn_failures();
    Ok(())
}

/// What to keep and how to judge it
#[derive(Debug, Clone, Copy)]
pub struct PullScope<'a> {
    pub filter: &'a PullFilter,
    /// Current login when the filter needs one
    pub me: Option<&'a str>,
    pub now: DateTime<Utc>,
    pub policy: ReviewPolicy,
}

/// Open pull requests matching `scope`, with review status, per repository
pub async fn collect<A>(
    api: &A,
    repos: &[Repository],
    scope: &PullScope<'_>,
    policy: FanOutPolicy,
) -> Result<FanOut<Vec<PullEntry>>>
where
    A: GitHubApi + ?Sized,
{
    for_each_repo(repos, policy, |repo| async move {
        let target = repo.repo_ref();
        let pulls = api.list_pulls(&target, &PullQuery::open()).await?;

        let mut entries = Vec::new();
        for pr in pulls {
            if !scope.filter.matches(&pr, scope.me, scope.now) {
                continue;
            }
            let reviews = api.list_reviews(&target, pr.number).await?;
            let status = review_status(&reviews, scope.policy);
            if scope.filter.matches_status(status) {
                entries.push(PullEntry {
                    repo: target.clone(),
                    pr,
                    status,
                });
            }
        }
        Ok(entries)
    })
    .await
}

/// Listing grouped by repository
pub fn render(out: &FanOut<Vec<PullEntry>>, now: DateTime<Utc>) -> String {
    let mut text = String::new();
    let mut total = 0;

    for (repo, entries) in out.done() {
        if entries.is_empty() {
            continue;
        }
        total += entries.len();

        text.push_str(&format!("\n{}\n", repo.full_name.bold()));
        for entry in entries {
            text.push_str(&format!("  {}\n", entry_line(entry, now)));
            text.push_str(&format!("     {}\n", entry.pr.html_url.dimmed()));
        }
    }

    if total == 0 {
        text.push_str("No open pull requests found.\n");
    } else {
        text.push_str(&format!(
            "\n{}\n",
            count_noun(total, "open pull request", "open pull requests")
        ));
    }
    text
}

fn entry_line(entry: &PullEntry, now: DateTime<Utc>) -> String {
    format!(
        "{} #{} {} ({}) - {}",
        entry.status.icon(),
        entry.pr.number,
        entry.pr.title,
        entry.pr.author().cyan(),
        time_open(entry.pr.created_at, now)
    )
}

/// Numbered list used by the approval prompt
pub fn render_choices(entries: &[PullEntry], now: DateTime<Utc>) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{:>3}. {} {}\n", i + 1, entry.repo, entry_line(entry, now)))
        .collect()
}

/// Parse a one-based selection into an index
pub fn parse_selection(input: &str, count: usize) -> std::result::Result<usize, String> {
    let n: usize = input
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", input.trim()))?;
    if n == 0 || n > count {
        return Err(format!("Choose a number between 1 and {}", count));
    }
    Ok(n - 1)
}

async fn approve_interactively<A>(api: &A, entries: &[PullEntry], now: DateTime<Utc>) -> Result<()>
where
    A: GitHubApi + ?Sized,
{
    if entries.is_empty() {
        println!("No pull requests to approve.");
        return Ok(());
    }

    print!("{}", render_choices(entries, now));
    let count = entries.len();
    let answer: String = Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Pull request to approve (1-{})", count))
        .validate_with(|input: &String| parse_selection(input, count).map(|_| ()))
        .interact_text()?;

    let index = parse_selection(&answer, count).map_err(Error::Usage)?;
    let chosen = &entries[index];
    approve(api, &chosen.repo, chosen.pr.number).await
}

/// Submit one approving review and report the outcome
pub async fn approve<A>(api: &A, repo: &RepoRef, number: u64) -> Result<()>
where
    A: GitHubApi + ?Sized,
{
    match api.submit_review(repo, number, ReviewEvent::Approve).await {
        Ok(()) => {
            println!("{} Approved {}#{}", "✓".green(), repo, number);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} Could not approve {}#{}", "✗".red(), repo, number);
            Err(e)
        }
    }
}
