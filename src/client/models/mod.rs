//! GitHub REST API data models
//!
//! Only the fields the reports read are declared; serde ignores the rest.

// Nested response types are exported for tests and fixtures even where
// commands only reach them through their parent.
#![allow(unused_imports)]

mod alert;
mod compare;
mod pull;
mod release;
mod repo;
mod ruleset;
mod user;

pub use alert::{AlertDependency, AlertPackage, DependabotAlert, SecurityAdvisory, Severity};
pub use compare::{CommitDetail, CommitEntry, Comparison, GitActor};
pub use pull::{PullQuery, PullRequest, PullState, Review, ReviewEvent, ReviewState};
pub use release::Release;
pub use repo::{RepoRef, RepoSettingsPatch, Repository};
pub use ruleset::{NewRuleset, Ruleset, RulesetRule};
pub use user::SimpleUser;
