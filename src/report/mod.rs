//! Report pipeline shared by the commands
//!
//! Enumerate repositories, fan out per repository, then reduce the typed
//! API records into report rows. Everything here except `enumerate` and
//! `fanout` is a pure function over already fetched data.

pub mod alerts;
pub mod daterange;
pub mod enumerate;
pub mod fanout;
pub mod metrics;
pub mod pending;
pub mod pulls;
pub mod releases;

pub use daterange::{DateRange, Quarter, Timeframe};
pub use enumerate::{RepoSelector, enumerate};
pub use fanout::{FanOut, FanOutPolicy, RepoOutcome, for_each_repo};
