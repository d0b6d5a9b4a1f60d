//! Date windows used by the reports
//!
//! All ranges are inclusive on both ends and expressed in UTC.

use chrono::{DateTime, Duration, DurationRound, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Calendar quarter
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
pub enum Quarter {
    /// January through March
    #[value(name = "Q1")]
    Q1,
    /// April through June
    #[value(name = "Q2")]
    Q2,
    /// July through September
    #[value(name = "Q3")]
    Q3,
    /// October through December
    #[value(name = "Q4")]
    Q4,
}

impl Quarter {
    /// First month of the quarter (1-based)
    fn first_month(self) -> u32 {
        match self {
            Quarter::Q1 => 1,
            Quarter::Q2 => 4,
            Quarter::Q3 => 7,
            Quarter::Q4 => 10,
        }
    }
}

impl std::fmt::Display for Quarter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Q4",
        };
        f.write_str(name)
    }
}

/// Trailing analysis window for metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
pub enum Timeframe {
    /// Last 14 days
    #[value(name = "2w")]
    #[serde(rename = "2w")]
    TwoWeeks,
    /// Last 30 days
    #[value(name = "1m")]
    #[serde(rename = "1m")]
    OneMonth,
    /// Last 365 days
    #[value(name = "1y")]
    #[serde(rename = "1y")]
    OneYear,
}

impl Timeframe {
    /// Window length in days
    pub fn days(self) -> i64 {
        match self {
            Timeframe::TwoWeeks => 14,
            Timeframe::OneMonth => 30,
            Timeframe::OneYear => 365,
        }
    }

    /// Human label used in report headers
    pub fn label(self) -> &'static str {
        match self {
            Timeframe::TwoWeeks => "last 2 weeks",
            Timeframe::OneMonth => "last month",
            Timeframe::OneYear => "last year",
        }
    }
}

/// Inclusive UTC time range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Range covering a calendar quarter, ending at 23:59:59 on its last day.
    pub fn for_quarter(quarter: Quarter, year: i32) -> Result<Self> {
        let start = utc_midnight(year, quarter.first_month(), 1)?;
        let next = match quarter {
            Quarter::Q4 => utc_midnight(year + 1, 1, 1)?,
            _ => utc_midnight(year, quarter.first_month() + 3, 1)?,
        };

        Ok(Self {
            start,
            end: next - Duration::seconds(1),
        })
    }

    /// Range of the last `days` days ending at `now`.
    pub fn trailing(days: i64, now: DateTime<Utc>) -> Self {
        Self {
            start: now - Duration::days(days),
            end: now,
        }
    }

    /// Start rounded down to the hour, so runs close together share a query
    pub fn start_hour(&self) -> DateTime<Utc> {
        self.start
            .duration_trunc(Duration::hours(1))
            .unwrap_or(self.start)
    }

    /// Inclusive membership test
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }

    /// Whole days spanned by the range, never less than one
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days().max(1)
    }
}

fn utc_midnight(year: i32, month: u32, day: u32) -> Result<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .ok_or_else(|| Error::Usage(format!("invalid date {year:04}-{month:02}-{day:02}")))
}

/// Clap value parser for `--year`: exactly four ASCII digits.
pub fn parse_year(value: &str) -> std::result::Result<i32, String> {
    if value.len() != 4 || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("'{value}' is not a four-digit year"));
    }
    value
        .parse::<i32>()
        .map_err(|e| format!("'{value}' is not a valid year: {e}"))
}

/// Clap value parser for range starts: `YYYY-MM-DD` (midnight) or RFC 3339.
pub fn parse_since(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    parse_date_bound(value, false)
}

/// Clap value parser for range ends: `YYYY-MM-DD` (end of day) or RFC 3339.
pub fn parse_until(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    parse_date_bound(value, true)
}

fn parse_date_bound(value: &str, end_of_day: bool) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("'{value}' is not a date (expected YYYY-MM-DD or RFC 3339)"))?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.map(|t| t.and_utc())
        .ok_or_else(|| format!("'{value}' is out of range"))
}
