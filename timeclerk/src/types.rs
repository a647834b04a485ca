//! Common types shared across the automation components.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::TimecardError;

/// A billable category label exactly as the remote timesheet shows it.
///
/// Categories are discovered from the remote page, never invented locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A calendar date in canonical `YYYY-MM-DD` form.
///
/// The remote application's cell links carry the date in `M/D/YYYY` form
/// with no leading zeros; [`DateKey::nav_format`] performs that conversion.
/// It must be exact or the wrong cell is targeted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Parse a strict `YYYY-MM-DD` string.
    pub fn parse(s: &str) -> Result<Self, TimecardError> {
        // NaiveDate::parse_from_str tolerates unpadded fields; the canonical
        // form is exactly ten bytes.
        if s.len() != 10 {
            return Err(TimecardError::InvalidDate(s.to_string()));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| TimecardError::InvalidDate(s.to_string()))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The date as the remote navigation links render it: month/day/year
    /// with no leading zeros, e.g. `2025-01-31` becomes `1/31/2025`.
    pub fn nav_format(&self) -> String {
        format!("{}/{}/{}", self.0.month(), self.0.day(), self.0.year())
    }
}

impl FromStr for DateKey {
    type Err = TimecardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// One desired (category, date, hours) tuple supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourEntry {
    pub category: Category,
    pub date: DateKey,
    pub hours: f64,
}

impl HourEntry {
    pub fn new(category: impl Into<Category>, date: DateKey, hours: f64) -> Self {
        Self {
            category: category.into(),
            date,
            hours,
        }
    }
}

/// What a mutation actually did to the remote cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationResult {
    Skipped,
    Added,
    Edited,
}

/// A per-entry failure recorded in the submission report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryFailure {
    pub category: Category,
    pub date: DateKey,
    pub cause: String,
}

/// Aggregate outcome of one submission pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionReport {
    pub skipped: usize,
    pub added: usize,
    pub edited: usize,
    pub failed: usize,
    pub failures: Vec<EntryFailure>,
}

impl SubmissionReport {
    pub fn record(&mut self, result: MutationResult) {
        match result {
            MutationResult::Skipped => self.skipped += 1,
            MutationResult::Added => self.added += 1,
            MutationResult::Edited => self.edited += 1,
        }
    }

    pub fn record_failure(&mut self, category: Category, date: DateKey, cause: String) {
        self.failed += 1;
        self.failures.push(EntryFailure {
            category,
            date,
            cause,
        });
    }

    /// Entries that reached the remote or were deliberately skipped.
    pub fn processed(&self) -> usize {
        self.skipped + self.added + self.edited + self.failed
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for SubmissionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} skipped, {} added, {} edited, {} failed",
            self.skipped, self.added, self.edited, self.failed
        )
    }
}
