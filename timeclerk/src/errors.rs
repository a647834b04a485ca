use std::fmt;

use thiserror::Error;

use crate::types::{Category, DateKey};

/// The step of a mutation protocol that a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStep {
    /// Activating the cell link on the timesheet grid.
    OpenCell,
    /// Finding the existing entry link in the cell's entry list.
    LocateEntry,
    /// Filling the hour field on the entry form.
    EnterHours,
    /// Activating the save control.
    Save,
    /// Confirming that the save left the entry form.
    ConfirmSave,
}

impl fmt::Display for MutationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationStep::OpenCell => "open-cell",
            MutationStep::LocateEntry => "locate-entry",
            MutationStep::EnterHours => "enter-hours",
            MutationStep::Save => "save",
            MutationStep::ConfirmSave => "confirm-save",
        };
        write!(f, "{name}")
    }
}

/// Errors produced while driving the remote timecard application.
///
/// Per-entry failures (`Navigation` during an entry, `Mutation`) are recorded
/// in the submission report rather than aborting the run; session-level
/// failures (`Configuration`, `Authentication`) terminate the run after
/// cleanup. Expiry of an *optional* probe (the reason prompt, the re-login
/// confirmation) is never an error.
#[derive(Debug, Error)]
pub enum TimecardError {
    /// Missing or unusable process configuration; raised before any session
    /// attempt.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Login elements unreachable within the bounded wait, or credentials
    /// rejected.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// An expected page, link or cell could not be located.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// A required step of an add/edit protocol expired or failed.
    #[error("mutation failed at {step} for '{category}' on {date}: {cause}")]
    Mutation {
        step: MutationStep,
        category: Category,
        date: DateKey,
        cause: String,
    },

    /// Transport or driver fault underneath any step.
    #[error("adapter error: {0}")]
    Adapter(String),

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid hours '{0}': hours must be a non-negative number")]
    InvalidHours(String),
}
