//! Drives one full submission pass: open the session, reconcile and mutate
//! each entry strictly in order, aggregate outcomes, close the session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::adapter::RemoteUiAdapter;
use crate::catalog::CategoryCatalog;
use crate::config::TimecardConfig;
use crate::errors::TimecardError;
use crate::mutator::EntryMutator;
use crate::reconcile::HourReconciler;
use crate::session::{Session, SessionController};
use crate::types::{Category, HourEntry, MutationResult, SubmissionReport};

/// Composes the session controller, catalog, reconciler and mutator into
/// one submission pass over a batch of entries.
///
/// The remote application's server-side state is not safely accessible from
/// more than one concurrent actor, so entries are processed strictly
/// sequentially within a pass, and each pass owns exactly one session.
pub struct SubmissionOrchestrator {
    controller: SessionController,
    catalog: CategoryCatalog,
    reconciler: HourReconciler,
    mutator: EntryMutator,
    cancel: Option<Arc<AtomicBool>>,
}

impl SubmissionOrchestrator {
    pub fn new(adapter: Arc<dyn RemoteUiAdapter>, config: TimecardConfig) -> Self {
        Self {
            controller: SessionController::new(adapter, config.clone()),
            catalog: CategoryCatalog::new(&config),
            reconciler: HourReconciler::new(),
            mutator: EntryMutator::new(&config),
            cancel: None,
        }
    }

    /// Install a cooperative cancellation flag. The flag is honored only at
    /// entry boundaries: an in-flight mutation finishes or fails cleanly
    /// rather than abandoning the remote session mid-form.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Run one submission pass over the entries, in caller-supplied order.
    ///
    /// Later entries for the same category/date silently override earlier
    /// observations, since each decision re-reads the remote state. Per-entry
    /// failures are recorded in the report without aborting the pass;
    /// session-level failures propagate. The session is closed exactly once
    /// on every path.
    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    pub async fn submit(&self, entries: &[HourEntry]) -> Result<SubmissionReport, TimecardError> {
        let mut session = self.controller.open().await?;
        let result = self.run_entries(&session, entries).await;
        self.controller.close(&mut session).await;
        let report = result?;
        info!(%report, "submission pass finished");
        Ok(report)
    }

    /// Discover the categories of the currently open timesheet, with the
    /// same open/close session lifecycle as a submission pass.
    pub async fn categories(&self) -> Result<Vec<Category>, TimecardError> {
        let mut session = self.controller.open().await?;
        let result = self.catalog.discover(&session).await;
        self.controller.close(&mut session).await;
        result
    }

    async fn run_entries(
        &self,
        session: &Session,
        entries: &[HourEntry],
    ) -> Result<SubmissionReport, TimecardError> {
        // One discovery pass up front opens the edit view and yields the set
        // of valid categories; entries naming anything else fail locally
        // without touching the remote.
        let categories = self.catalog.discover(session).await?;

        let mut report = SubmissionReport::default();
        for entry in entries {
            if self.cancelled() {
                info!(
                    processed = report.processed(),
                    remaining = entries.len() - report.processed(),
                    "cancellation requested, stopping at entry boundary"
                );
                break;
            }
            match self.process_entry(session, &categories, entry).await {
                Ok(result) => report.record(result),
                Err(e) => {
                    warn!(category = %entry.category, date = %entry.date, error = %e, "entry failed");
                    report.record_failure(entry.category.clone(), entry.date, e.to_string());
                }
            }
        }
        Ok(report)
    }

    async fn process_entry(
        &self,
        session: &Session,
        categories: &[Category],
        entry: &HourEntry,
    ) -> Result<MutationResult, TimecardError> {
        if !entry.hours.is_finite() || entry.hours < 0.0 {
            return Err(TimecardError::InvalidHours(entry.hours.to_string()));
        }
        if !categories.contains(&entry.category) {
            return Err(TimecardError::Navigation(format!(
                "category '{}' is not on the open timesheet",
                entry.category
            )));
        }
        // A failed mutation can leave the page mid-form; make sure the grid
        // is back before observing the next cell.
        self.catalog.open_grid(session).await?;
        let observed = self
            .mutator
            .observe_cell(session, &entry.category, entry.date)
            .await?;
        let outcome = self.reconciler.decide(&observed, entry.hours);
        self.mutator
            .apply(session, &entry.category, entry.date, &outcome)
            .await
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}
