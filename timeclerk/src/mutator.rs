//! Executes the add and edit mutation protocols against the remote page.
//!
//! Every required step runs under a bounded wait whose expiry fails only the
//! current entry; the optional steps (the reason capture, primarily) probe
//! with a shorter bound and treat absence as normal.

use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::adapter::{ElementRef, Probe};
use crate::config::TimecardConfig;
use crate::errors::{MutationStep, TimecardError};
use crate::reconcile::{render_hours_input, ReconciliationOutcome};
use crate::remote;
use crate::session::Session;
use crate::types::{Category, DateKey, MutationResult};

/// Applies a [`ReconciliationOutcome`] to the remote timesheet.
pub struct EntryMutator {
    required_wait: Duration,
    probe_wait: Duration,
    edit_reason: String,
}

impl EntryMutator {
    pub fn new(config: &TimecardConfig) -> Self {
        Self {
            required_wait: config.required_wait,
            probe_wait: config.probe_wait,
            edit_reason: config.edit_reason.clone(),
        }
    }

    /// Read the current text of the cell for (category, date).
    ///
    /// This is the observation the reconciler decides on; it is taken fresh
    /// for every entry and never cached.
    #[instrument(skip(self, session))]
    pub async fn observe_cell(
        &self,
        session: &Session,
        category: &Category,
        date: DateKey,
    ) -> Result<String, TimecardError> {
        let cell = self.locate_cell(session, category, date).await.map_err(
            |cause| TimecardError::Navigation(format!("cell for '{category}' on {date}: {cause}")),
        )?;
        session.adapter().read_text(&cell).await
    }

    /// Apply the outcome for one entry. `Skip` performs no remote action.
    #[instrument(skip(self, session, outcome), fields(outcome = ?outcome))]
    pub async fn apply(
        &self,
        session: &Session,
        category: &Category,
        date: DateKey,
        outcome: &ReconciliationOutcome,
    ) -> Result<MutationResult, TimecardError> {
        match outcome {
            ReconciliationOutcome::Skip(reason) => {
                debug!(reason, "skipping cell");
                Ok(MutationResult::Skipped)
            }
            ReconciliationOutcome::Add(hours) => self.add(session, category, date, *hours).await,
            ReconciliationOutcome::Edit { old, new } => {
                self.edit(session, category, date, *old, *new).await
            }
        }
    }

    /// Add hours to an empty cell: activate the cell link, fill the hour
    /// field, save, and wait for the grid to come back.
    async fn add(
        &self,
        session: &Session,
        category: &Category,
        date: DateKey,
        hours: f64,
    ) -> Result<MutationResult, TimecardError> {
        let adapter = session.adapter();

        let cell = self
            .locate_cell(session, category, date)
            .await
            .map_err(|cause| self.mutation_error(MutationStep::OpenCell, category, date, cause))?;
        adapter.click(&cell).await?;

        let hours_field = adapter
            .wait_for(&remote::hours_field(), self.required_wait)
            .await?
            .require(|| {
                self.mutation_error(
                    MutationStep::EnterHours,
                    category,
                    date,
                    "entry form did not present the hour field".into(),
                )
            })?;
        adapter.clear(&hours_field).await?;
        adapter
            .type_text(&hours_field, &render_hours_input(hours))
            .await?;

        self.save(session, category, date).await?;

        // The remote gives no explicit acknowledgement; seeing the grid
        // again is the confirmation that the save completed.
        adapter
            .wait_for(&remote::category_rows(), self.required_wait)
            .await?
            .require(|| {
                self.mutation_error(
                    MutationStep::ConfirmSave,
                    category,
                    date,
                    "timesheet grid did not return after save".into(),
                )
            })?;

        debug!(%category, %date, hours, "added new entry");
        Ok(MutationResult::Added)
    }

    /// Edit a populated cell. Five steps: open the cell's entry list, pick
    /// the entry matching the old value, rewrite the hour field, save, and
    /// handle the optional reason capture.
    async fn edit(
        &self,
        session: &Session,
        category: &Category,
        date: DateKey,
        old: f64,
        new: f64,
    ) -> Result<MutationResult, TimecardError> {
        let adapter = session.adapter();

        // Step 1: the cell link showing the old value leads to the list of
        // entries recorded for that cell.
        let cell = self
            .locate_cell(session, category, date)
            .await
            .map_err(|cause| self.mutation_error(MutationStep::OpenCell, category, date, cause))?;
        adapter.click(&cell).await?;

        // Step 2: find the entry matching the old value. Exact match on the
        // integer or two-decimal rendering first; if the remote rendered the
        // number some other way, fall back to a substring match on the
        // integer portion. The fallback cannot tell apart two entries that
        // share an integer part, which is a known ambiguity of the remote's
        // formatting.
        let entry = match adapter
            .wait_for(&remote::entry_link(old), self.probe_wait)
            .await?
        {
            Probe::Found(entry) => entry,
            Probe::Absent => {
                warn!(
                    %category, %date, old,
                    "no exact entry match, falling back to integer-portion match"
                );
                adapter
                    .wait_for(&remote::entry_link_fallback(old), self.probe_wait)
                    .await?
                    .require(|| {
                        self.mutation_error(
                            MutationStep::LocateEntry,
                            category,
                            date,
                            format!("no entry link matching {old} in the cell's entry list"),
                        )
                    })?
            }
        };
        adapter.click(&entry).await?;

        // Step 3: rewrite the hour field and save.
        let hours_field = adapter
            .wait_for(&remote::hours_field(), self.required_wait)
            .await?
            .require(|| {
                self.mutation_error(
                    MutationStep::EnterHours,
                    category,
                    date,
                    "entry form did not present the hour field".into(),
                )
            })?;
        adapter.clear(&hours_field).await?;
        adapter
            .type_text(&hours_field, &render_hours_input(new))
            .await?;

        self.save(session, category, date).await?;

        // Step 4: the remote asks for a justification only when editing a
        // pre-existing value, and not always. Absence within the probe
        // window is normal.
        match adapter
            .wait_for(&remote::reason_field(), self.probe_wait)
            .await?
        {
            Probe::Found(reason) => {
                debug!("reason step present, filling justification");
                adapter.clear(&reason).await?;
                adapter.type_text(&reason, &self.edit_reason).await?;
                let confirm = adapter
                    .wait_for(&remote::reason_confirm(), self.probe_wait)
                    .await?
                    .require(|| {
                        self.mutation_error(
                            MutationStep::ConfirmSave,
                            category,
                            date,
                            "reason step has no recognizable confirm control".into(),
                        )
                    })?;
                self.click_or_force(session, &confirm).await?;
            }
            Probe::Absent => debug!("no reason step presented"),
        }

        // Step 5: done.
        debug!(%category, %date, old, new, "edited existing entry");
        Ok(MutationResult::Edited)
    }

    /// Locate the save control and activate it, forcing the activation when
    /// the control refuses a direct click (e.g. outside the viewport).
    async fn save(
        &self,
        session: &Session,
        category: &Category,
        date: DateKey,
    ) -> Result<(), TimecardError> {
        let save = session
            .adapter()
            .wait_for(&remote::save_button(), self.required_wait)
            .await?
            .require(|| {
                self.mutation_error(
                    MutationStep::Save,
                    category,
                    date,
                    "save control did not appear on the entry form".into(),
                )
            })?;
        self.click_or_force(session, &save).await
    }

    async fn click_or_force(
        &self,
        session: &Session,
        el: &ElementRef,
    ) -> Result<(), TimecardError> {
        let adapter = session.adapter();
        if let Err(e) = adapter.click(el).await {
            warn!(error = %e, "direct click rejected, forcing activation");
            adapter.force_click(el).await?;
        }
        Ok(())
    }

    /// Find the cell link for (category, date) on the timesheet grid.
    async fn locate_cell(
        &self,
        session: &Session,
        category: &Category,
        date: DateKey,
    ) -> Result<ElementRef, String> {
        let adapter = session.adapter();
        let row = adapter
            .wait_for(&remote::category_row(category), self.required_wait)
            .await
            .map_err(|e| e.to_string())?
            .found()
            .ok_or_else(|| format!("no charge row labeled '{category}'"))?;
        let cell = adapter
            .wait_within(&row, &remote::cell_link(date), self.required_wait)
            .await
            .map_err(|e| e.to_string())?
            .found()
            .ok_or_else(|| format!("no cell link for {}", date.nav_format()))?;
        Ok(cell)
    }

    fn mutation_error(
        &self,
        step: MutationStep,
        category: &Category,
        date: DateKey,
        cause: String,
    ) -> TimecardError {
        TimecardError::Mutation {
            step,
            category: category.clone(),
            date,
            cause,
        }
    }
}
