use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::config::TimecardConfig;
use crate::errors::TimecardError;
use crate::remote;
use crate::session::Session;
use crate::types::Category;

/// Discovers the billable categories of the currently open timesheet and
/// owns navigation to its edit view.
pub struct CategoryCatalog {
    base_url: String,
    required_wait: Duration,
}

impl CategoryCatalog {
    pub fn new(config: &TimecardConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            required_wait: config.required_wait,
        }
    }

    /// Bring the timesheet grid on screen.
    ///
    /// A no-op when the grid is already visible. When the session is lost
    /// somewhere else (e.g. a mutation failed mid-form), this returns to the
    /// landing page and re-enters the edit view.
    #[instrument(skip(self, session))]
    pub async fn open_grid(&self, session: &Session) -> Result<(), TimecardError> {
        if !session.is_ready() {
            return Err(TimecardError::Navigation(
                "timesheet navigation requires an open session".into(),
            ));
        }
        let adapter = session.adapter();

        if adapter.locate(&remote::category_rows()).await?.is_some() {
            return Ok(());
        }
        if adapter
            .locate(&remote::edit_timesheet_link())
            .await?
            .is_none()
        {
            debug!("not on the landing page, navigating back");
            adapter.navigate(&self.base_url).await?;
        }
        let edit_link = adapter
            .wait_for(&remote::edit_timesheet_link(), self.required_wait)
            .await?
            .require(|| {
                TimecardError::Navigation("timesheet edit view link not found".into())
            })?;
        adapter.click(&edit_link).await?;

        adapter
            .wait_for(&remote::category_rows(), self.required_wait)
            .await?
            .require(|| {
                TimecardError::Navigation("timesheet grid did not load any charge rows".into())
            })?;
        Ok(())
    }

    /// Read one category label per eligible charge row, in page order.
    ///
    /// Separator/header rows are excluded by the row query itself. The remote
    /// table should not contain duplicates, but if it does they are dropped
    /// here, keeping the first occurrence.
    #[instrument(skip(self, session))]
    pub async fn discover(&self, session: &Session) -> Result<Vec<Category>, TimecardError> {
        self.open_grid(session).await?;
        let adapter = session.adapter();

        let rows = adapter.locate_all(&remote::category_rows()).await?;
        let mut seen = HashSet::new();
        let mut categories = Vec::new();
        for row in &rows {
            let Some(label_cell) = adapter.locate_within(row, &remote::row_label()).await? else {
                continue;
            };
            let label = adapter.read_text(&label_cell).await?.trim().to_string();
            if label.is_empty() {
                continue;
            }
            if seen.insert(label.clone()) {
                categories.push(Category::from(label));
            }
        }

        debug!(count = categories.len(), "discovered categories");
        Ok(categories)
    }
}
