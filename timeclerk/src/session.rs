use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::adapter::{Probe, RemoteUiAdapter};
use crate::config::TimecardConfig;
use crate::errors::TimecardError;
use crate::remote;

/// Lifecycle of an authenticated session against the remote application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unopened,
    Authenticating,
    Ready,
    Closed,
}

/// Opaque handle to one live authenticated session.
///
/// Exactly one session exists per orchestrator run. The handle owns the
/// adapter reference for its lifetime; dependent components receive it by
/// parameter and never hold it across calls.
pub struct Session {
    adapter: Arc<dyn RemoteUiAdapter>,
    state: SessionState,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    pub(crate) fn adapter(&self) -> &dyn RemoteUiAdapter {
        self.adapter.as_ref()
    }
}

/// Establishes and tears down the authenticated session; exclusive owner of
/// the adapter's lifecycle.
pub struct SessionController {
    adapter: Arc<dyn RemoteUiAdapter>,
    config: TimecardConfig,
}

impl SessionController {
    pub fn new(adapter: Arc<dyn RemoteUiAdapter>, config: TimecardConfig) -> Self {
        Self { adapter, config }
    }

    /// Open an authenticated session.
    ///
    /// Fails with a configuration error before touching the adapter when
    /// credentials are absent; any failure while authenticating surfaces as
    /// an authentication error and the adapter resource is released before
    /// returning.
    #[instrument(skip(self))]
    pub async fn open(&self) -> Result<Session, TimecardError> {
        self.config.validate()?;

        let mut session = Session {
            adapter: self.adapter.clone(),
            state: SessionState::Unopened,
        };
        session.state = SessionState::Authenticating;

        match self.authenticate().await {
            Ok(()) => {
                session.state = SessionState::Ready;
                info!("session ready");
                Ok(session)
            }
            Err(e) => {
                session.state = SessionState::Closed;
                if let Err(shutdown_err) = self.adapter.shutdown().await {
                    warn!(error = %shutdown_err, "adapter shutdown after failed login also failed");
                }
                match e {
                    TimecardError::Configuration(_) | TimecardError::Authentication(_) => Err(e),
                    other => Err(TimecardError::Authentication(other.to_string())),
                }
            }
        }
    }

    async fn authenticate(&self) -> Result<(), TimecardError> {
        let adapter = self.adapter.as_ref();
        adapter.connect().await?;
        adapter.navigate(&self.config.base_url).await?;

        let account = adapter
            .wait_for(&remote::account_field(), self.config.required_wait)
            .await?
            .require(|| {
                TimecardError::Authentication("login form did not present an account field".into())
            })?;
        adapter.type_text(&account, &self.config.account).await?;
        let submit = adapter
            .wait_for(&remote::login_submit(), self.config.required_wait)
            .await?
            .require(|| {
                TimecardError::Authentication("login form has no submit control".into())
            })?;
        adapter.click(&submit).await?;

        let passphrase = adapter
            .wait_for(&remote::passphrase_field(), self.config.required_wait)
            .await?
            .require(|| {
                TimecardError::Authentication(
                    "login form did not present a passphrase field".into(),
                )
            })?;
        adapter
            .type_text(&passphrase, &self.config.passphrase)
            .await?;
        let submit = adapter
            .wait_for(&remote::login_submit(), self.config.required_wait)
            .await?
            .require(|| {
                TimecardError::Authentication("passphrase form has no submit control".into())
            })?;
        adapter.click(&submit).await?;

        // A transient "confirm re-login" prompt may appear after credential
        // submission. Its absence is not an error.
        match adapter
            .wait_for(&remote::relogin_confirm(), self.config.probe_wait)
            .await?
        {
            Probe::Found(confirm) => {
                debug!("dismissing re-login confirmation prompt");
                adapter.click(&confirm).await?;
            }
            Probe::Absent => debug!("no re-login confirmation prompt"),
        }

        // The landing page carries the timesheet links; reaching it is the
        // confirmation that the credentials were accepted.
        adapter
            .wait_for(&remote::edit_timesheet_link(), self.config.required_wait)
            .await?
            .require(|| {
                TimecardError::Authentication(
                    "credentials rejected or landing page did not load".into(),
                )
            })?;
        Ok(())
    }

    /// Close a session. Idempotent: a no-op on an already-closed session,
    /// and never an error — a failed teardown is logged and swallowed.
    #[instrument(skip(self, session))]
    pub async fn close(&self, session: &mut Session) {
        if session.state == SessionState::Closed {
            debug!("session already closed");
            return;
        }
        session.state = SessionState::Closed;
        if let Err(e) = session.adapter.shutdown().await {
            warn!(error = %e, "adapter shutdown failed during close");
        } else {
            info!("session closed");
        }
    }
}
