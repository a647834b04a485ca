use std::env;
use std::time::Duration;

use crate::errors::TimecardError;

/// Environment variable carrying the account identifier.
pub const ENV_ACCOUNT: &str = "TIMECLERK_EMAIL";
/// Environment variable carrying the passphrase.
pub const ENV_PASSPHRASE: &str = "TIMECLERK_PASSWORD";
/// Environment variable carrying the remote application's base URL.
pub const ENV_BASE_URL: &str = "TIMECLERK_BASE_URL";
/// Environment variable carrying the WebDriver endpoint.
pub const ENV_WEBDRIVER_URL: &str = "TIMECLERK_WEBDRIVER_URL";

const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
const DEFAULT_REQUIRED_WAIT: Duration = Duration::from_secs(10);
const DEFAULT_PROBE_WAIT: Duration = Duration::from_secs(5);
const DEFAULT_EDIT_REASON: &str = "Accidentally entered incorrect time";

/// Process configuration for a submission run.
///
/// Credentials are opaque secrets supplied from the environment; the session
/// controller fails fast with a configuration error when either is missing.
#[derive(Debug, Clone)]
pub struct TimecardConfig {
    /// Base URL of the remote timecard application.
    pub base_url: String,
    /// Account identifier typed into the login form.
    pub account: String,
    /// Passphrase typed into the login form.
    pub passphrase: String,
    /// WebDriver endpoint the bundled adapter talks to.
    pub webdriver_url: String,
    /// Upper bound for waits on required elements.
    pub required_wait: Duration,
    /// Shorter bound for probes on optional steps.
    pub probe_wait: Duration,
    /// Justification text for the optional reason step when editing.
    pub edit_reason: String,
}

impl TimecardConfig {
    /// Build a configuration from the process environment.
    ///
    /// Absent credentials are not an error here; [`Self::validate`] reports
    /// them when a session is actually about to open, so purely local
    /// operations (like editing the hours record) work unconfigured.
    pub fn from_env() -> Self {
        Self {
            base_url: env::var(ENV_BASE_URL).unwrap_or_default(),
            account: env::var(ENV_ACCOUNT).unwrap_or_default(),
            passphrase: env::var(ENV_PASSPHRASE).unwrap_or_default(),
            webdriver_url: env::var(ENV_WEBDRIVER_URL)
                .unwrap_or_else(|_| DEFAULT_WEBDRIVER_URL.to_string()),
            required_wait: DEFAULT_REQUIRED_WAIT,
            probe_wait: DEFAULT_PROBE_WAIT,
            edit_reason: DEFAULT_EDIT_REASON.to_string(),
        }
    }

    /// Check that everything a session needs is present.
    pub fn validate(&self) -> Result<(), TimecardError> {
        if self.account.is_empty() || self.passphrase.is_empty() {
            return Err(TimecardError::Configuration(format!(
                "missing {ENV_ACCOUNT} or {ENV_PASSPHRASE} in environment"
            )));
        }
        if self.base_url.is_empty() {
            return Err(TimecardError::Configuration(format!(
                "missing {ENV_BASE_URL} in environment"
            )));
        }
        Ok(())
    }
}
