mod mutator_tests;
mod session_tests;

use std::time::Duration;

use crate::config::TimecardConfig;

// Initialize tracing for tests
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
        .with_target(true)
        .with_test_writer()
        .try_init();
}

/// Configuration pointing at the scripted fake; waits are tiny because the
/// fake resolves probes instantly.
pub fn test_config() -> TimecardConfig {
    TimecardConfig {
        base_url: "https://timecard.test".to_string(),
        account: "user@example.com".to_string(),
        passphrase: "hunter2".to_string(),
        webdriver_url: "http://localhost:9515".to_string(),
        required_wait: Duration::from_millis(50),
        probe_wait: Duration::from_millis(20),
        edit_reason: "Accidentally entered incorrect time".to_string(),
    }
}
