//! Tests for the session lifecycle against the scripted fake.

use std::sync::Arc;

use crate::errors::TimecardError;
use crate::session::{SessionController, SessionState};
use crate::tests::fake_timecard::FakeTimecard;
use crate::tests::{init_tracing, test_config};

#[tokio::test]
async fn open_authenticates_and_reaches_ready() {
    init_tracing();
    let fake = Arc::new(FakeTimecard::new().with_row("Alpha"));
    let controller = SessionController::new(fake.clone(), test_config());

    let session = controller.open().await.expect("open should succeed");
    assert!(session.is_ready());
    assert_eq!(session.state(), SessionState::Ready);

    let trace = fake.trace();
    assert!(trace.contains(&"connect".to_string()));
    assert!(trace.contains(&"type:account".to_string()));
    assert!(trace.contains(&"type:passphrase".to_string()));
    // No re-login prompt was shown, so nothing was dismissed.
    assert!(!trace.contains(&"click:relogin-yes".to_string()));
}

#[tokio::test]
async fn transient_relogin_prompt_is_dismissed() {
    init_tracing();
    let fake = Arc::new(FakeTimecard::new().with_row("Alpha").with_relogin_prompt());
    let controller = SessionController::new(fake.clone(), test_config());

    let session = controller.open().await.expect("open should succeed");
    assert!(session.is_ready());
    assert!(fake.trace().contains(&"click:relogin-yes".to_string()));
}

#[tokio::test]
async fn missing_credentials_fail_before_any_remote_call() {
    init_tracing();
    let fake = Arc::new(FakeTimecard::new());
    let mut config = test_config();
    config.passphrase.clear();
    let controller = SessionController::new(fake.clone(), config);

    let err = controller.open().await.expect_err("open should fail");
    assert!(matches!(err, TimecardError::Configuration(_)));
    assert_eq!(fake.connects(), 0);
}

#[tokio::test]
async fn unreachable_login_field_is_an_authentication_error() {
    init_tracing();
    let fake = Arc::new(FakeTimecard::new().without_account_field());
    let controller = SessionController::new(fake.clone(), test_config());

    let err = controller.open().await.expect_err("open should fail");
    assert!(matches!(err, TimecardError::Authentication(_)));
    // The adapter resource is released on the failure path.
    assert_eq!(fake.shutdowns(), 1);
}

#[tokio::test]
async fn rejected_credentials_are_an_authentication_error() {
    init_tracing();
    // The landing page never appears, which is how a rejection manifests.
    let fake = Arc::new(FakeTimecard::new().without_edit_link());
    let controller = SessionController::new(fake.clone(), test_config());

    let err = controller.open().await.expect_err("open should fail");
    assert!(matches!(err, TimecardError::Authentication(_)));
    assert_eq!(fake.shutdowns(), 1);
}

#[tokio::test]
async fn close_is_idempotent() {
    init_tracing();
    let fake = Arc::new(FakeTimecard::new().with_row("Alpha"));
    let controller = SessionController::new(fake.clone(), test_config());

    let mut session = controller.open().await.expect("open should succeed");
    controller.close(&mut session).await;
    assert_eq!(session.state(), SessionState::Closed);
    controller.close(&mut session).await;
    assert_eq!(fake.shutdowns(), 1);
}
