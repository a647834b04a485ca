//! Tests for the add/edit mutation protocols against the scripted fake.

use std::sync::Arc;

use crate::catalog::CategoryCatalog;
use crate::errors::{MutationStep, TimecardError};
use crate::mutator::EntryMutator;
use crate::reconcile::{HourReconciler, ReconciliationOutcome};
use crate::session::{Session, SessionController};
use crate::tests::fake_timecard::FakeTimecard;
use crate::tests::{init_tracing, test_config};
use crate::types::{Category, DateKey, MutationResult};

fn date() -> DateKey {
    DateKey::parse("2025-01-31").unwrap()
}

/// Open a session and bring the timesheet grid on screen.
async fn open_on_grid(controller: &SessionController, catalog: &CategoryCatalog) -> Session {
    let session = controller.open().await.expect("open should succeed");
    catalog
        .open_grid(&session)
        .await
        .expect("grid should open");
    session
}

#[tokio::test]
async fn add_fills_the_form_and_saves() {
    init_tracing();
    let fake = Arc::new(
        FakeTimecard::new()
            .with_row("Alpha")
            .with_cell("Alpha", date(), &[]),
    );
    let config = test_config();
    let controller = SessionController::new(fake.clone(), config.clone());
    let catalog = CategoryCatalog::new(&config);
    let mutator = EntryMutator::new(&config);
    let session = open_on_grid(&controller, &catalog).await;

    let category = Category::from("Alpha");
    let observed = mutator
        .observe_cell(&session, &category, date())
        .await
        .expect("observe failed");
    let outcome = HourReconciler::new().decide(&observed, 8.0);
    assert_eq!(outcome, ReconciliationOutcome::Add(8.0));

    let result = mutator
        .apply(&session, &category, date(), &outcome)
        .await
        .expect("apply failed");
    assert_eq!(result, MutationResult::Added);
    assert_eq!(fake.cell_hours("Alpha", date()), vec![8.0]);

    let trace = fake.trace();
    let cell_click = format!("click:cell:Alpha|{}", date().nav_format());
    let start = trace
        .iter()
        .position(|t| *t == cell_click)
        .expect("cell was activated");
    assert_eq!(
        &trace[start..start + 4],
        &[
            cell_click,
            "clear:txthrs".to_string(),
            "type:txthrs:8".to_string(),
            "click:btnsave".to_string(),
        ]
    );
}

#[tokio::test]
async fn spacer_cells_read_as_empty() {
    init_tracing();
    let fake = Arc::new(
        FakeTimecard::new()
            .with_row("Alpha")
            .with_cell("Alpha", date(), &[])
            .with_empty_cell_text("\u{a0}"),
    );
    let config = test_config();
    let controller = SessionController::new(fake.clone(), config.clone());
    let catalog = CategoryCatalog::new(&config);
    let mutator = EntryMutator::new(&config);
    let session = open_on_grid(&controller, &catalog).await;

    let observed = mutator
        .observe_cell(&session, &Category::from("Alpha"), date())
        .await
        .expect("observe failed");
    assert_eq!(
        HourReconciler::new().decide(&observed, 8.0),
        ReconciliationOutcome::Add(8.0)
    );
}

#[tokio::test]
async fn skip_performs_no_remote_action() {
    init_tracing();
    let fake = Arc::new(
        FakeTimecard::new()
            .with_row("Alpha")
            .with_cell("Alpha", date(), &[8.0]),
    );
    let config = test_config();
    let controller = SessionController::new(fake.clone(), config.clone());
    let catalog = CategoryCatalog::new(&config);
    let mutator = EntryMutator::new(&config);
    let session = open_on_grid(&controller, &catalog).await;

    let before = fake.trace().len();
    let result = mutator
        .apply(
            &session,
            &Category::from("Alpha"),
            date(),
            &ReconciliationOutcome::Skip("already matches"),
        )
        .await
        .expect("apply failed");
    assert_eq!(result, MutationResult::Skipped);
    assert_eq!(fake.trace().len(), before);
}

#[tokio::test]
async fn edit_runs_the_five_step_protocol_with_reason() {
    init_tracing();
    let fake = Arc::new(
        FakeTimecard::new()
            .with_row("Alpha")
            .with_cell("Alpha", date(), &[8.0])
            .with_reason_on_edit(),
    );
    let config = test_config();
    let controller = SessionController::new(fake.clone(), config.clone());
    let catalog = CategoryCatalog::new(&config);
    let mutator = EntryMutator::new(&config);
    let session = open_on_grid(&controller, &catalog).await;

    let category = Category::from("Alpha");
    let observed = mutator
        .observe_cell(&session, &category, date())
        .await
        .expect("observe failed");
    let outcome = HourReconciler::new().decide(&observed, 6.0);
    assert_eq!(outcome, ReconciliationOutcome::Edit { old: 8.0, new: 6.0 });

    let result = mutator
        .apply(&session, &category, date(), &outcome)
        .await
        .expect("apply failed");
    assert_eq!(result, MutationResult::Edited);
    assert_eq!(fake.cell_hours("Alpha", date()), vec![6.0]);
    assert_eq!(fake.reasons(), vec![config.edit_reason.clone()]);

    let trace = fake.trace();
    let cell_click = format!("click:cell:Alpha|{}", date().nav_format());
    let start = trace
        .iter()
        .position(|t| *t == cell_click)
        .expect("cell was activated");
    assert_eq!(
        &trace[start..],
        &[
            cell_click,
            "click:entry:0".to_string(),
            "clear:txthrs".to_string(),
            "type:txthrs:6".to_string(),
            "click:btnsave".to_string(),
            "clear:txtreason".to_string(),
            format!("type:txtreason:{}", config.edit_reason),
            "click:reason-confirm".to_string(),
        ]
    );
}

#[tokio::test]
async fn edit_proceeds_when_no_reason_step_appears() {
    init_tracing();
    let fake = Arc::new(
        FakeTimecard::new()
            .with_row("Alpha")
            .with_cell("Alpha", date(), &[8.0]),
    );
    let config = test_config();
    let controller = SessionController::new(fake.clone(), config.clone());
    let catalog = CategoryCatalog::new(&config);
    let mutator = EntryMutator::new(&config);
    let session = open_on_grid(&controller, &catalog).await;

    let result = mutator
        .apply(
            &session,
            &Category::from("Alpha"),
            date(),
            &ReconciliationOutcome::Edit { old: 8.0, new: 6.0 },
        )
        .await
        .expect("apply failed");
    assert_eq!(result, MutationResult::Edited);
    assert!(fake.reasons().is_empty());
    assert_eq!(fake.cell_hours("Alpha", date()), vec![6.0]);
}

#[tokio::test]
async fn edit_falls_back_to_integer_match_on_odd_formatting() {
    init_tracing();
    // The entry link renders "8.5": neither the integer nor the two-decimal
    // form, so only the integer-portion fallback can find it.
    let fake = Arc::new(
        FakeTimecard::new()
            .with_row("Alpha")
            .with_cell_display("Alpha", date(), 8.5, "8.5"),
    );
    let config = test_config();
    let controller = SessionController::new(fake.clone(), config.clone());
    let catalog = CategoryCatalog::new(&config);
    let mutator = EntryMutator::new(&config);
    let session = open_on_grid(&controller, &catalog).await;

    let category = Category::from("Alpha");
    let observed = mutator
        .observe_cell(&session, &category, date())
        .await
        .expect("observe failed");
    let outcome = HourReconciler::new().decide(&observed, 6.0);
    assert_eq!(outcome, ReconciliationOutcome::Edit { old: 8.5, new: 6.0 });

    let result = mutator
        .apply(&session, &category, date(), &outcome)
        .await
        .expect("apply failed");
    assert_eq!(result, MutationResult::Edited);
    assert_eq!(fake.cell_hours("Alpha", date()), vec![6.0]);
}

#[tokio::test]
async fn missing_save_control_fails_the_entry_at_the_save_step() {
    init_tracing();
    let fake = Arc::new(
        FakeTimecard::new()
            .with_row("Alpha")
            .with_cell("Alpha", date(), &[])
            .without_save_for("Alpha", date()),
    );
    let config = test_config();
    let controller = SessionController::new(fake.clone(), config.clone());
    let catalog = CategoryCatalog::new(&config);
    let mutator = EntryMutator::new(&config);
    let session = open_on_grid(&controller, &catalog).await;

    let category = Category::from("Alpha");
    let err = mutator
        .apply(
            &session,
            &category,
            date(),
            &ReconciliationOutcome::Add(8.0),
        )
        .await
        .expect_err("apply should fail");
    match err {
        TimecardError::Mutation {
            step,
            category: failed_category,
            date: failed_date,
            ..
        } => {
            assert_eq!(step, MutationStep::Save);
            assert_eq!(failed_category, category);
            assert_eq!(failed_date, date());
        }
        other => panic!("expected a mutation error, got {other}"),
    }
    assert_eq!(fake.cell_hours("Alpha", date()), Vec::<f64>::new());
}

#[tokio::test]
async fn save_falls_back_to_forced_activation() {
    init_tracing();
    let fake = Arc::new(
        FakeTimecard::new()
            .with_row("Alpha")
            .with_cell("Alpha", date(), &[])
            .with_rejecting_save_click(),
    );
    let config = test_config();
    let controller = SessionController::new(fake.clone(), config.clone());
    let catalog = CategoryCatalog::new(&config);
    let mutator = EntryMutator::new(&config);
    let session = open_on_grid(&controller, &catalog).await;

    let result = mutator
        .apply(
            &session,
            &Category::from("Alpha"),
            date(),
            &ReconciliationOutcome::Add(8.0),
        )
        .await
        .expect("apply failed");
    assert_eq!(result, MutationResult::Added);
    assert!(fake.trace().contains(&"force-click:btnsave".to_string()));
    assert_eq!(fake.cell_hours("Alpha", date()), vec![8.0]);
}
