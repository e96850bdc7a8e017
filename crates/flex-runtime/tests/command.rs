//! Operator console lines executed against a live runtime.

#![cfg(feature = "command")]

use std::path::Path;
use std::sync::Arc;

use flex_core::ResolutionModel;
use flex_runtime::{CommandOutcome, FlexConfig, FlexRuntime, LogBridge, Slot};
use serial_test::serial;

async fn started(dir: &Path) -> FlexRuntime {
    let mut config = FlexConfig::default();
    config.resolution = ResolutionModel::Chain;
    config.storage.dir = dir.to_path_buf();

    let runtime = FlexRuntime::from_config(&config, Arc::new(LogBridge)).unwrap();
    runtime.start().await.unwrap();
    runtime
}

#[tokio::test]
#[serial]
async fn reload_reports_failure_per_slot() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = started(dir.path()).await;
    std::fs::write(runtime.store().path(Slot::Join), "not json").unwrap();

    let outcome = runtime.execute("reload all").await;
    assert!(outcome.is_error());
    let CommandOutcome::Reloaded(reports) = &outcome else {
        panic!("unexpected outcome: {outcome:?}");
    };
    assert_eq!(reports.len(), 4);
    assert_eq!(
        reports
            .iter()
            .filter(|report| report.result.is_err())
            .map(|report| report.slot)
            .collect::<Vec<_>>(),
        vec![Slot::Join]
    );

    let text = outcome.to_string();
    assert!(text.contains("Reloaded chat"));
    assert!(text.contains("Failed to reload join"));
}

#[tokio::test]
#[serial]
async fn reset_single_slot_repairs_file() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = started(dir.path()).await;
    std::fs::write(runtime.store().path(Slot::Left), "[").unwrap();

    let outcome = runtime.execute("reset left").await;
    assert!(!outcome.is_error(), "{outcome}");

    let outcome = runtime.execute("reload left").await;
    assert!(!outcome.is_error(), "{outcome}");
}

#[tokio::test]
#[serial]
async fn list_handlers_and_usage() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = started(dir.path()).await;

    match runtime.execute("list-handlers").await {
        CommandOutcome::Handlers(ids) => {
            assert_eq!(ids.len(), 6);
            assert_eq!(ids.first().map(String::as_str), Some("flex:admin"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    assert!(runtime.execute("reload everything").await.is_error());
    assert!(runtime.execute("explode").await.is_error());
    assert!(!runtime.execute("help").await.is_error());
}
