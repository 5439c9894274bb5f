//! Runs the store conformance suite against both bundled backends.

use slotlove_storage::conformance::run_conformance_suite;
use slotlove_storage::{InMemoryStore, JsonFileStore};

#[tokio::test]
async fn in_memory_store_conformance() {
    let report = run_conformance_suite(|| async { InMemoryStore::default() }).await;
    assert!(report.total() > 0);
    assert!(report.is_clean(), "{report}");
}

#[tokio::test]
async fn json_file_store_conformance() {
    let report = run_conformance_suite(|| async {
        let dir = tempfile::tempdir().expect("tempdir").keep();
        JsonFileStore::new(dir)
    })
    .await;
    assert!(report.total() > 0);
    assert!(report.is_clean(), "{report}");
}

#[tokio::test]
async fn json_file_store_conformance_in_nested_missing_dir() {
    let report = run_conformance_suite(|| async {
        let dir = tempfile::tempdir().expect("tempdir").keep();
        JsonFileStore::new(dir.join("nested").join("data"))
    })
    .await;
    assert!(report.is_clean(), "{report}");
}
