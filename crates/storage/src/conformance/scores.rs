use std::future::Future;

use super::{expect_eq, Check};
use crate::tables::ScoreTable;
use crate::SpinnerStore;

pub(super) async fn run_score_tests<S, F, Fut>(factory: &F) -> Vec<Check>
where
    S: SpinnerStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        Check::new(
            "scores",
            "adjust_creates_unknown_codes",
            adjust_creates_unknown_codes(factory).await,
        ),
        Check::new(
            "scores",
            "duplicates_count_once_per_occurrence",
            duplicates_count_once_per_occurrence(factory).await,
        ),
        Check::new(
            "scores",
            "adjustments_accumulate_across_calls",
            adjustments_accumulate_across_calls(factory).await,
        ),
        Check::new(
            "scores",
            "adjust_persists_and_returns_full_table",
            adjust_persists_and_returns_full_table(factory).await,
        ),
        Check::new(
            "scores",
            "adjust_with_no_codes_is_a_no_op",
            adjust_with_no_codes_is_a_no_op(factory).await,
        ),
    ]
}

fn codes(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|c| c.to_string()).collect()
}

async fn adjust_creates_unknown_codes<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SpinnerStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let updated = store
        .adjust_scores(&codes(&["never-seen"]), -1)
        .await
        .map_err(|e| format!("adjust: {e}"))?;
    expect_eq("new code", updated.get("never-seen"), -1)
}

async fn duplicates_count_once_per_occurrence<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SpinnerStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let updated = store
        .adjust_scores(&codes(&["x", "x", "y", "x"]), 1)
        .await
        .map_err(|e| format!("adjust: {e}"))?;
    expect_eq("x", updated.get("x"), 3)?;
    expect_eq("y", updated.get("y"), 1)
}

async fn adjustments_accumulate_across_calls<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SpinnerStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    for _ in 0..5 {
        store
            .adjust_scores(&codes(&["x"]), 1)
            .await
            .map_err(|e| format!("like: {e}"))?;
    }
    for _ in 0..2 {
        store
            .adjust_scores(&codes(&["x"]), -1)
            .await
            .map_err(|e| format!("dislike: {e}"))?;
    }
    expect_eq("net score", store.load_scores().await.get("x"), 3)
}

async fn adjust_persists_and_returns_full_table<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SpinnerStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let seeded: ScoreTable = [("keep", 9)].into_iter().collect();
    store
        .save_scores(&seeded)
        .await
        .map_err(|e| format!("seed: {e}"))?;

    let returned = store
        .adjust_scores(&codes(&["new"]), 1)
        .await
        .map_err(|e| format!("adjust: {e}"))?;
    expect_eq("returned keep", returned.get("keep"), 9)?;
    expect_eq("returned new", returned.get("new"), 1)?;
    expect_eq("persisted", store.load_scores().await, returned)
}

async fn adjust_with_no_codes_is_a_no_op<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SpinnerStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let updated = store
        .adjust_scores(&[], 1)
        .await
        .map_err(|e| format!("adjust: {e}"))?;
    expect_eq("still empty", updated.is_empty(), true)
}
