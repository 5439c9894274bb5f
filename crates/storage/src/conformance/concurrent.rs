use std::future::Future;
use std::sync::Arc;

use super::{expect_eq, Check};
use crate::{SpinnerStore, StoreError};

/// Number of concurrent tasks to spawn in each test.
const N: usize = 10;

pub(super) async fn run_concurrent_tests<S, F, Fut>(factory: &F) -> Vec<Check>
where
    S: SpinnerStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        Check::new(
            "concurrent",
            "concurrent_likes_on_one_code_all_count",
            concurrent_likes_on_one_code_all_count(factory).await,
        ),
        Check::new(
            "concurrent",
            "concurrent_mixed_feedback_nets_out",
            concurrent_mixed_feedback_nets_out(factory).await,
        ),
    ]
}

// ── Concurrent likes: no lost updates ───────────────────────────────────────

/// N tasks each like the same code at once. Every increment must survive.
async fn concurrent_likes_on_one_code_all_count<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SpinnerStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = Arc::new(factory().await);

    let mut handles = Vec::new();
    for _ in 0..N {
        let s = store.clone();
        handles.push(tokio::spawn(async move {
            s.adjust_scores(&["hot".to_string()], 1).await.map(|_| ())
        }));
    }

    for handle in handles {
        handle
            .await
            .map_err(|e| format!("task panic: {e}"))?
            .map_err(|e: StoreError| format!("storage error: {e}"))?;
    }

    expect_eq("net score", store.load_scores().await.get("hot"), N as i64)
}

/// N tasks like and N tasks dislike the same code; the result is zero and a
/// bystander code touched by every task ends at 2N.
async fn concurrent_mixed_feedback_nets_out<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SpinnerStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = Arc::new(factory().await);

    let mut handles = Vec::new();
    for i in 0..(2 * N) {
        let s = store.clone();
        let delta = if i % 2 == 0 { 1 } else { -1 };
        handles.push(tokio::spawn(async move {
            s.adjust_scores(&["contested".to_string()], delta).await?;
            s.adjust_scores(&["bystander".to_string()], 1).await?;
            Ok::<(), StoreError>(())
        }));
    }

    for handle in handles {
        handle
            .await
            .map_err(|e| format!("task panic: {e}"))?
            .map_err(|e: StoreError| format!("storage error: {e}"))?;
    }

    let scores = store.load_scores().await;
    expect_eq("contested", scores.get("contested"), 0)?;
    expect_eq("bystander", scores.get("bystander"), 2 * N as i64)
}
