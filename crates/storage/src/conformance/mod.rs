//! Conformance test suite for `SpinnerStore` implementations.
//!
//! Checks documents (defaults, round trips, category order), score
//! adjustments and concurrent adjustments. Call [`run_conformance_suite`]
//! with a factory producing a fresh, empty store:
//!
//! ```ignore
//! use slotlove_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn memory_conformance() {
//!     let report = run_conformance_suite(|| async { InMemoryStore::default() }).await;
//!     assert!(report.is_clean(), "{report}");
//! }
//! ```

mod concurrent;
mod documents;
mod scores;

use std::fmt;
use std::future::Future;

use crate::SpinnerStore;

/// One named check and its outcome.
#[derive(Debug, Clone)]
pub struct Check {
    pub group: &'static str,
    pub name: &'static str,
    pub outcome: Result<(), String>,
}

impl Check {
    fn new(group: &'static str, name: &'static str, outcome: Result<(), String>) -> Self {
        Self {
            group,
            name,
            outcome,
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Every check of one suite run, in execution order.
#[derive(Debug, Clone, Default)]
pub struct ConformanceReport {
    pub checks: Vec<Check>,
}

impl ConformanceReport {
    pub fn total(&self) -> usize {
        self.checks.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|check| !check.passed())
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed = self.failures().count();
        writeln!(f, "{} of {} store checks failed", failed, self.total())?;
        for check in self.failures() {
            if let Err(message) = &check.outcome {
                writeln!(f, "  {}::{}: {}", check.group, check.name, message)?;
            }
        }
        Ok(())
    }
}

/// Run every check against stores built by `factory`, one fresh store per
/// check.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: SpinnerStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut checks = documents::run_document_tests(&factory).await;
    checks.extend(scores::run_score_tests(&factory).await);
    checks.extend(concurrent::run_concurrent_tests(&factory).await);
    ConformanceReport { checks }
}

/// Fail with a formatted message unless `left == right`.
fn expect_eq<T: PartialEq + fmt::Debug>(what: &str, left: T, right: T) -> Result<(), String> {
    if left == right {
        Ok(())
    } else {
        Err(format!("{what}: expected {right:?}, got {left:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lists_only_failures() {
        let report = ConformanceReport {
            checks: vec![
                Check::new("scores", "like_adds_one", Ok(())),
                Check::new("documents", "fresh_store_is_empty", Err("found 2 categories".into())),
            ],
        };
        assert_eq!(report.total(), 2);
        assert!(!report.is_clean());
        assert_eq!(
            report.to_string(),
            "1 of 2 store checks failed\n  documents::fresh_store_is_empty: found 2 categories\n"
        );
    }
}
