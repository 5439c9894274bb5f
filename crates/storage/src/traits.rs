use async_trait::async_trait;

use crate::error::StoreError;
use crate::tables::{Catalog, Code, MappingTable, OptionsTable, ScoreTable};

/// The storage trait for SlotLove option, score and mapping documents.
///
/// ## Load semantics
///
/// Loads never fail. A missing or corrupt document yields an empty table;
/// implementations log the cause and carry on, so a fresh deployment with no
/// data directory still serves requests.
///
/// ## Score updates
///
/// `adjust_scores` is the only mutation used at request time. The default
/// implementation is a plain read-modify-write of the whole table, which can
/// lose updates under concurrency. Backends that can do better override it
/// and serialize the update (see `JsonFileStore` and `InMemoryStore`).
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` to be used in axum
/// application state and across async task boundaries.
#[async_trait]
pub trait SpinnerStore: Send + Sync + 'static {
    async fn load_options(&self) -> OptionsTable;

    async fn load_scores(&self) -> ScoreTable;

    async fn load_mapping(&self) -> MappingTable;

    async fn save_options(&self, options: &OptionsTable) -> Result<(), StoreError>;

    async fn save_scores(&self, scores: &ScoreTable) -> Result<(), StoreError>;

    async fn save_mapping(&self, mapping: &MappingTable) -> Result<(), StoreError>;

    /// Add `delta` to the score of every code, once per occurrence, persist
    /// the table and return the updated snapshot.
    async fn adjust_scores(&self, codes: &[Code], delta: i64) -> Result<ScoreTable, StoreError> {
        let mut scores = self.load_scores().await;
        for code in codes {
            scores.adjust(code, delta);
        }
        self.save_scores(&scores).await?;
        Ok(scores)
    }

    /// Load all three documents as one snapshot.
    async fn load_catalog(&self) -> Catalog {
        Catalog {
            options: self.load_options().await,
            scores: self.load_scores().await,
            mapping: self.load_mapping().await,
        }
    }
}
