//! In-memory backend for tests and embedding.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::error::StoreError;
use crate::tables::{Catalog, Code, MappingTable, OptionsTable, ScoreTable};
use crate::traits::SpinnerStore;

/// Store that keeps all three tables in memory.
///
/// `set_read_only(true)` makes every save fail with
/// [`StoreError::Backend`], which lets callers exercise their
/// persistence-failure paths.
#[derive(Default)]
pub struct InMemoryStore {
    options: RwLock<OptionsTable>,
    scores: Mutex<ScoreTable>,
    mapping: RwLock<MappingTable>,
    read_only: AtomicBool,
}

impl InMemoryStore {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            options: RwLock::new(catalog.options),
            scores: Mutex::new(catalog.scores),
            mapping: RwLock::new(catalog.mapping),
            read_only: AtomicBool::new(false),
        }
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("store is read-only".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SpinnerStore for InMemoryStore {
    async fn load_options(&self) -> OptionsTable {
        self.options.read().await.clone()
    }

    async fn load_scores(&self) -> ScoreTable {
        self.scores.lock().await.clone()
    }

    async fn load_mapping(&self) -> MappingTable {
        self.mapping.read().await.clone()
    }

    async fn save_options(&self, options: &OptionsTable) -> Result<(), StoreError> {
        self.check_writable()?;
        *self.options.write().await = options.clone();
        Ok(())
    }

    async fn save_scores(&self, scores: &ScoreTable) -> Result<(), StoreError> {
        self.check_writable()?;
        *self.scores.lock().await = scores.clone();
        Ok(())
    }

    async fn save_mapping(&self, mapping: &MappingTable) -> Result<(), StoreError> {
        self.check_writable()?;
        *self.mapping.write().await = mapping.clone();
        Ok(())
    }

    async fn adjust_scores(&self, codes: &[Code], delta: i64) -> Result<ScoreTable, StoreError> {
        self.check_writable()?;
        let mut scores = self.scores.lock().await;
        for code in codes {
            scores.adjust(code, delta);
        }
        Ok(scores.clone())
    }
}
