//! JSON-file backend: one pretty-printed document per table in a data directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::tables::{Code, Document, MappingTable, OptionsTable, ScoreTable};
use crate::traits::SpinnerStore;

/// Store backed by `options.json`, `scores.json` and `mapping.json` in `dir`.
///
/// Documents are re-read on every load, so edits to options or mapping on
/// disk are picked up without a restart. Score adjustments made through this
/// store are serialized by an in-process lock; other processes writing the
/// same directory can still race with it.
pub struct JsonFileStore {
    dir: PathBuf,
    scores_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            scores_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, document: Document) -> PathBuf {
        self.dir.join(document.file_name())
    }

    async fn load<T: DeserializeOwned + Default>(&self, document: Document) -> T {
        let path = self.path_for(document);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("{} document not found at {}", document, path.display());
                return T::default();
            }
            Err(e) => {
                log::warn!(
                    "could not read {} document at {}: {}; using empty table",
                    document,
                    path.display(),
                    e
                );
                return T::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                log::warn!(
                    "corrupt {} document at {}: {}; using empty table",
                    document,
                    path.display(),
                    e
                );
                T::default()
            }
        }
    }

    async fn save<T: Serialize + Sync>(
        &self,
        document: Document,
        value: &T,
    ) -> Result<(), StoreError> {
        let path = self.path_for(document);
        let body = serde_json::to_string_pretty(value)
            .map_err(|source| StoreError::Serialize { document, source })?;

        let io_error = |source| StoreError::Io {
            document,
            path: path.clone(),
            source,
        };
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(io_error)?;
        tokio::fs::write(&path, body).await.map_err(io_error)
    }
}

#[async_trait]
impl SpinnerStore for JsonFileStore {
    async fn load_options(&self) -> OptionsTable {
        self.load(Document::Options).await
    }

    async fn load_scores(&self) -> ScoreTable {
        self.load(Document::Scores).await
    }

    async fn load_mapping(&self) -> MappingTable {
        self.load(Document::Mapping).await
    }

    async fn save_options(&self, options: &OptionsTable) -> Result<(), StoreError> {
        self.save(Document::Options, options).await
    }

    async fn save_scores(&self, scores: &ScoreTable) -> Result<(), StoreError> {
        self.save(Document::Scores, scores).await
    }

    async fn save_mapping(&self, mapping: &MappingTable) -> Result<(), StoreError> {
        self.save(Document::Mapping, mapping).await
    }

    async fn adjust_scores(&self, codes: &[Code], delta: i64) -> Result<ScoreTable, StoreError> {
        let _guard = self.scores_lock.lock().await;
        let mut scores = self.load_scores().await;
        for code in codes {
            scores.adjust(code, delta);
        }
        self.save_scores(&scores).await?;
        Ok(scores)
    }
}
