use std::path::PathBuf;

use crate::tables::Document;

/// All errors that can be returned by a SpinnerStore implementation.
///
/// Only writes fail: missing or unreadable documents load as empty tables.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Writing a document to disk failed.
    #[error("could not write {document} document to {}: {source}", .path.display())]
    Io {
        document: Document,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A table could not be encoded as JSON.
    #[error("could not serialize {document} document: {source}")]
    Serialize {
        document: Document,
        #[source]
        source: serde_json::Error,
    },

    /// A backend-specific storage error.
    #[error("storage backend error: {0}")]
    Backend(String),
}
