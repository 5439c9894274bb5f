//! Application state.

use std::path::PathBuf;

use slotlove_core::Spinner;
use slotlove_storage::JsonFileStore;

/// Application state shared across request handlers.
pub(crate) struct AppState {
    /// Spinner over the on-disk catalog.
    pub(crate) spinner: Spinner<JsonFileStore>,
    /// Directory holding `index.html` and the `/static` assets.
    pub(crate) static_dir: PathBuf,
}
