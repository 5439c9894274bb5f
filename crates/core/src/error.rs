use slotlove_storage::StoreError;

/// Errors surfaced to callers of the spinner operations.
///
/// Notification failures never reach callers: they are logged and
/// dropped inside [`crate::notify::deliver`].
#[derive(Debug, thiserror::Error)]
pub enum SpinnerError {
    /// Single-card feedback without a category or code.
    #[error("Missing category or code")]
    MissingCategoryOrCode,

    /// The score table could not be persisted.
    #[error(transparent)]
    Store(#[from] StoreError),
}
