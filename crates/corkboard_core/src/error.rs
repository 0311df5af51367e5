use thiserror::Error;

/// Unified error type for board operations
#[derive(Debug, Error)]
pub enum BoardError {
    /// Malformed input, rejected before touching the store
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// An operation targeted an id that does not exist
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// Store-level failure; the whole operation aborts, prior state is kept
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl BoardError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        BoardError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        BoardError::Validation(vec![message.into()])
    }
}

/// Result type alias for board operations
pub type Result<T> = std::result::Result<T, BoardError>;
