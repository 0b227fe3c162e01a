use std::path::PathBuf;

/// Errors from document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing location could not be read or written.
    #[error("store unavailable at {}: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The persisted content is not a valid collection.
    #[error("corrupt store: {reason}")]
    Corrupt { reason: String },

    /// A collection could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unavailable { path: path.into(), source }
    }

    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Self::Corrupt { reason: reason.into() }
    }

    /// Returns `true` for failures of the storage medium itself, as opposed
    /// to bad persisted content.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
