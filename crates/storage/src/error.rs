use std::path::PathBuf;

/// All errors that can be returned by a store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored entry could not be decoded.
    #[error("corrupt entry in {} at line {line}: {message}", path.display())]
    Corrupt {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// A record could not be encoded for storage.
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    /// A backend-specific failure (connection loss, injected fault, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}
