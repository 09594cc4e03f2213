use thiserror::Error;

pub type Result<T> = std::result::Result<T, NoteError>;

#[derive(Error, Debug)]
pub enum NoteError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{what} {actual} exceeds configured limit {limit}")]
    LimitExceeded {
        what: &'static str,
        limit: usize,
        actual: usize,
    },

    #[error("Tag '{tag}' is not allowed; described tags: {allowed:?}")]
    PolicyRejected { tag: String, allowed: Vec<String> },

    #[error("Malformed document {path}: {source}")]
    Malformed {
        path: String,
        source: serde_json::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] repoatlas_storage::StorageError),
}
