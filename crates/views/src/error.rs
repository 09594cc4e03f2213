use thiserror::Error;

pub type Result<T> = std::result::Result<T, ViewError>;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed document {path}: {source}")]
    Malformed {
        path: String,
        source: serde_json::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] repoatlas_storage::StorageError),
}
