use thiserror::Error;

/// Failures of the key-value store backing history and the session id.
///
/// None of these are fatal: callers log them and fall back to empty defaults.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage contains invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage is unavailable")]
    Unavailable,
}

/// Why an avatar generation produced no record.
///
/// These never reach the user. The coordinator logs them and keeps showing
/// whatever avatar was current before the request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("no session id, avatar features are disabled")]
    MissingSession,

    #[error("image provider request failed: {0}")]
    Upstream(String),

    #[error("image provider returned no result")]
    NoResult,

    #[error("image provider returned an empty url")]
    EmptyUrl,

    #[error("avatar record store failed: {0}")]
    RecordStore(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        GenerationError::Upstream(e.to_string())
    }
}

impl From<StorageError> for GenerationError {
    fn from(e: StorageError) -> Self {
        GenerationError::RecordStore(e.to_string())
    }
}
