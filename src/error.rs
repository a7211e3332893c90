//! Error types shared by the stores

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("'{0}' does not yield a usable identifier")]
    Unidentifiable(String),

    #[error("unsupported media type: {0}")]
    UnsupportedMedia(String),

    #[error("upload of {size} bytes exceeds the {limit} byte limit")]
    MediaTooLarge { size: usize, limit: usize },

    #[error("admin mode is required for this operation")]
    AdminRequired,

    #[error("{count} sets requested, at most {limit} can be logged at once")]
    TooManySets { count: u32, limit: u32 },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io { path: path.into(), source }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        StoreError::Csv { path: path.into(), source }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
