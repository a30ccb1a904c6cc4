use thiserror::Error;

/// Errors produced by object store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("empty storage path")]
    EmptyPath,

    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },

    #[error("malformed blob at {path}: {source}")]
    MalformedBlob {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization failed for {path}: {source}")]
    Serialization {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
