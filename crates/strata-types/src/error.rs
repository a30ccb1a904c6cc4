use thiserror::Error;

/// Errors produced by type parsing and construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid entity id: {0}")]
    InvalidEntityId(String),

    #[error("invalid uuid: {0}")]
    InvalidUuid(String),

    #[error("invalid etag: {0}")]
    InvalidEtag(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
