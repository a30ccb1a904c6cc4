use strata_repo::RepoError;
use strata_store::StoreError;
use strata_types::TypeId;
use thiserror::Error;

/// Errors produced while building snapshots.
#[derive(Debug, Error)]
pub enum BundleError {
    /// The type exists but is not served to the requesting tier
    /// (inactive, or public tier without `allow_public`).
    #[error("entity type {0} is not available to this tier")]
    TypeNotAvailable(TypeId),

    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type BundleResult<T> = Result<T, BundleError>;
