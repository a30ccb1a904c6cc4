use strata_lifecycle::LifecycleError;
use strata_store::StoreError;
use strata_types::{EntityId, EntityStatus, TypeId};
use thiserror::Error;

use crate::validation::ValidationIssue;

/// Errors produced by repository operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("entity type not found: {0}")]
    TypeNotFound(TypeId),

    #[error("version {version} of entity {entity_id} not found")]
    VersionNotFound { entity_id: EntityId, version: u32 },

    /// The pointer names a version whose blob is missing. This is storage
    /// corruption, logged and reported distinctly from an ordinary miss.
    #[error("corrupt storage: pointer for {entity_id} names v{version} but the blob is missing")]
    Corrupted { entity_id: EntityId, version: u32 },

    #[error("validation failed: {}", format_issues(.0))]
    Validation(Vec<ValidationIssue>),

    /// Slug collisions within the same (organization, type) scope block
    /// the save. Name collisions are only warnings.
    #[error("duplicate slug \"{slug}\" in this organization/type scope")]
    DuplicateSlug { slug: String },

    /// Optimistic concurrency: the caller's assumed version is stale.
    #[error("version conflict: expected v{expected}, storage has v{actual}")]
    Conflict { expected: u32, actual: u32 },

    /// Entity data is only mutable while in draft.
    #[error("entity is {status} and read-only; use a lifecycle transition")]
    NotEditable { status: EntityStatus },

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type RepoResult<T> = Result<T, RepoError>;
