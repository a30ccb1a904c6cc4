//! Versioned entity repository for Strata.
//!
//! CRUD over versioned entity records built on the object store and the
//! visibility path router: every write lands a new immutable version blob,
//! a single mutable latest pointer names the current version, and a
//! lightweight ownership stub makes org/type lookup O(1).
//!
//! The storage layer has no native transactions; consistency is
//! optimistic-version-based. An update must supply the version it believes
//! is current and is rejected with a conflict on mismatch. Pointer writes
//! are the final step of every write path, but no distributed lock exists:
//! two writers that both pass the version check can still race, which is
//! an accepted, documented limitation.
//!
//! # Modules
//!
//! - [`error`] — The repository error taxonomy
//! - [`validation`] — Schema validation and slug rules, applied once at the boundary
//! - [`registry`] — [`TypeRegistry`] for entity type definitions
//! - [`repository`] — The [`EntityRepository`] itself

pub mod error;
pub mod registry;
pub mod repository;
pub mod validation;

pub use error::{RepoError, RepoResult};
pub use registry::TypeRegistry;
pub use repository::{
    CreateRequest, EntityRepository, RepoWarning, UpdateRequest, WriteOutcome,
};
pub use validation::{slugify, validate_data, validate_slug, ValidationIssue};
