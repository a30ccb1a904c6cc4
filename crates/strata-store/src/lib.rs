//! Path-addressed blob storage for Strata.
//!
//! The object store is the foundation every other component builds on: an
//! opaque read/write/list/delete surface over JSON blobs in a durable
//! bucket. The store never interprets blob contents and offers no
//! transactions — multi-blob writes are sequenced by callers.
//!
//! The [`paths`] module is the visibility router: it maps every
//! (kind, visibility, id) tuple to exactly one canonical storage path.
//!
//! # Modules
//!
//! - [`error`] — Error types for store operations
//! - [`traits`] — The [`ObjectStore`] trait defining the storage interface
//! - [`memory`] — In-memory [`InMemoryObjectStore`] for tests and embedding
//! - [`paths`] — Pure path construction per visibility scope and tier
//! - [`json`] — Typed JSON helpers over any `ObjectStore`

pub mod error;
pub mod json;
pub mod memory;
pub mod paths;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use json::{read_json, write_json};
pub use memory::InMemoryObjectStore;
pub use traits::ObjectStore;
