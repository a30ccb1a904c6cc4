//! Snapshot aggregation for Strata.
//!
//! Derives read-optimized bundles and manifests from the authoritative
//! per-entity storage, on demand rather than via event-driven
//! invalidation. Both builders are idempotent: unchanged inputs produce
//! byte-identical output and therefore an identical ETag, which is the
//! property the sync protocol's conditional fetch depends on.
//!
//! Timestamps inside snapshots derive from the newest constituent
//! `updated_at`, never from the wall clock, so a rebuild with no
//! underlying changes cannot disturb the bytes.

pub mod builder;
pub mod error;

pub use builder::{BuiltBundle, BuiltManifest, SnapshotBuilder};
pub use error::{BundleError, BundleResult};
