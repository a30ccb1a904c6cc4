//! Foundation types for Strata.
//!
//! This crate provides the core identifier, record, and schema types used
//! throughout the Strata system. Every other Strata crate depends on
//! `strata-types`.
//!
//! # Key Types
//!
//! - [`EntityId`] — Short base-36 entity identifier
//! - [`Entity`] — One immutable version of a structured content record
//! - [`LatestPointer`] — The single mutable record naming an entity's current version
//! - [`EntityStub`] — Minimal ownership record for O(1) org/type lookup
//! - [`EntityType`] / [`FieldDefinition`] — Runtime schema an entity conforms to
//! - [`FieldValue`] — Tagged union for the dynamic `data` payload
//! - [`SiteManifest`] / [`EntityBundle`] — Pre-aggregated, tier-scoped snapshots
//! - [`Etag`] — Content-derived fingerprint for conditional fetch

pub mod entity;
pub mod error;
pub mod etag;
pub mod id;
pub mod schema;
pub mod snapshot;
pub mod status;
pub mod value;
pub mod visibility;

pub use entity::{Entity, EntityStub, LatestPointer};
pub use error::TypeError;
pub use etag::Etag;
pub use id::{ActorId, EntityId, OrgId, TypeId};
pub use schema::{EntityType, FieldConstraints, FieldDefinition, FieldKind, FieldSection};
pub use snapshot::{BundleEntity, EntityBundle, ManifestEntityType, SiteManifest};
pub use status::EntityStatus;
pub use value::FieldValue;
pub use visibility::{AccessTier, RoleTier, Visibility};
