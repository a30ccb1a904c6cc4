use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::id::{EntityId, TypeId};
use crate::status::EntityStatus;
use crate::value::FieldValue;

/// Per-type summary line in a [`SiteManifest`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntityType {
    pub id: TypeId,
    pub name: String,
    pub plural_name: String,
    pub slug: String,
    pub entity_count: usize,
    /// Newest `updated_at` among the type's visible entities.
    pub last_updated: DateTime<Utc>,
}

/// Index of the entity types available to one tier.
///
/// One manifest exists per (visibility tier × organization) combination.
/// Absence of a type from a fresh manifest is the client's removal signal;
/// there is no explicit delete event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteManifest {
    /// Newest `last_updated` across listed types; deterministic so that
    /// rebuilding unchanged content yields identical bytes.
    pub generated_at: DateTime<Utc>,
    pub entity_types: Vec<ManifestEntityType>,
}

impl SiteManifest {
    /// Look up a type summary by id.
    pub fn entity_type(&self, id: &TypeId) -> Option<&ManifestEntityType> {
        self.entity_types.iter().find(|t| &t.id == id)
    }

    /// Ids of all listed types.
    pub fn type_ids(&self) -> Vec<TypeId> {
        self.entity_types.iter().map(|t| t.id).collect()
    }
}

/// Compacted projection of one entity inside a bundle.
///
/// The type id is inherited from the parent bundle and not repeated here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntity {
    pub id: EntityId,
    pub status: EntityStatus,
    pub name: String,
    pub slug: String,
    pub data: BTreeMap<String, FieldValue>,
    pub updated_at: DateTime<Utc>,
}

impl BundleEntity {
    /// Project a full entity down to its bundle form.
    pub fn project(entity: &Entity) -> Self {
        Self {
            id: entity.id.clone(),
            status: entity.status,
            name: entity.display_name().to_string(),
            slug: entity.slug.clone(),
            data: entity.data.clone(),
            updated_at: entity.updated_at,
        }
    }
}

/// Pre-aggregated, tier-scoped snapshot of all entities of one type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityBundle {
    pub type_id: TypeId,
    pub type_name: String,
    /// Newest `updated_at` among constituents; deterministic, see
    /// [`SiteManifest::generated_at`].
    pub generated_at: DateTime<Utc>,
    pub entity_count: usize,
    pub entities: Vec<BundleEntity>,
}

impl EntityBundle {
    /// Look up a constituent entity by slug.
    pub fn by_slug(&self, slug: &str) -> Option<&BundleEntity> {
        self.entities.iter().find(|e| e.slug == slug)
    }
}
