use std::sync::Arc;

use chrono::{DateTime, Utc};
use strata_repo::EntityRepository;
use strata_store::{paths, ObjectStore};
use strata_types::{
    AccessTier, BundleEntity, Entity, EntityBundle, EntityStub, Etag, ManifestEntityType,
    SiteManifest, TypeId, Visibility,
};

use crate::error::{BundleError, BundleResult};

/// A freshly built bundle with its canonical serialization and ETag.
#[derive(Clone, Debug)]
pub struct BuiltBundle {
    pub bundle: EntityBundle,
    pub body: Vec<u8>,
    pub etag: Etag,
}

/// A freshly built manifest with its canonical serialization and ETag.
#[derive(Clone, Debug)]
pub struct BuiltManifest {
    pub manifest: SiteManifest,
    pub body: Vec<u8>,
    pub etag: Etag,
}

/// Builds tier-scoped bundles and manifests from per-entity storage.
///
/// Builds are pure reads with no write contention: concurrent builds of
/// the same snapshot may run redundantly but always converge on the same
/// content. `materialize_*` additionally lands the body at the snapshot's
/// canonical path.
#[derive(Clone)]
pub struct SnapshotBuilder {
    repo: EntityRepository,
    store: Arc<dyn ObjectStore>,
}

impl SnapshotBuilder {
    pub fn new(repo: EntityRepository, store: Arc<dyn ObjectStore>) -> Self {
        Self { repo, store }
    }

    /// Build the bundle for one type as seen by `tier`.
    ///
    /// Enumerates the type's stubs (scoped to the tier's org where
    /// applicable), resolves each to its latest version, filters by
    /// tier-appropriate status, and projects to the compact bundle form.
    pub fn build_bundle(&self, type_id: &TypeId, tier: &AccessTier) -> BundleResult<BuiltBundle> {
        let etype = self.repo.registry().get(type_id)?;
        if !type_available(etype.is_active, etype.allow_public, tier) {
            return Err(BundleError::TypeNotAvailable(*type_id));
        }

        let entities = self.collect_entities(type_id, tier)?;
        let generated_at = newest(entities.iter().map(|e| e.updated_at));

        let mut projected: Vec<BundleEntity> =
            entities.iter().map(BundleEntity::project).collect();
        projected.sort_by(|a, b| a.id.cmp(&b.id));

        let bundle = EntityBundle {
            type_id: *type_id,
            type_name: etype.name,
            generated_at,
            entity_count: projected.len(),
            entities: projected,
        };
        let body = serde_json::to_vec(&bundle)?;
        let etag = Etag::from_bytes(&body);
        tracing::debug!(%type_id, count = bundle.entity_count, etag = %etag, "built bundle");
        Ok(BuiltBundle { bundle, body, etag })
    }

    /// Build the site manifest for `tier`: one summary line per visible,
    /// active type. A type absent from a fresh manifest is the client's
    /// removal signal.
    pub fn build_manifest(&self, tier: &AccessTier) -> BundleResult<BuiltManifest> {
        let mut entries = Vec::new();
        for etype in self.repo.registry().list_visible(tier)? {
            let entities = self.collect_entities(&etype.id, tier)?;
            entries.push(ManifestEntityType {
                id: etype.id,
                name: etype.name,
                plural_name: etype.plural_name,
                slug: etype.slug,
                entity_count: entities.len(),
                last_updated: newest(entities.iter().map(|e| e.updated_at)),
            });
        }
        let generated_at = newest(entries.iter().map(|e| e.last_updated));

        let manifest = SiteManifest {
            generated_at,
            entity_types: entries,
        };
        let body = serde_json::to_vec(&manifest)?;
        let etag = Etag::from_bytes(&body);
        tracing::debug!(types = manifest.entity_types.len(), etag = %etag, "built manifest");
        Ok(BuiltManifest {
            manifest,
            body,
            etag,
        })
    }

    /// Build a bundle and land it at its canonical storage path.
    pub fn materialize_bundle(
        &self,
        type_id: &TypeId,
        tier: &AccessTier,
    ) -> BundleResult<BuiltBundle> {
        let built = self.build_bundle(type_id, tier)?;
        self.store
            .write(&paths::bundle_path(tier, type_id), &built.body)?;
        Ok(built)
    }

    /// Build a manifest and land it at its canonical storage path.
    pub fn materialize_manifest(&self, tier: &AccessTier) -> BundleResult<BuiltManifest> {
        let built = self.build_manifest(tier)?;
        self.store
            .write(&paths::manifest_path(tier), &built.body)?;
        Ok(built)
    }

    /// The latest versions of every entity of `type_id` the tier may see,
    /// stub-scoped and status-filtered.
    fn collect_entities(&self, type_id: &TypeId, tier: &AccessTier) -> BundleResult<Vec<Entity>> {
        let mut entities = Vec::new();
        for stub in self.repo.stubs_for_type(type_id)? {
            if !stub_in_scope(&stub, tier) {
                continue;
            }
            let entity = self.repo.get_latest(&stub.entity_id)?;
            if entity.status.visible_to(tier) {
                entities.push(entity);
            }
        }
        Ok(entities)
    }
}

/// Whether a type is served to a tier at all.
fn type_available(is_active: bool, allow_public: bool, tier: &AccessTier) -> bool {
    is_active
        && match tier {
            AccessTier::Public => allow_public,
            _ => true,
        }
}

/// Stub-level scope filter: org tiers see their organization's entities,
/// unscoped tiers see entities whose visibility admits them.
fn stub_in_scope(stub: &EntityStub, tier: &AccessTier) -> bool {
    match tier {
        AccessTier::Public => stub.visibility == Visibility::Public,
        AccessTier::Authenticated => {
            matches!(stub.visibility, Visibility::Public | Visibility::Authenticated)
        }
        AccessTier::Org { org, .. } => stub.organization_id == Some(*org),
    }
}

/// Newest timestamp in the iterator, or the UNIX epoch for an empty set —
/// deterministic either way.
fn newest(timestamps: impl Iterator<Item = DateTime<Utc>>) -> DateTime<Utc> {
    timestamps.max().unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
