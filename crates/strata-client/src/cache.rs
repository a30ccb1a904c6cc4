//! Persisted client-side snapshot cache.
//!
//! Holds the four collections a client works from between syncs:
//! manifests keyed by tier, entity types by id, bundles by
//! `{tierKey}:{typeId}`, and individually fetched entities by id. Every
//! mutation is written through to the persistence backend, and opening a
//! cache hydrates the previous session's state so reads work offline.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, RwLock};

use serde::{Deserialize, Serialize};
use strata_types::{
    AccessTier, Entity, EntityBundle, EntityId, Etag, ManifestEntityType, SiteManifest, TypeId,
};

use crate::error::ClientResult;

/// Stable string key for one manifest scope.
pub fn tier_key(tier: &AccessTier) -> String {
    match tier {
        AccessTier::Public => "public".to_string(),
        AccessTier::Authenticated => "platform".to_string(),
        AccessTier::Org { org, role } => format!("org:{org}:{role}"),
    }
}

/// Composite key for a bundle within one manifest scope.
pub fn bundle_key(tier_key: &str, type_id: &TypeId) -> String {
    format!("{tier_key}:{type_id}")
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedManifest {
    pub etag: Etag,
    pub manifest: SiteManifest,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedBundle {
    pub etag: Etag,
    pub bundle: EntityBundle,
}

/// The full persisted form of the cache.
///
/// Entity types are the per-type summaries lifted out of cached
/// manifests; entities are individually fetched full records. Both are
/// foreign-keyed to the manifests and pruned when no cached manifest
/// lists their type any more.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheSnapshot {
    pub manifests: BTreeMap<String, CachedManifest>,
    pub entity_types: BTreeMap<TypeId, ManifestEntityType>,
    pub bundles: BTreeMap<String, CachedBundle>,
    pub entities: BTreeMap<EntityId, Entity>,
}

/// Durable backing for a [`ClientCache`].
pub trait CachePersistence: Send + Sync {
    /// Load the previous session's snapshot, if any.
    fn load(&self) -> ClientResult<Option<CacheSnapshot>>;
    /// Persist the current snapshot.
    fn save(&self, snapshot: &CacheSnapshot) -> ClientResult<()>;
}

/// Persistence that keeps the snapshot in memory only. Survives reopen
/// of the same instance, not the process.
#[derive(Default)]
pub struct InMemoryPersistence {
    saved: Mutex<Option<CacheSnapshot>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CachePersistence for InMemoryPersistence {
    fn load(&self) -> ClientResult<Option<CacheSnapshot>> {
        Ok(self.saved.lock().expect("lock poisoned").clone())
    }

    fn save(&self, snapshot: &CacheSnapshot) -> ClientResult<()> {
        *self.saved.lock().expect("lock poisoned") = Some(snapshot.clone());
        Ok(())
    }
}

/// JSON-file persistence. The file is replaced atomically via a sibling
/// temp file so a crash mid-save never corrupts the previous snapshot.
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CachePersistence for JsonFilePersistence {
    fn load(&self) -> ClientResult<Option<CacheSnapshot>> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, snapshot: &CacheSnapshot) -> ClientResult<()> {
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec(snapshot)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-process view over the persisted snapshot, write-through on mutation.
pub struct ClientCache {
    state: RwLock<CacheSnapshot>,
    persistence: Box<dyn CachePersistence>,
}

impl ClientCache {
    /// Open the cache, hydrating any previously persisted snapshot.
    pub fn open(persistence: Box<dyn CachePersistence>) -> ClientResult<Self> {
        let state = persistence.load()?.unwrap_or_default();
        tracing::debug!(
            manifests = state.manifests.len(),
            bundles = state.bundles.len(),
            "cache hydrated"
        );
        Ok(Self {
            state: RwLock::new(state),
            persistence,
        })
    }

    /// An empty, memory-only cache.
    pub fn ephemeral() -> Self {
        Self {
            state: RwLock::new(CacheSnapshot::default()),
            persistence: Box::new(InMemoryPersistence::new()),
        }
    }

    // ---- Manifests ----

    pub fn manifest(&self, key: &str) -> Option<CachedManifest> {
        self.read().manifests.get(key).cloned()
    }

    pub fn put_manifest(&self, key: &str, cached: CachedManifest) -> ClientResult<()> {
        self.mutate(|s| {
            s.manifests.insert(key.to_string(), cached);
        })
    }

    // ---- Entity types ----

    pub fn entity_type(&self, id: &TypeId) -> Option<ManifestEntityType> {
        self.read().entity_types.get(id).cloned()
    }

    pub fn put_entity_type(&self, etype: ManifestEntityType) -> ClientResult<()> {
        self.mutate(|s| {
            s.entity_types.insert(etype.id, etype);
        })
    }

    /// Drop entity types and entities whose type no longer appears in any
    /// cached manifest. Returns (types removed, entities removed).
    pub fn prune_orphans(&self) -> ClientResult<(usize, usize)> {
        let mut removed = (0, 0);
        self.mutate(|s| {
            let live: std::collections::BTreeSet<TypeId> = s
                .manifests
                .values()
                .flat_map(|m| m.manifest.type_ids())
                .collect();
            let before_types = s.entity_types.len();
            s.entity_types.retain(|id, _| live.contains(id));
            let before_entities = s.entities.len();
            s.entities.retain(|_, e| live.contains(&e.entity_type_id));
            removed = (
                before_types - s.entity_types.len(),
                before_entities - s.entities.len(),
            );
        })?;
        Ok(removed)
    }

    // ---- Bundles ----

    pub fn bundle(&self, key: &str) -> Option<CachedBundle> {
        self.read().bundles.get(key).cloned()
    }

    pub fn bundle_etag(&self, key: &str) -> Option<Etag> {
        self.read().bundles.get(key).map(|b| b.etag.clone())
    }

    pub fn put_bundle(&self, key: &str, cached: CachedBundle) -> ClientResult<()> {
        self.mutate(|s| {
            s.bundles.insert(key.to_string(), cached);
        })
    }

    pub fn remove_bundle(&self, key: &str) -> ClientResult<()> {
        self.mutate(|s| {
            s.bundles.remove(key);
        })
    }

    /// Keys of all cached bundles within one manifest scope.
    pub fn bundle_keys_for_tier(&self, tier_key: &str) -> Vec<String> {
        let prefix = format!("{tier_key}:");
        self.read()
            .bundles
            .keys()
            .filter(|k| k.starts_with(&prefix))
            .cloned()
            .collect()
    }

    // ---- Entities ----

    pub fn entity(&self, id: &EntityId) -> Option<Entity> {
        self.read().entities.get(id).cloned()
    }

    pub fn put_entity(&self, entity: Entity) -> ClientResult<()> {
        self.mutate(|s| {
            s.entities.insert(entity.id.clone(), entity);
        })
    }

    /// A copy of the full snapshot, mostly for diagnostics.
    pub fn snapshot(&self) -> CacheSnapshot {
        self.read().clone()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, CacheSnapshot> {
        self.state.read().expect("lock poisoned")
    }

    fn mutate(&self, f: impl FnOnce(&mut CacheSnapshot)) -> ClientResult<()> {
        let mut state = self.state.write().expect("lock poisoned");
        f(&mut state);
        self.persistence.save(&state)
    }
}
