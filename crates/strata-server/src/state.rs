use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use strata_bundle::SnapshotBuilder;
use strata_repo::EntityRepository;
use strata_store::ObjectStore;
use strata_types::Etag;

/// One cached snapshot response, valid while the store is unchanged.
#[derive(Clone)]
pub struct CachedResponse {
    pub revision: u64,
    pub etag: Etag,
    pub body: Vec<u8>,
}

/// Keyed by the snapshot's canonical storage path. An entry is reusable
/// only while the store revision it was built at is still current, so a
/// stale entry can never be served after a write.
#[derive(Default)]
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CachedResponse>>,
}

impl ResponseCache {
    pub fn get(&self, key: &str, revision: u64) -> Option<CachedResponse> {
        let entries = self.entries.read().expect("lock poisoned");
        entries
            .get(key)
            .filter(|c| c.revision == revision)
            .cloned()
    }

    pub fn put(&self, key: &str, cached: CachedResponse) {
        self.entries
            .write()
            .expect("lock poisoned")
            .insert(key.to_string(), cached);
    }
}

/// Shared handler state: the repository, the snapshot builder, and the
/// per-path response cache, all over one object store.
#[derive(Clone)]
pub struct AppState {
    pub repo: EntityRepository,
    pub snapshots: SnapshotBuilder,
    pub store: Arc<dyn ObjectStore>,
    pub responses: Arc<ResponseCache>,
}

impl AppState {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        let repo = EntityRepository::new(Arc::clone(&store));
        let snapshots = SnapshotBuilder::new(repo.clone(), Arc::clone(&store));
        Self {
            repo,
            snapshots,
            store,
            responses: Arc::new(ResponseCache::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_revision_misses() {
        let cache = ResponseCache::default();
        cache.put(
            "public/manifests/site.json",
            CachedResponse {
                revision: 3,
                etag: Etag::from_bytes(b"m"),
                body: b"{}".to_vec(),
            },
        );
        assert!(cache.get("public/manifests/site.json", 3).is_some());
        assert!(cache.get("public/manifests/site.json", 4).is_none());
        assert!(cache.get("other", 3).is_none());
    }
}
