use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

/// In-memory, BTreeMap-based object store.
///
/// Intended for tests and embedding. Blobs are held behind a `RwLock` for
/// safe concurrent access; the ordered map makes `list` naturally sorted.
pub struct InMemoryObjectStore {
    blobs: RwLock<BTreeMap<String, Vec<u8>>>,
    revision: AtomicU64,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(BTreeMap::new()),
            revision: AtomicU64::new(0),
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored blobs.
    pub fn total_bytes(&self) -> u64 {
        self.blobs
            .read()
            .expect("lock poisoned")
            .values()
            .map(|b| b.len() as u64)
            .sum()
    }

    /// Remove all blobs from the store.
    pub fn clear(&self) {
        self.blobs.write().expect("lock poisoned").clear();
        self.revision.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, path: &str) -> StoreResult<Option<Vec<u8>>> {
        let map = self.blobs.read().expect("lock poisoned");
        Ok(map.get(path).cloned())
    }

    fn write(&self, path: &str, bytes: &[u8]) -> StoreResult<()> {
        if path.is_empty() {
            return Err(StoreError::EmptyPath);
        }
        let mut map = self.blobs.write().expect("lock poisoned");
        map.insert(path.to_string(), bytes.to_vec());
        self.revision.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn delete(&self, path: &str) -> StoreResult<bool> {
        let mut map = self.blobs.write().expect("lock poisoned");
        let existed = map.remove(path).is_some();
        if existed {
            self.revision.fetch_add(1, Ordering::SeqCst);
        }
        Ok(existed)
    }

    fn exists(&self, path: &str) -> StoreResult<bool> {
        let map = self.blobs.read().expect("lock poisoned");
        Ok(map.contains_key(path))
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let map = self.blobs.read().expect("lock poisoned");
        Ok(map
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }

    fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("blob_count", &self.len())
            .finish()
    }
}
