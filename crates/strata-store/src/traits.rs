use crate::error::StoreResult;

/// Path-addressed blob store.
///
/// All implementations must satisfy these invariants:
/// - Paths are opaque UTF-8 keys; the store never interprets blob contents.
/// - `write` replaces any existing blob at the path (last writer wins —
///   there are no native transactions across paths).
/// - `list` returns every stored path with the given prefix, sorted, so
///   enumeration order is deterministic.
/// - Concurrent reads are always safe.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read the blob at `path`.
    ///
    /// Returns `Ok(None)` if nothing is stored there.
    /// Returns `Err` on I/O failure.
    fn read(&self, path: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Write (create or replace) the blob at `path`.
    fn write(&self, path: &str, bytes: &[u8]) -> StoreResult<()>;

    /// Delete the blob at `path`. Returns `true` if a blob existed.
    fn delete(&self, path: &str) -> StoreResult<bool>;

    /// Check whether a blob exists at `path`.
    ///
    /// Default implementation reads the blob; backends should override
    /// with a cheaper existence probe.
    fn exists(&self, path: &str) -> StoreResult<bool> {
        Ok(self.read(path)?.is_some())
    }

    /// List all stored paths starting with `prefix`, sorted.
    ///
    /// Pass `""` to list everything.
    fn list(&self, prefix: &str) -> StoreResult<Vec<String>>;

    /// Delete every blob under `prefix`. Returns the number removed.
    ///
    /// Default implementation lists then deletes one by one; not atomic.
    fn delete_prefix(&self, prefix: &str) -> StoreResult<usize> {
        let paths = self.list(prefix)?;
        let mut removed = 0;
        for path in &paths {
            if self.delete(path)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Monotonic revision counter, bumped by every mutation.
    ///
    /// Two equal revisions guarantee the store content has not changed
    /// in between, which lets readers cache derived artifacts.
    fn revision(&self) -> u64;
}
