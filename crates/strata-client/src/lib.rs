//! Client SDK for Strata.
//!
//! A client holds a persisted [`ClientCache`] of manifests, entity
//! types, bundles, and entities, and keeps it current with a
//! [`SyncEngine`] that revalidates snapshots by ETag over a
//! [`RemoteTransport`]. Reads between syncs are served entirely from
//! the cache, so a client works offline with whatever it last synced.

pub mod cache;
pub mod engine;
pub mod error;
pub mod transport;

pub use cache::{
    bundle_key, tier_key, CachePersistence, CacheSnapshot, CachedBundle, CachedManifest,
    ClientCache, InMemoryPersistence, JsonFilePersistence,
};
pub use engine::{SyncEngine, SyncReport};
pub use error::{ClientError, ClientResult};
pub use transport::{HttpTransport, RemoteTransport};
