//! The sync engine: manifest-first conditional fetch with garbage
//! collection by absence.
//!
//! A sync revalidates the manifest, drops cached bundles whose type no
//! longer appears in it (removal is signalled purely by absence), then
//! revalidates each listed bundle with its cached ETag. Unchanged
//! content costs one 304 per snapshot and no body transfer. Each fresh
//! bundle replaces its cache entry atomically, so a failure partway
//! leaves every untouched entry at its last good state.

use std::sync::Arc;
use std::time::Duration;

use strata_protocol::FetchOutcome;
use strata_types::{Entity, EntityId, OrgId, SiteManifest};

use crate::cache::{bundle_key, CachedBundle, CachedManifest, ClientCache};
use crate::error::{ClientError, ClientResult};
use crate::transport::RemoteTransport;

/// What one sync pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Another sync was already in flight; this call did nothing.
    pub coalesced: bool,
    /// The manifest body changed and was replaced.
    pub manifest_refreshed: bool,
    pub bundles_fetched: usize,
    pub bundles_removed: usize,
}

pub struct SyncEngine {
    cache: Arc<ClientCache>,
    transport: Arc<dyn RemoteTransport>,
    /// Manifest scope this engine syncs, fixed by the transport identity.
    tier_key: String,
    sync_lock: tokio::sync::Mutex<()>,
}

impl SyncEngine {
    pub fn new(
        cache: Arc<ClientCache>,
        transport: Arc<dyn RemoteTransport>,
        tier_key: impl Into<String>,
    ) -> Self {
        Self {
            cache,
            transport,
            tier_key: tier_key.into(),
            sync_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn cache(&self) -> &ClientCache {
        &self.cache
    }

    /// Run one sync pass. `force` ignores cached ETags and refetches
    /// every snapshot.
    ///
    /// Passes never run concurrently. A plain sync that finds one
    /// already in flight coalesces into it and returns immediately; a
    /// forced sync instead waits for the in-flight pass to finish and
    /// then runs.
    pub async fn sync(&self, force: bool) -> ClientResult<SyncReport> {
        let _guard = if force {
            self.sync_lock.lock().await
        } else {
            match self.sync_lock.try_lock() {
                Ok(guard) => guard,
                Err(_) => {
                    tracing::debug!("sync already in flight, coalescing");
                    return Ok(SyncReport {
                        coalesced: true,
                        ..SyncReport::default()
                    });
                }
            }
        };
        self.sync_inner(force).await
    }

    async fn sync_inner(&self, force: bool) -> ClientResult<SyncReport> {
        let mut report = SyncReport::default();

        let cached = if force {
            None
        } else {
            self.cache.manifest(&self.tier_key)
        };
        let manifest = match self
            .transport
            .fetch_manifest(cached.as_ref().map(|c| &c.etag))
            .await?
        {
            FetchOutcome::NotModified => match cached {
                Some(cached) => cached.manifest,
                // A 304 against no cached tag is a server bug; treat the
                // manifest as empty rather than failing the whole pass.
                None => SiteManifest {
                    generated_at: chrono_epoch(),
                    entity_types: Vec::new(),
                },
            },
            FetchOutcome::Fresh { etag, value } => {
                self.cache.put_manifest(
                    &self.tier_key,
                    CachedManifest {
                        etag,
                        manifest: value.clone(),
                    },
                )?;
                report.manifest_refreshed = true;
                value
            }
        };

        report.bundles_removed = self.remove_absent(&manifest)?;

        for etype in &manifest.entity_types {
            self.cache.put_entity_type(etype.clone())?;
        }
        let (types_pruned, entities_pruned) = self.cache.prune_orphans()?;
        if types_pruned + entities_pruned > 0 {
            tracing::debug!(types_pruned, entities_pruned, "pruned orphaned cache records");
        }

        for type_id in manifest.type_ids() {
            let key = bundle_key(&self.tier_key, &type_id);
            let cached_etag = if force {
                None
            } else {
                self.cache.bundle_etag(&key)
            };
            match self
                .transport
                .fetch_bundle(&type_id, cached_etag.as_ref())
                .await?
            {
                FetchOutcome::NotModified => {}
                FetchOutcome::Fresh { etag, value } => {
                    self.cache.put_bundle(&key, CachedBundle {
                        etag,
                        bundle: value,
                    })?;
                    report.bundles_fetched += 1;
                }
            }
        }

        tracing::info!(
            tier = %self.tier_key,
            fetched = report.bundles_fetched,
            removed = report.bundles_removed,
            manifest_refreshed = report.manifest_refreshed,
            "sync complete"
        );
        Ok(report)
    }

    /// Fetch one entity's latest version and cache it.
    ///
    /// On a transport failure the last cached copy is served instead, so
    /// individual reads keep working offline. Server-side errors (a 404
    /// for an entity that no longer exists, a 403 for a foreign org)
    /// surface to the caller.
    pub async fn entity(&self, org: &OrgId, id: &EntityId) -> ClientResult<Entity> {
        match self.transport.fetch_entity(org, id).await {
            Ok(entity) => {
                self.cache.put_entity(entity.clone())?;
                Ok(entity)
            }
            Err(e @ (ClientError::Http(_) | ClientError::Transport(_))) => {
                match self.cache.entity(id) {
                    Some(cached) => {
                        tracing::warn!(error = %e, entity_id = %id, "entity fetch failed, serving cached copy");
                        Ok(cached)
                    }
                    None => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Drop cached bundles whose type is absent from the fresh manifest.
    fn remove_absent(&self, manifest: &SiteManifest) -> ClientResult<usize> {
        let live: Vec<String> = manifest
            .type_ids()
            .iter()
            .map(|tid| bundle_key(&self.tier_key, tid))
            .collect();
        let mut removed = 0;
        for key in self.cache.bundle_keys_for_tier(&self.tier_key) {
            if !live.contains(&key) {
                self.cache.remove_bundle(&key)?;
                removed += 1;
                tracing::debug!(%key, "removed bundle absent from manifest");
            }
        }
        Ok(removed)
    }

    /// Spawn a background loop syncing at a fixed interval. Failures are
    /// logged and the loop keeps going; the cache keeps serving the last
    /// good state in between.
    pub fn spawn_background(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if let Err(e) = self.sync(false).await {
                    tracing::warn!(error = %e, "background sync failed");
                }
            }
        })
    }
}

fn chrono_epoch() -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::<chrono::Utc>::UNIX_EPOCH
}
