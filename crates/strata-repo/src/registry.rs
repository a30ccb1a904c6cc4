use std::sync::Arc;

use strata_store::{paths, read_json, write_json, ObjectStore};
use strata_types::{AccessTier, EntityType, TypeId};

use crate::error::{RepoError, RepoResult};

/// Storage-backed registry of entity type definitions.
///
/// Types live at `types/{typeId}.json`, outside the visibility prefixes:
/// a definition carries its own visibility flags and is filtered per tier
/// when manifests are built.
#[derive(Clone)]
pub struct TypeRegistry {
    store: Arc<dyn ObjectStore>,
}

impl TypeRegistry {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Write (create or replace) a type definition.
    pub fn save(&self, entity_type: &EntityType) -> RepoResult<()> {
        write_json(
            self.store.as_ref(),
            &paths::type_path(&entity_type.id),
            entity_type,
        )?;
        tracing::debug!(type_id = %entity_type.id, slug = %entity_type.slug, "saved entity type");
        Ok(())
    }

    /// Load a type definition by id.
    pub fn get(&self, id: &TypeId) -> RepoResult<EntityType> {
        read_json(self.store.as_ref(), &paths::type_path(id))?
            .ok_or(RepoError::TypeNotFound(*id))
    }

    /// All stored type definitions, in path order.
    pub fn list(&self) -> RepoResult<Vec<EntityType>> {
        let mut types = Vec::new();
        for path in self.store.list("types/")? {
            if let Some(t) = read_json::<EntityType>(self.store.as_ref(), &path)? {
                types.push(t);
            }
        }
        Ok(types)
    }

    /// The active types a tier may see.
    ///
    /// Inactive types are hidden from everyone; the anonymous tier only
    /// sees types that allow public entities.
    pub fn list_visible(&self, tier: &AccessTier) -> RepoResult<Vec<EntityType>> {
        let mut types: Vec<_> = self
            .list()?
            .into_iter()
            .filter(|t| t.is_active)
            .filter(|t| match tier {
                AccessTier::Public => t.allow_public,
                _ => true,
            })
            .collect();
        types.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(types)
    }
}
