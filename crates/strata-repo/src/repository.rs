use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use strata_lifecycle::{LifecycleAction, TransitionGuards};
use strata_store::{paths, read_json, write_json, ObjectStore};
use strata_types::{
    ActorId, Entity, EntityId, EntityStub, EntityStatus, FieldValue, LatestPointer, OrgId,
    TypeId, Visibility,
};

use crate::error::{RepoError, RepoResult};
use crate::registry::TypeRegistry;
use crate::validation::{slugify, validate_data, validate_slug, ValidationIssue};

/// Inputs for creating a new entity.
#[derive(Clone, Debug)]
pub struct CreateRequest {
    pub entity_type_id: TypeId,
    /// `None` creates a global (platform-owned) entity.
    pub organization_id: Option<OrgId>,
    pub data: BTreeMap<String, FieldValue>,
    /// Defaults to the type's `default_visibility`.
    pub visibility: Option<Visibility>,
    /// Derived from the `name` field when omitted.
    pub slug: Option<String>,
    pub actor: ActorId,
}

/// Inputs for updating a draft entity.
#[derive(Clone, Debug)]
pub struct UpdateRequest {
    pub entity_id: EntityId,
    /// The version the caller believes is current (optimistic concurrency).
    pub expected_version: u32,
    /// Shallow-merged over the existing payload; omitted keys survive.
    pub data: Option<BTreeMap<String, FieldValue>>,
    pub visibility: Option<Visibility>,
    pub slug: Option<String>,
    pub actor: ActorId,
}

/// Non-blocking advisory surfaced alongside a successful write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RepoWarning {
    /// Another entity in the same (organization, type) scope has the same
    /// display name. Slug collisions, by contrast, block the save.
    DuplicateName { name: String, existing: EntityId },
}

/// A successful create/update, with any advisory warnings.
#[derive(Clone, Debug)]
pub struct WriteOutcome {
    pub entity: Entity,
    pub warnings: Vec<RepoWarning>,
}

/// CRUD over versioned entity records.
///
/// Every write lands a new immutable version blob; the latest pointer is
/// the only mutable record and is always the final write of a path. There
/// is no distributed lock — two updates that both pass the optimistic
/// version check can race, and the loser's blob is unreachable. That lost
/// update is a documented, accepted limitation.
#[derive(Clone)]
pub struct EntityRepository {
    store: Arc<dyn ObjectStore>,
    registry: TypeRegistry,
}

impl EntityRepository {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        let registry = TypeRegistry::new(Arc::clone(&store));
        Self { store, registry }
    }

    /// The type registry sharing this repository's store.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    // ---- Create / update ----

    /// Create a new entity: version 1 blob, latest pointer, then stub.
    pub fn create(&self, req: CreateRequest) -> RepoResult<WriteOutcome> {
        let etype = self.registry.get(&req.entity_type_id)?;

        let visibility = req.visibility.unwrap_or(etype.default_visibility);
        self.check_scope(visibility, req.organization_id.as_ref(), etype.allow_public)?;

        validate_data(&etype, &req.data).map_err(RepoError::Validation)?;

        let name = display_name(&req.data);
        let slug = match req.slug {
            Some(slug) => {
                validate_slug(&slug).map_err(|i| RepoError::Validation(vec![i]))?;
                slug
            }
            None => {
                let derived = slugify(&name);
                if derived.is_empty() {
                    return Err(RepoError::Validation(vec![ValidationIssue::new(
                        "slug",
                        "cannot derive a slug; supply one or set a name",
                    )]));
                }
                derived
            }
        };

        let warnings = self.check_collisions(
            &req.entity_type_id,
            req.organization_id.as_ref(),
            &slug,
            &name,
            None,
        )?;

        // Regenerate on the (vanishingly rare) short-id collision.
        let id = loop {
            let candidate = EntityId::generate();
            if !self.store.exists(&paths::stub_path(&candidate))? {
                break candidate;
            }
        };

        let now = Utc::now();
        let entity = Entity {
            id: id.clone(),
            entity_type_id: req.entity_type_id,
            organization_id: req.organization_id,
            version: 1,
            status: EntityStatus::Draft,
            visibility,
            slug,
            data: req.data,
            created_at: now,
            updated_at: now,
            created_by: req.actor.clone(),
            updated_by: req.actor,
            approval_feedback: None,
        };

        let org = entity.organization_id;
        write_json(
            self.store.as_ref(),
            &paths::entity_version_path(visibility, org.as_ref(), &id, 1),
            &entity,
        )?;
        write_json(
            self.store.as_ref(),
            &paths::entity_latest_path(visibility, org.as_ref(), &id),
            &LatestPointer::for_entity(&entity),
        )?;
        write_json(
            self.store.as_ref(),
            &paths::stub_path(&id),
            &EntityStub::for_entity(&entity),
        )?;

        tracing::info!(entity_id = %id, type_id = %entity.entity_type_id, %visibility, "created entity");
        Ok(WriteOutcome { entity, warnings })
    }

    /// Update a draft entity, writing version N+1 as a new immutable blob.
    ///
    /// The supplied `data` is shallow-merged over the existing payload.
    /// Fails with [`RepoError::Conflict`] if `expected_version` is stale.
    pub fn update(&self, req: UpdateRequest) -> RepoResult<WriteOutcome> {
        let stub = self.load_stub(&req.entity_id)?;
        let pointer = self.load_pointer(&stub)?;

        if !pointer.status.is_editable() {
            return Err(RepoError::NotEditable {
                status: pointer.status,
            });
        }
        if req.expected_version != pointer.version {
            return Err(RepoError::Conflict {
                expected: req.expected_version,
                actual: pointer.version,
            });
        }

        let current = pointer.overlay(self.read_version_blob(&stub, pointer.version)?);
        let etype = self.registry.get(&current.entity_type_id)?;

        let visibility = req.visibility.unwrap_or(current.visibility);
        self.check_scope(visibility, stub.organization_id.as_ref(), etype.allow_public)?;

        let mut data = current.data.clone();
        if let Some(delta) = req.data {
            for (key, value) in delta {
                data.insert(key, value);
            }
        }
        validate_data(&etype, &data).map_err(RepoError::Validation)?;

        let name = display_name(&data);
        let slug = match req.slug {
            Some(slug) => {
                validate_slug(&slug).map_err(|i| RepoError::Validation(vec![i]))?;
                slug
            }
            None => current.slug.clone(),
        };
        let warnings = self.check_collisions(
            &current.entity_type_id,
            stub.organization_id.as_ref(),
            &slug,
            &name,
            Some(&req.entity_id),
        )?;

        let now = Utc::now();
        let entity = Entity {
            version: pointer.version + 1,
            visibility,
            slug,
            data,
            updated_at: now,
            updated_by: req.actor,
            approval_feedback: None,
            ..current
        };

        let org = stub.organization_id;
        if visibility != stub.visibility {
            // The entity directory moves to the new scope prefix: copy the
            // history, land the new version and pointer, then drop the old
            // directory. Not atomic; the pointer write is last on purpose.
            self.migrate_scope(&stub, visibility, &entity)?;
        } else {
            write_json(
                self.store.as_ref(),
                &paths::entity_version_path(visibility, org.as_ref(), &entity.id, entity.version),
                &entity,
            )?;
            write_json(
                self.store.as_ref(),
                &paths::entity_latest_path(visibility, org.as_ref(), &entity.id),
                &LatestPointer::for_entity(&entity),
            )?;
        }

        tracing::info!(entity_id = %entity.id, version = entity.version, "updated entity");
        Ok(WriteOutcome { entity, warnings })
    }

    /// [`Self::update`] with one automatic retry on version conflict.
    ///
    /// The retry re-reads the live version and re-applies the caller's
    /// delta; a second conflict (or a delta no longer valid against the
    /// fresh state) is surfaced to the caller.
    pub fn update_with_retry(&self, req: UpdateRequest) -> RepoResult<WriteOutcome> {
        match self.update(req.clone()) {
            Err(RepoError::Conflict { actual, .. }) => {
                tracing::debug!(entity_id = %req.entity_id, actual, "conflict; retrying once");
                self.update(UpdateRequest {
                    expected_version: actual,
                    ..req
                })
            }
            other => other,
        }
    }

    // ---- Reads ----

    /// Resolve stub → pointer → current version blob, with the pointer's
    /// mutable fields overlaid.
    pub fn get_latest(&self, id: &EntityId) -> RepoResult<Entity> {
        let stub = self.load_stub(id)?;
        let pointer = self.load_pointer(&stub)?;
        let blob = self.read_version_blob(&stub, pointer.version)?;
        Ok(pointer.overlay(blob))
    }

    /// Read one historical version blob, exactly as written.
    pub fn get_version(&self, id: &EntityId, version: u32) -> RepoResult<Entity> {
        let stub = self.load_stub(id)?;
        read_json(
            self.store.as_ref(),
            &paths::entity_version_path(
                stub.visibility,
                stub.organization_id.as_ref(),
                id,
                version,
            ),
        )?
        .ok_or(RepoError::VersionNotFound {
            entity_id: id.clone(),
            version,
        })
    }

    /// All persisted version numbers for an entity, ascending.
    pub fn list_versions(&self, id: &EntityId) -> RepoResult<Vec<u32>> {
        let stub = self.load_stub(id)?;
        let prefix =
            paths::entity_dir_prefix(stub.visibility, stub.organization_id.as_ref(), id);
        let mut versions: Vec<u32> = self
            .store
            .list(&prefix)?
            .into_iter()
            .filter_map(|path| {
                path.strip_prefix(&prefix)?
                    .strip_prefix('v')?
                    .strip_suffix(".json")?
                    .parse()
                    .ok()
            })
            .collect();
        versions.sort_unstable();
        Ok(versions)
    }

    // ---- Lifecycle ----

    /// Run a lifecycle action through the state machine, then persist the
    /// decision as a pointer-only mutation — workflow moves never grow the
    /// version history.
    pub fn transition(
        &self,
        id: &EntityId,
        action: LifecycleAction,
        feedback: Option<&str>,
        actor: &ActorId,
        has_approval_authority: bool,
    ) -> RepoResult<Entity> {
        let stub = self.load_stub(id)?;
        let pointer = self.load_pointer(&stub)?;
        let blob = self.read_version_blob(&stub, pointer.version)?;
        let current = pointer.overlay(blob.clone());

        let etype = self.registry.get(&current.entity_type_id)?;
        let guards = TransitionGuards {
            schema_valid: validate_data(&etype, &current.data).is_ok(),
            has_approval_authority,
        };
        let next = strata_lifecycle::transition(current.status, action, feedback, &guards)?;

        let new_pointer = LatestPointer {
            version: pointer.version,
            status: next,
            visibility: pointer.visibility,
            updated_at: Utc::now(),
            approval_feedback: match action {
                LifecycleAction::Reject => feedback.map(str::to_string),
                _ => None,
            },
        };
        write_json(
            self.store.as_ref(),
            &paths::entity_latest_path(stub.visibility, stub.organization_id.as_ref(), id),
            &new_pointer,
        )?;

        tracing::info!(
            entity_id = %id,
            from = %current.status,
            to = %next,
            %action,
            actor = %actor,
            "lifecycle transition"
        );
        Ok(new_pointer.overlay(blob))
    }

    /// Superadmin hard purge: removes the stub and every version blob,
    /// bypassing the state machine entirely. Authorization is the caller's
    /// responsibility.
    pub fn hard_delete(&self, id: &EntityId) -> RepoResult<()> {
        let stub = self.load_stub(id)?;
        let removed = self.store.delete_prefix(&paths::entity_dir_prefix(
            stub.visibility,
            stub.organization_id.as_ref(),
            id,
        ))?;
        self.store.delete(&paths::stub_path(id))?;
        tracing::warn!(entity_id = %id, blobs_removed = removed, "hard-deleted entity");
        Ok(())
    }

    // ---- Stubs ----

    /// Load one entity's ownership stub.
    pub fn stub(&self, id: &EntityId) -> RepoResult<EntityStub> {
        self.load_stub(id)
    }

    /// All stubs, in path order.
    pub fn stubs(&self) -> RepoResult<Vec<EntityStub>> {
        let mut stubs = Vec::new();
        for path in self.store.list("stubs/")? {
            if let Some(stub) = read_json::<EntityStub>(self.store.as_ref(), &path)? {
                stubs.push(stub);
            }
        }
        Ok(stubs)
    }

    /// Stubs of one type, without resolving any pointers.
    pub fn stubs_for_type(&self, type_id: &TypeId) -> RepoResult<Vec<EntityStub>> {
        Ok(self
            .stubs()?
            .into_iter()
            .filter(|s| &s.entity_type_id == type_id)
            .collect())
    }

    // ---- Internals ----

    fn load_stub(&self, id: &EntityId) -> RepoResult<EntityStub> {
        read_json(self.store.as_ref(), &paths::stub_path(id))?
            .ok_or_else(|| RepoError::EntityNotFound(id.clone()))
    }

    fn load_pointer(&self, stub: &EntityStub) -> RepoResult<LatestPointer> {
        let path = paths::entity_latest_path(
            stub.visibility,
            stub.organization_id.as_ref(),
            &stub.entity_id,
        );
        match read_json(self.store.as_ref(), &path)? {
            Some(pointer) => Ok(pointer),
            None => {
                tracing::warn!(entity_id = %stub.entity_id, "stub exists but pointer is missing");
                Err(RepoError::EntityNotFound(stub.entity_id.clone()))
            }
        }
    }

    fn read_version_blob(&self, stub: &EntityStub, version: u32) -> RepoResult<Entity> {
        let path = paths::entity_version_path(
            stub.visibility,
            stub.organization_id.as_ref(),
            &stub.entity_id,
            version,
        );
        match read_json(self.store.as_ref(), &path)? {
            Some(entity) => Ok(entity),
            None => {
                // Pointer-present, blob-missing is corruption, not an
                // ordinary miss; log it loudly and distinctly.
                tracing::error!(
                    entity_id = %stub.entity_id,
                    version,
                    "pointer names a version whose blob is missing"
                );
                Err(RepoError::Corrupted {
                    entity_id: stub.entity_id.clone(),
                    version,
                })
            }
        }
    }

    fn check_scope(
        &self,
        visibility: Visibility,
        org: Option<&OrgId>,
        allow_public: bool,
    ) -> RepoResult<()> {
        let mut issues = Vec::new();
        if visibility == Visibility::Public && !allow_public {
            issues.push(ValidationIssue::new(
                "visibility",
                "this type does not allow public entities",
            ));
        }
        if visibility == Visibility::Members && org.is_none() {
            issues.push(ValidationIssue::new(
                "organizationId",
                "members visibility requires an organization",
            ));
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(RepoError::Validation(issues))
        }
    }

    /// Scan live entities in the (organization, type) scope for slug and
    /// name collisions. Slug match is a hard error, name match a warning.
    /// Deleted entities free their slug.
    fn check_collisions(
        &self,
        type_id: &TypeId,
        org: Option<&OrgId>,
        slug: &str,
        name: &str,
        exclude: Option<&EntityId>,
    ) -> RepoResult<Vec<RepoWarning>> {
        let mut warnings = Vec::new();
        for stub in self.stubs_for_type(type_id)? {
            if stub.organization_id.as_ref() != org {
                continue;
            }
            if exclude == Some(&stub.entity_id) {
                continue;
            }
            let pointer = self.load_pointer(&stub)?;
            if pointer.status == EntityStatus::Deleted {
                continue;
            }
            let other = self.read_version_blob(&stub, pointer.version)?;
            if other.slug == slug {
                return Err(RepoError::DuplicateSlug {
                    slug: slug.to_string(),
                });
            }
            if !name.is_empty() && other.display_name().eq_ignore_ascii_case(name) {
                warnings.push(RepoWarning::DuplicateName {
                    name: other.display_name().to_string(),
                    existing: stub.entity_id,
                });
            }
        }
        Ok(warnings)
    }

    /// Move an entity's directory to a new visibility prefix as part of an
    /// update that changes visibility.
    fn migrate_scope(
        &self,
        stub: &EntityStub,
        visibility: Visibility,
        entity: &Entity,
    ) -> RepoResult<()> {
        let org = stub.organization_id;
        let old_prefix =
            paths::entity_dir_prefix(stub.visibility, org.as_ref(), &stub.entity_id);

        // Copy history first so the new prefix is complete before the
        // pointer lands there.
        for path in self.store.list(&old_prefix)? {
            let Some(suffix) = path.strip_prefix(&old_prefix) else {
                continue;
            };
            if suffix == "latest.json" {
                continue;
            }
            if let Some(bytes) = self.store.read(&path)? {
                let new_path = format!(
                    "{}{suffix}",
                    paths::entity_dir_prefix(visibility, org.as_ref(), &stub.entity_id)
                );
                self.store.write(&new_path, &bytes)?;
            }
        }

        write_json(
            self.store.as_ref(),
            &paths::entity_version_path(visibility, org.as_ref(), &entity.id, entity.version),
            entity,
        )?;
        write_json(
            self.store.as_ref(),
            &paths::entity_latest_path(visibility, org.as_ref(), &entity.id),
            &LatestPointer::for_entity(entity),
        )?;
        write_json(
            self.store.as_ref(),
            &paths::stub_path(&entity.id),
            &EntityStub::for_entity(entity),
        )?;
        self.store.delete_prefix(&old_prefix)?;

        tracing::info!(
            entity_id = %entity.id,
            from = %stub.visibility,
            to = %visibility,
            "migrated entity to new visibility scope"
        );
        Ok(())
    }
}

fn display_name(data: &BTreeMap<String, FieldValue>) -> String {
    data.get("name")
        .and_then(FieldValue::as_text)
        .unwrap_or("")
        .to_string()
}
