//! The visibility router: canonical storage path construction.
//!
//! Every valid (kind, visibility, id) tuple maps to exactly one path under
//! one of the three scope prefixes (`public/`, `platform/`, `private/`);
//! there is no fallback search across prefixes. Path construction is pure
//! and total — the only failure mode is the documented programmer error of
//! omitting the organization for a `members`-scoped resource, which
//! panics rather than guessing a location.
//!
//! Layout:
//!
//! ```text
//! {prefix}entities/{entityId}/v{version}.json
//! {prefix}entities/{entityId}/latest.json
//! {prefix}bundles/{typeId}.json
//! {prefix}manifests/site.json
//! stubs/{entityId}.json
//! types/{typeId}.json
//! ```
//!
//! where `{prefix}` for org-private data is `private/orgs/{orgId}/`, and
//! org-scoped bundles/manifests carry an extra role segment (`member/` or
//! `admin/`) because the two role tiers see different content.

use strata_types::{AccessTier, EntityId, OrgId, TypeId, Visibility};

/// The scope prefix for entity storage under a visibility.
///
/// # Panics
///
/// Panics if `visibility` is `Members` and `org` is `None`; a
/// members-scoped resource without an organization is a programmer error.
pub fn scope_prefix(visibility: Visibility, org: Option<&OrgId>) -> String {
    match (visibility, org) {
        (Visibility::Members, Some(org)) => format!("private/orgs/{org}/"),
        (Visibility::Members, None) => {
            panic!("members-scoped path requires an organization id")
        }
        (vis, _) => vis.prefix().to_string(),
    }
}

/// Path of one immutable entity version blob.
pub fn entity_version_path(
    visibility: Visibility,
    org: Option<&OrgId>,
    id: &EntityId,
    version: u32,
) -> String {
    format!(
        "{}entities/{id}/v{version}.json",
        scope_prefix(visibility, org)
    )
}

/// Path of the entity's mutable latest pointer.
pub fn entity_latest_path(visibility: Visibility, org: Option<&OrgId>, id: &EntityId) -> String {
    format!("{}entities/{id}/latest.json", scope_prefix(visibility, org))
}

/// Prefix under which all of one entity's blobs live (for listing and
/// hard purge).
pub fn entity_dir_prefix(visibility: Visibility, org: Option<&OrgId>, id: &EntityId) -> String {
    format!("{}entities/{id}/", scope_prefix(visibility, org))
}

/// Path of an entity's ownership stub. Stubs are unscoped so ownership can
/// be resolved before the visibility prefix is known.
pub fn stub_path(id: &EntityId) -> String {
    format!("stubs/{id}.json")
}

/// Path of an entity type definition. Types carry their own visibility
/// flags and are filtered per tier at manifest build time.
pub fn type_path(id: &TypeId) -> String {
    format!("types/{id}.json")
}

/// The snapshot prefix for an access tier.
///
/// Org tiers split by role because admin snapshots include draft and
/// deleted items the member view must never contain.
fn tier_prefix(tier: &AccessTier) -> String {
    match tier {
        AccessTier::Public => Visibility::Public.prefix().to_string(),
        AccessTier::Authenticated => Visibility::Authenticated.prefix().to_string(),
        AccessTier::Org { org, role } => format!("private/orgs/{org}/{}/", role.segment()),
    }
}

/// Path of the pre-aggregated bundle for one type, scoped to a tier.
pub fn bundle_path(tier: &AccessTier, type_id: &TypeId) -> String {
    format!("{}bundles/{type_id}.json", tier_prefix(tier))
}

/// Path of the site manifest for a tier.
pub fn manifest_path(tier: &AccessTier) -> String {
    format!("{}manifests/site.json", tier_prefix(tier))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_types::RoleTier;

    fn eid() -> EntityId {
        EntityId::parse("a1b2c3d").unwrap()
    }

    #[test]
    fn public_entity_paths() {
        let id = eid();
        assert_eq!(
            entity_version_path(Visibility::Public, None, &id, 3),
            "public/entities/a1b2c3d/v3.json"
        );
        assert_eq!(
            entity_latest_path(Visibility::Public, None, &id),
            "public/entities/a1b2c3d/latest.json"
        );
    }

    #[test]
    fn platform_entity_paths() {
        let id = eid();
        assert_eq!(
            entity_version_path(Visibility::Authenticated, None, &id, 1),
            "platform/entities/a1b2c3d/v1.json"
        );
    }

    #[test]
    fn members_paths_namespace_under_org() {
        let id = eid();
        let org = OrgId::new();
        assert_eq!(
            entity_latest_path(Visibility::Members, Some(&org), &id),
            format!("private/orgs/{org}/entities/a1b2c3d/latest.json")
        );
        assert_eq!(
            entity_dir_prefix(Visibility::Members, Some(&org), &id),
            format!("private/orgs/{org}/entities/a1b2c3d/")
        );
    }

    #[test]
    #[should_panic(expected = "requires an organization")]
    fn members_path_without_org_panics() {
        entity_latest_path(Visibility::Members, None, &eid());
    }

    #[test]
    fn global_entity_ignores_org_for_public_scopes() {
        // A global entity may still be public; org presence changes nothing
        // outside the members scope.
        let id = eid();
        let org = OrgId::new();
        assert_eq!(
            entity_latest_path(Visibility::Public, Some(&org), &id),
            "public/entities/a1b2c3d/latest.json"
        );
    }

    #[test]
    fn stub_and_type_paths_are_unscoped() {
        let id = eid();
        let tid = TypeId::new();
        assert_eq!(stub_path(&id), "stubs/a1b2c3d.json");
        assert_eq!(type_path(&tid), format!("types/{tid}.json"));
    }

    #[test]
    fn snapshot_paths_per_tier() {
        let tid = TypeId::new();
        let org = OrgId::new();
        assert_eq!(
            bundle_path(&AccessTier::Public, &tid),
            format!("public/bundles/{tid}.json")
        );
        assert_eq!(
            manifest_path(&AccessTier::Authenticated),
            "platform/manifests/site.json"
        );
        assert_eq!(
            bundle_path(&AccessTier::member(org), &tid),
            format!("private/orgs/{org}/member/bundles/{tid}.json")
        );
        assert_eq!(
            manifest_path(&AccessTier::admin(org)),
            format!("private/orgs/{org}/admin/manifests/site.json")
        );
    }

    #[test]
    fn member_and_admin_snapshots_never_collide() {
        let tid = TypeId::new();
        let org = OrgId::new();
        let member = bundle_path(
            &AccessTier::Org {
                org,
                role: RoleTier::Member,
            },
            &tid,
        );
        let admin = bundle_path(
            &AccessTier::Org {
                org,
                role: RoleTier::Admin,
            },
            &tid,
        );
        assert_ne!(member, admin);
    }

    #[test]
    fn resolution_is_deterministic() {
        let id = eid();
        let org = OrgId::new();
        let a = entity_version_path(Visibility::Members, Some(&org), &id, 7);
        let b = entity_version_path(Visibility::Members, Some(&org), &id, 7);
        assert_eq!(a, b);
    }
}
