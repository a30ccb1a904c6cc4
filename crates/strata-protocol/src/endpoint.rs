use strata_types::{EntityId, OrgId, TypeId};

/// Cache directives sent with every snapshot response. Clients must
/// revalidate with `If-None-Match` rather than trusting a TTL.
pub const CACHE_CONTROL_VALUE: &str = "private, max-age=0, must-revalidate";

/// HTTP endpoint paths.
///
/// Tier resolution comes from the caller's auth context on unscoped
/// routes; the `/orgs/{orgId}/` variants additionally scope by
/// organization and role tier.
pub mod endpoints {
    use super::*;

    pub const SITE_MANIFEST: &str = "/manifests/site";
    pub const HEALTH: &str = "/health";
    pub const INFO: &str = "/info";

    pub fn bundle(type_id: &TypeId) -> String {
        format!("/bundles/{type_id}")
    }

    pub fn org_manifest(org: &OrgId) -> String {
        format!("/orgs/{org}/manifests/site")
    }

    pub fn org_bundle(org: &OrgId, type_id: &TypeId) -> String {
        format!("/orgs/{org}/bundles/{type_id}")
    }

    pub fn org_entities(org: &OrgId) -> String {
        format!("/orgs/{org}/entities")
    }

    pub fn org_entity(org: &OrgId, id: &EntityId) -> String {
        format!("/orgs/{org}/entities/{id}")
    }

    pub fn transition(id: &EntityId) -> String {
        format!("/entities/{id}/transition")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_shapes() {
        let org = OrgId::new();
        let tid = TypeId::new();
        let eid = EntityId::parse("a1b2c3d").unwrap();
        assert_eq!(endpoints::SITE_MANIFEST, "/manifests/site");
        assert_eq!(endpoints::bundle(&tid), format!("/bundles/{tid}"));
        assert_eq!(
            endpoints::org_manifest(&org),
            format!("/orgs/{org}/manifests/site")
        );
        assert_eq!(
            endpoints::org_bundle(&org, &tid),
            format!("/orgs/{org}/bundles/{tid}")
        );
        assert_eq!(
            endpoints::transition(&eid),
            "/entities/a1b2c3d/transition"
        );
    }
}
