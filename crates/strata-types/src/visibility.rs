use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::OrgId;

/// Visibility scope of an entity, controlling where it is stored and who
/// may be served it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// World-readable, served without authentication.
    Public,
    /// Visible to any authenticated user across the platform.
    Authenticated,
    /// Private to one organization's members.
    Members,
}

impl Visibility {
    /// The canonical storage prefix for this scope.
    ///
    /// Every path produced by the router starts with one of these three
    /// prefixes; there is no fallback search across them.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Public => "public/",
            Self::Authenticated => "platform/",
            Self::Members => "private/",
        }
    }

    /// Returns `true` if resources of this scope live under an org namespace.
    pub fn is_org_scoped(&self) -> bool {
        matches!(self, Self::Members)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::Members => write!(f, "members"),
        }
    }
}

/// Role tier within an organization.
///
/// Admin snapshots include draft and deleted items that the member view
/// must never contain, so the two tiers get distinct storage paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleTier {
    Member,
    Admin,
}

impl RoleTier {
    /// Path segment distinguishing the two org-scoped snapshot sets.
    pub fn segment(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for RoleTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segment())
    }
}

/// The resolved access tier of a caller, as established by the (external)
/// auth layer. Drives both snapshot path resolution and status filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "tier")]
pub enum AccessTier {
    /// Anonymous caller: public snapshots only.
    Public,
    /// Authenticated caller without an org context: platform snapshots.
    Authenticated,
    /// Caller acting inside an organization at a given role tier.
    Org { org: OrgId, role: RoleTier },
}

impl AccessTier {
    /// Convenience constructor for an org member tier.
    pub fn member(org: OrgId) -> Self {
        Self::Org {
            org,
            role: RoleTier::Member,
        }
    }

    /// Convenience constructor for an org admin tier.
    pub fn admin(org: OrgId) -> Self {
        Self::Org {
            org,
            role: RoleTier::Admin,
        }
    }

    /// The visibility scope whose storage this tier reads from.
    pub fn visibility(&self) -> Visibility {
        match self {
            Self::Public => Visibility::Public,
            Self::Authenticated => Visibility::Authenticated,
            Self::Org { .. } => Visibility::Members,
        }
    }

    /// The organization this tier is scoped to, if any.
    pub fn org(&self) -> Option<OrgId> {
        match self {
            Self::Org { org, .. } => Some(*org),
            _ => None,
        }
    }

    /// Returns `true` if this tier sees draft and deleted items.
    pub fn sees_unpublished(&self) -> bool {
        matches!(
            self,
            Self::Org {
                role: RoleTier::Admin,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_are_distinct() {
        let prefixes = [
            Visibility::Public.prefix(),
            Visibility::Authenticated.prefix(),
            Visibility::Members.prefix(),
        ];
        assert_eq!(prefixes, ["public/", "platform/", "private/"]);
    }

    #[test]
    fn only_members_is_org_scoped() {
        assert!(!Visibility::Public.is_org_scoped());
        assert!(!Visibility::Authenticated.is_org_scoped());
        assert!(Visibility::Members.is_org_scoped());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(
            serde_json::to_string(&Visibility::Authenticated).unwrap(),
            "\"authenticated\""
        );
        let v: Visibility = serde_json::from_str("\"members\"").unwrap();
        assert_eq!(v, Visibility::Members);
    }

    #[test]
    fn tier_visibility_mapping() {
        let org = OrgId::new();
        assert_eq!(AccessTier::Public.visibility(), Visibility::Public);
        assert_eq!(
            AccessTier::Authenticated.visibility(),
            Visibility::Authenticated
        );
        assert_eq!(AccessTier::member(org).visibility(), Visibility::Members);
    }

    #[test]
    fn only_org_admin_sees_unpublished() {
        let org = OrgId::new();
        assert!(!AccessTier::Public.sees_unpublished());
        assert!(!AccessTier::Authenticated.sees_unpublished());
        assert!(!AccessTier::member(org).sees_unpublished());
        assert!(AccessTier::admin(org).sees_unpublished());
    }

    #[test]
    fn org_accessor() {
        let org = OrgId::new();
        assert_eq!(AccessTier::member(org).org(), Some(org));
        assert_eq!(AccessTier::Public.org(), None);
    }
}
