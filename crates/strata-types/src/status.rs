use std::fmt;

use serde::{Deserialize, Serialize};

use crate::visibility::AccessTier;

/// Lifecycle status of an entity.
///
/// Entities are created in `Draft` and only mutable while there; every
/// other movement goes through the lifecycle state machine. `Deleted` is a
/// soft state — the versions and stub remain and the entity is restorable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Draft,
    Pending,
    Published,
    Archived,
    Deleted,
}

impl EntityStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [EntityStatus; 5] = [
        Self::Draft,
        Self::Pending,
        Self::Published,
        Self::Archived,
        Self::Deleted,
    ];

    /// Returns `true` if entity data may be edited in this status.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns `true` if entities with this status appear in snapshots
    /// built for the given tier.
    ///
    /// Public and platform tiers see published content only. Org members
    /// additionally see pending and archived items; drafts and deleted
    /// items are admin-only.
    pub fn visible_to(&self, tier: &AccessTier) -> bool {
        match tier {
            AccessTier::Public | AccessTier::Authenticated => {
                matches!(self, Self::Published)
            }
            AccessTier::Org { .. } if tier.sees_unpublished() => true,
            AccessTier::Org { .. } => !matches!(self, Self::Draft | Self::Deleted),
        }
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Pending => write!(f, "pending"),
            Self::Published => write!(f, "published"),
            Self::Archived => write!(f, "archived"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}
