use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{ActorId, EntityId, OrgId, TypeId};
use crate::status::EntityStatus;
use crate::value::FieldValue;
use crate::visibility::Visibility;

/// One immutable version of a structured content record.
///
/// A new version is always a new blob — an existing version blob is never
/// rewritten. The `data` payload uses a `BTreeMap` so serialization is
/// deterministic, which the snapshot ETag idempotence depends on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: EntityId,
    pub entity_type_id: TypeId,
    /// `None` for global (platform-owned) entities.
    pub organization_id: Option<OrgId>,
    /// 1-based, strictly increasing per entity.
    pub version: u32,
    pub status: EntityStatus,
    pub visibility: Visibility,
    pub slug: String,
    pub data: BTreeMap<String, FieldValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: ActorId,
    pub updated_by: ActorId,
    /// Reviewer feedback recorded on rejection, cleared on later edits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_feedback: Option<String>,
}

impl Entity {
    /// The entity's display name, taken from the conventional `name` field.
    pub fn display_name(&self) -> &str {
        self.data
            .get("name")
            .and_then(FieldValue::as_text)
            .unwrap_or("")
    }
}

/// Minimal ownership record enabling "find owner without scanning all orgs".
///
/// Exactly one stub exists per entity, written at first create and removed
/// only by a superadmin hard purge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityStub {
    pub entity_id: EntityId,
    pub organization_id: Option<OrgId>,
    pub entity_type_id: TypeId,
    /// Current visibility scope, kept in step with the latest pointer so
    /// the entity's storage prefix resolves without a cross-prefix search.
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
}

impl EntityStub {
    /// The stub for a freshly created entity.
    pub fn for_entity(entity: &Entity) -> Self {
        Self {
            entity_id: entity.id.clone(),
            organization_id: entity.organization_id,
            entity_type_id: entity.entity_type_id,
            visibility: entity.visibility,
            created_at: entity.created_at,
        }
    }
}

/// The single mutable record per entity, naming its current version.
///
/// `version` is monotonically non-decreasing and always equals the highest
/// version blob written. Pure workflow moves (status transitions) rewrite
/// this pointer without bumping the version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestPointer {
    pub version: u32,
    pub status: EntityStatus,
    pub visibility: Visibility,
    pub updated_at: DateTime<Utc>,
    /// Rejection feedback travels on the pointer because transitions never
    /// rewrite version blobs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_feedback: Option<String>,
}

impl LatestPointer {
    /// Derive the pointer for a freshly written entity version.
    pub fn for_entity(entity: &Entity) -> Self {
        Self {
            version: entity.version,
            status: entity.status,
            visibility: entity.visibility,
            updated_at: entity.updated_at,
            approval_feedback: entity.approval_feedback.clone(),
        }
    }

    /// Overlay the pointer's mutable fields onto a version blob.
    ///
    /// The pointer is authoritative for status, visibility, freshness, and
    /// feedback: version blobs are immutable and go stale on pure workflow
    /// moves.
    pub fn overlay(&self, mut entity: Entity) -> Entity {
        entity.status = self.status;
        entity.visibility = self.visibility;
        entity.updated_at = self.updated_at;
        entity.approval_feedback = self.approval_feedback.clone();
        entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entity() -> Entity {
        let now = Utc::now();
        let mut data = BTreeMap::new();
        data.insert("name".to_string(), FieldValue::Text("Acme".into()));
        data.insert("rating".to_string(), FieldValue::Number(4.5));
        Entity {
            id: EntityId::parse("acme001").unwrap(),
            entity_type_id: TypeId::new(),
            organization_id: Some(OrgId::new()),
            version: 1,
            status: EntityStatus::Draft,
            visibility: Visibility::Members,
            slug: "acme".into(),
            data,
            created_at: now,
            updated_at: now,
            created_by: ActorId::new("u1"),
            updated_by: ActorId::new("u1"),
            approval_feedback: None,
        }
    }

    #[test]
    fn display_name_reads_name_field() {
        let e = sample_entity();
        assert_eq!(e.display_name(), "Acme");
    }

    #[test]
    fn display_name_defaults_to_empty() {
        let mut e = sample_entity();
        e.data.remove("name");
        assert_eq!(e.display_name(), "");
    }

    #[test]
    fn pointer_mirrors_entity() {
        let e = sample_entity();
        let p = LatestPointer::for_entity(&e);
        assert_eq!(p.version, 1);
        assert_eq!(p.status, EntityStatus::Draft);
        assert_eq!(p.visibility, Visibility::Members);
        assert_eq!(p.updated_at, e.updated_at);
        assert!(p.approval_feedback.is_none());
    }

    #[test]
    fn overlay_applies_pointer_fields() {
        let e = sample_entity();
        let mut p = LatestPointer::for_entity(&e);
        p.status = EntityStatus::Pending;
        p.approval_feedback = Some("tighten the summary".into());
        p.updated_at = Utc::now();

        let merged = p.overlay(e.clone());
        assert_eq!(merged.status, EntityStatus::Pending);
        assert_eq!(merged.updated_at, p.updated_at);
        assert_eq!(
            merged.approval_feedback.as_deref(),
            Some("tighten the summary")
        );
        // Immutable fields untouched.
        assert_eq!(merged.version, e.version);
        assert_eq!(merged.data, e.data);
    }

    #[test]
    fn entity_serde_roundtrip() {
        let e = sample_entity();
        let json = serde_json::to_string(&e).unwrap();
        let back: Entity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn entity_serializes_camel_case() {
        let e = sample_entity();
        let json = serde_json::to_value(&e).unwrap();
        assert!(json.get("entityTypeId").is_some());
        assert!(json.get("organizationId").is_some());
        assert!(json.get("createdBy").is_some());
        // Absent feedback is omitted entirely.
        assert!(json.get("approvalFeedback").is_none());
    }

    #[test]
    fn data_serialization_is_deterministic() {
        let e = sample_entity();
        let a = serde_json::to_string(&e).unwrap();
        let b = serde_json::to_string(&e).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn stub_roundtrip() {
        let e = sample_entity();
        let stub = EntityStub::for_entity(&e);
        assert_eq!(stub.entity_id, e.id);
        assert_eq!(stub.visibility, e.visibility);
        let json = serde_json::to_string(&stub).unwrap();
        let back: EntityStub = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stub);
    }
}
