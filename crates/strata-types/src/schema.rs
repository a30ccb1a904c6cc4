use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::TypeId;
use crate::visibility::Visibility;

/// The kind of value a field holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    Date,
    Selection,
    Reference,
    File,
}

/// Constraints attached to a field definition.
///
/// All bounds are optional; an empty constraint set accepts any value of
/// the field's kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldConstraints {
    /// Maximum length for text-like values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Inclusive lower bound for numbers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive upper bound for numbers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Allowed options for selection fields.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// One field in an entity type's schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Key under which values are stored in `Entity.data`.
    pub id: String,
    /// Human-readable label.
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub display_order: u32,
    /// The section this field is grouped under.
    pub section_id: String,
    #[serde(default)]
    pub constraints: FieldConstraints,
}

impl FieldDefinition {
    /// A minimal definition with no constraints, for tests and builders.
    pub fn new(id: impl Into<String>, kind: FieldKind, required: bool) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            kind,
            required,
            display_order: 0,
            section_id: "main".into(),
            constraints: FieldConstraints::default(),
        }
    }
}

/// A named group of fields, for presentation ordering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSection {
    pub id: String,
    pub name: String,
    pub display_order: u32,
}

/// Schema definition that entities of one type conform to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityType {
    pub id: TypeId,
    pub name: String,
    pub plural_name: String,
    pub slug: String,
    /// Ordered by `display_order` within their sections.
    pub fields: Vec<FieldDefinition>,
    pub sections: Vec<FieldSection>,
    /// Visibility applied to new entities unless the caller overrides it.
    pub default_visibility: Visibility,
    /// Whether entities of this type may be made `public`.
    pub allow_public: bool,
    /// Inactive types are hidden from every manifest.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EntityType {
    /// Look up a field definition by id.
    pub fn field(&self, id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Iterate the required fields of this type.
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| f.required)
    }
}
