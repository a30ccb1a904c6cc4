use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::EntityId;
use crate::schema::FieldKind;

/// A single value in an entity's dynamic `data` payload.
///
/// The payload is schema-driven: each value must match the [`FieldKind`] of
/// the [`FieldDefinition`](crate::schema::FieldDefinition) it is stored
/// under. The tag is checked once at the write boundary (create/update),
/// never downstream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Date(DateTime<Utc>),
    /// One option out of the field's configured option list.
    Selection(String),
    /// A reference to another entity by id.
    Reference(EntityId),
    /// An opaque handle to an uploaded file (upload handling is external).
    File(String),
}

impl FieldValue {
    /// The schema kind this value satisfies.
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Number(_) => FieldKind::Number,
            Self::Boolean(_) => FieldKind::Boolean,
            Self::Date(_) => FieldKind::Date,
            Self::Selection(_) => FieldKind::Selection,
            Self::Reference(_) => FieldKind::Reference,
            Self::File(_) => FieldKind::File,
        }
    }

    /// Borrow the inner text if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The inner number if this is a `Number` value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns `true` if the value is empty for requiredness purposes.
    ///
    /// Only text-like values can be empty; every other variant always
    /// carries a value.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) | Self::Selection(s) | Self::File(s) => s.is_empty(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(FieldValue::Text("x".into()).kind(), FieldKind::Text);
        assert_eq!(FieldValue::Number(1.5).kind(), FieldKind::Number);
        assert_eq!(FieldValue::Boolean(true).kind(), FieldKind::Boolean);
        assert_eq!(
            FieldValue::Selection("a".into()).kind(),
            FieldKind::Selection
        );
    }

    #[test]
    fn tagged_serialization_shape() {
        let v = FieldValue::Text("hello".into());
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["value"], "hello");
    }

    #[test]
    fn date_roundtrip() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let v = FieldValue::Date(ts);
        let json = serde_json::to_string(&v).unwrap();
        let back: FieldValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn reference_roundtrip() {
        let id = EntityId::parse("abc1234").unwrap();
        let v = FieldValue::Reference(id.clone());
        let json = serde_json::to_string(&v).unwrap();
        let back: FieldValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FieldValue::Reference(id));
    }

    #[test]
    fn emptiness() {
        assert!(FieldValue::Text(String::new()).is_empty());
        assert!(!FieldValue::Text("x".into()).is_empty());
        assert!(!FieldValue::Number(0.0).is_empty());
        assert!(!FieldValue::Boolean(false).is_empty());
    }
}
