//! Schema validation and slug rules.
//!
//! Validation runs once at the write boundary (create/update); nothing
//! downstream re-checks the payload.

use std::collections::BTreeMap;
use std::fmt;

use strata_types::{EntityType, FieldDefinition, FieldKind, FieldValue};

/// One field-level validation failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a data payload against its type's schema.
///
/// Checks requiredness, value kind against the field definition, and the
/// per-field constraints. Unknown keys are rejected so typos never land
/// silently in storage.
pub fn validate_data(
    entity_type: &EntityType,
    data: &BTreeMap<String, FieldValue>,
) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    for field in entity_type.required_fields() {
        match data.get(&field.id) {
            None => issues.push(ValidationIssue::new(&field.id, "required field is missing")),
            Some(v) if v.is_empty() => {
                issues.push(ValidationIssue::new(&field.id, "required field is empty"))
            }
            Some(_) => {}
        }
    }

    for (key, value) in data {
        let Some(field) = entity_type.field(key) else {
            issues.push(ValidationIssue::new(key, "unknown field"));
            continue;
        };
        if value.kind() != field.kind {
            issues.push(ValidationIssue::new(
                key,
                format!("expected {:?} value, got {:?}", field.kind, value.kind()),
            ));
            continue;
        }
        check_constraints(field, value, &mut issues);
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn check_constraints(field: &FieldDefinition, value: &FieldValue, issues: &mut Vec<ValidationIssue>) {
    let c = &field.constraints;
    match value {
        FieldValue::Text(s) | FieldValue::File(s) => {
            if let Some(max) = c.max_length {
                if s.chars().count() > max {
                    issues.push(ValidationIssue::new(
                        &field.id,
                        format!("exceeds maximum length of {max}"),
                    ));
                }
            }
        }
        FieldValue::Number(n) => {
            if let Some(min) = c.min {
                if *n < min {
                    issues.push(ValidationIssue::new(&field.id, format!("below minimum {min}")));
                }
            }
            if let Some(max) = c.max {
                if *n > max {
                    issues.push(ValidationIssue::new(&field.id, format!("above maximum {max}")));
                }
            }
        }
        FieldValue::Selection(s) => {
            if !c.options.is_empty() && !c.options.iter().any(|o| o == s) {
                issues.push(ValidationIssue::new(
                    &field.id,
                    format!("\"{s}\" is not one of the configured options"),
                ));
            }
        }
        _ => {}
    }
}

/// Derive a URL-safe slug from a display name.
///
/// Lowercases, maps runs of non-alphanumeric characters to single hyphens,
/// and trims hyphens from both ends.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Validate an explicitly supplied slug.
pub fn validate_slug(slug: &str) -> Result<(), ValidationIssue> {
    if slug.is_empty() {
        return Err(ValidationIssue::new("slug", "slug must not be empty"));
    }
    let valid = slug
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        && !slug.starts_with('-')
        && !slug.ends_with('-');
    if !valid {
        return Err(ValidationIssue::new(
            "slug",
            "slug may only contain lowercase letters, digits, and inner hyphens",
        ));
    }
    Ok(())
}
