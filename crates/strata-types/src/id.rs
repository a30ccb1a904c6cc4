use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypeError;

/// Length of a generated entity id.
pub const ENTITY_ID_LEN: usize = 7;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Short base-36 identifier for an entity.
///
/// Seven characters drawn from `[0-9a-z]`, generated at first write and
/// stable across every subsequent version of the entity. Short ids keep
/// storage paths and client URLs compact while leaving ~78 billion
/// combinations, which is ample for a per-platform namespace.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Generate a fresh random entity id.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let id: String = (0..ENTITY_ID_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        Self(id)
    }

    /// Parse and validate an entity id.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s.len() != ENTITY_ID_LEN {
            return Err(TypeError::InvalidEntityId(format!(
                "expected {ENTITY_ID_LEN} characters, got {}",
                s.len()
            )));
        }
        if !s.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_lowercase()) {
            return Err(TypeError::InvalidEntityId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Mint a new time-ordered (v7) id.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wrap an existing uuid.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parse from the canonical hyphenated form.
            pub fn parse(s: &str) -> Result<Self, TypeError> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| TypeError::InvalidUuid(e.to_string()))
            }

            /// The underlying uuid.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

uuid_id! {
    /// Identifier for an organization (tenant).
    OrgId
}

uuid_id! {
    /// Identifier for an entity type (schema definition).
    TypeId
}

/// Identifier for the acting user on a write.
///
/// Opaque to the core — issued and interpreted by the (external) auth layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_is_valid() {
        for _ in 0..100 {
            let id = EntityId::generate();
            assert_eq!(id.as_str().len(), ENTITY_ID_LEN);
            EntityId::parse(id.as_str()).expect("generated id should parse");
        }
    }

    #[test]
    fn generated_ids_are_distinct() {
        let a = EntityId::generate();
        let b = EntityId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!(EntityId::parse("abc").is_err());
        assert!(EntityId::parse("abcdefgh").is_err());
    }

    #[test]
    fn parse_rejects_invalid_characters() {
        assert!(EntityId::parse("ABCDEFG").is_err());
        assert!(EntityId::parse("abc-def").is_err());
        assert!(EntityId::parse("abc def").is_err());
    }

    #[test]
    fn parse_accepts_valid() {
        let id = EntityId::parse("a1b2c3d").unwrap();
        assert_eq!(id.as_str(), "a1b2c3d");
        assert_eq!(id.to_string(), "a1b2c3d");
    }

    #[test]
    fn entity_id_serde_is_transparent() {
        let id = EntityId::parse("x9y8z7w").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"x9y8z7w\"");
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn org_id_roundtrip() {
        let id = OrgId::new();
        let parsed = OrgId::parse(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn type_id_rejects_garbage() {
        assert!(TypeId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn uuid_v7_ids_are_time_ordered() {
        let a = TypeId::new();
        let b = TypeId::new();
        assert!(a <= b);
    }

    #[test]
    fn actor_id_display() {
        let actor = ActorId::new("user-42");
        assert_eq!(actor.to_string(), "user-42");
        assert_eq!(actor.as_str(), "user-42");
    }
}
