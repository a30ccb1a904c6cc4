use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Content-derived fingerprint used for conditional fetch.
///
/// An `Etag` is the lowercase hex BLAKE3 hash of a serialized snapshot
/// body. Identical content always produces an identical tag, which is the
/// property the sync protocol's 304 short-circuit depends on. On the wire
/// it travels as a quoted strong validator (`"<hex>"`).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Etag(String);

impl Etag {
    /// Compute the tag for a serialized body.
    pub fn from_bytes(body: &[u8]) -> Self {
        Self(hex::encode(blake3::hash(body).as_bytes()))
    }

    /// Parse an `If-None-Match` / `ETag` header value.
    ///
    /// Accepts the quoted form, the bare hex form, and a `W/` weak prefix
    /// (compared strongly — content hashes make every tag strong).
    pub fn parse_header(value: &str) -> Result<Self, TypeError> {
        let value = value.trim();
        let value = value.strip_prefix("W/").unwrap_or(value);
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidEtag(value.to_string()));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    /// The bare hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The quoted wire form for `ETag` response headers.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Debug for Etag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Etag({}..)", &self.0[..self.0.len().min(8)])
    }
}

impl fmt::Display for Etag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn identical_content_identical_tag() {
        let a = Etag::from_bytes(b"{\"entities\":[]}");
        let b = Etag::from_bytes(b"{\"entities\":[]}");
        assert_eq!(a, b);
    }

    #[test]
    fn different_content_different_tag() {
        let a = Etag::from_bytes(b"aaa");
        let b = Etag::from_bytes(b"bbb");
        assert_ne!(a, b);
    }

    #[test]
    fn tag_is_256_bit_hex() {
        let tag = Etag::from_bytes(b"x");
        assert_eq!(tag.as_str().len(), 64);
        assert!(tag.as_str().bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn quoted_form() {
        let tag = Etag::from_bytes(b"x");
        let quoted = tag.quoted();
        assert!(quoted.starts_with('"') && quoted.ends_with('"'));
        assert_eq!(&quoted[1..quoted.len() - 1], tag.as_str());
    }

    #[test]
    fn header_parsing_accepts_all_forms() {
        let tag = Etag::from_bytes(b"body");
        assert_eq!(Etag::parse_header(&tag.quoted()).unwrap(), tag);
        assert_eq!(Etag::parse_header(tag.as_str()).unwrap(), tag);
        assert_eq!(
            Etag::parse_header(&format!("W/{}", tag.quoted())).unwrap(),
            tag
        );
    }

    #[test]
    fn header_parsing_rejects_garbage() {
        assert!(Etag::parse_header("").is_err());
        assert!(Etag::parse_header("\"not hex!\"").is_err());
    }

    proptest! {
        #[test]
        fn hashing_is_deterministic(body in proptest::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(Etag::from_bytes(&body), Etag::from_bytes(&body));
        }

        /// Every tag survives the quoted wire form unchanged.
        #[test]
        fn wire_roundtrip(body in proptest::collection::vec(any::<u8>(), 0..64)) {
            let tag = Etag::from_bytes(&body);
            prop_assert_eq!(Etag::parse_header(&tag.quoted()).unwrap(), tag);
        }
    }
}
