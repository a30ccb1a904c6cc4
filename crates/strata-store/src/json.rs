//! Typed JSON helpers over any [`ObjectStore`].
//!
//! All Strata blobs are JSON; these helpers centralize the
//! serialize/deserialize step and wrap failures with the offending path.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

/// Read and decode the JSON blob at `path`.
///
/// Returns `Ok(None)` if nothing is stored there. A blob that exists but
/// fails to decode is an error — the caller decides whether that means
/// corruption or an ordinary miss.
pub fn read_json<T: DeserializeOwned>(
    store: &dyn ObjectStore,
    path: &str,
) -> StoreResult<Option<T>> {
    match store.read(path)? {
        None => Ok(None),
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::MalformedBlob {
                path: path.to_string(),
                source,
            }),
    }
}

/// Encode `value` as JSON and write it at `path`.
pub fn write_json<T: Serialize>(
    store: &dyn ObjectStore,
    path: &str,
    value: &T,
) -> StoreResult<()> {
    let bytes = serde_json::to_vec(value).map_err(|source| StoreError::Serialization {
        path: path.to_string(),
        source,
    })?;
    store.write(path, &bytes)
}
