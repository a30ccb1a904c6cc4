use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strata_types::{Entity, Etag, FieldValue, TypeId, Visibility};

pub const PROTOCOL_VERSION: u32 = 1;

/// Success envelope: `{ "success": true, "data": ... }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Machine-readable error classification, mirrored on both sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    NotFound,
    Forbidden,
    Validation,
    DuplicateSlug,
    Conflict,
    IllegalTransition,
    Internal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
}

/// Error envelope: `{ "success": false, "error": { ... } }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub success: bool,
    pub error: ErrorDetail,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code,
                message: message.into(),
            },
        }
    }
}

/// Non-blocking advisory attached to a successful write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningBody {
    pub code: String,
    pub message: String,
}

/// Body of a successful entity create/update/transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResponse {
    pub entity: Entity,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<WarningBody>,
}

/// Request body for `POST /orgs/{orgId}/entities`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntityBody {
    pub entity_type_id: TypeId,
    pub data: BTreeMap<String, FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// Request body for `PATCH /orgs/{orgId}/entities/{id}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntityBody {
    /// The version the caller believes is current.
    pub expected_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, FieldValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// Request body for `POST /entities/{id}/transition`.
///
/// `action` is the wire form of the lifecycle action (camelCase, e.g.
/// `"submitForApproval"`); keeping it a string here spares the wire crate
/// a dependency on the state machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionBody {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// Result of a conditional GET against a snapshot endpoint.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchOutcome<T> {
    /// The server returned 304: the caller's cached copy is current.
    NotModified,
    /// Fresh content with its new ETag.
    Fresh { etag: Etag, value: T },
}

impl<T> FetchOutcome<T> {
    pub fn is_not_modified(&self) -> bool {
        matches!(self, Self::NotModified)
    }
}
