//! Shared wire contract between the Strata server and clients.
//!
//! Defines the endpoint paths, the `{success, data}` response envelope,
//! the structured error body, and the conditional-fetch types both sides
//! of the sync protocol agree on.

pub mod endpoint;
pub mod message;

pub use endpoint::{endpoints, CACHE_CONTROL_VALUE};
pub use message::{
    ApiError, ApiResponse, CreateEntityBody, ErrorCode, ErrorDetail, FetchOutcome, TransitionBody,
    UpdateEntityBody, WarningBody, WriteResponse, PROTOCOL_VERSION,
};
