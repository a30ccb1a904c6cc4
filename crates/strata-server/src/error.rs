use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use strata_bundle::BundleError;
use strata_lifecycle::LifecycleError;
use strata_protocol::{ApiError, ErrorCode};
use strata_repo::RepoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error(transparent)]
    Store(#[from] strata_store::StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    /// HTTP status and machine-readable code for the error body.
    fn classify(&self) -> (StatusCode, ErrorCode) {
        match self {
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, ErrorCode::Forbidden),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, ErrorCode::Validation),
            Self::Repo(e) => classify_repo(e),
            Self::Bundle(BundleError::TypeNotAvailable(_)) => {
                (StatusCode::NOT_FOUND, ErrorCode::NotFound)
            }
            Self::Bundle(BundleError::Repo(e)) => classify_repo(e),
            Self::Bundle(_) | Self::Store(_) | Self::Io(_) | Self::Config(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Internal)
            }
        }
    }
}

fn classify_repo(err: &RepoError) -> (StatusCode, ErrorCode) {
    match err {
        RepoError::EntityNotFound(_)
        | RepoError::TypeNotFound(_)
        | RepoError::VersionNotFound { .. } => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
        RepoError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::Validation),
        RepoError::DuplicateSlug { .. } => (StatusCode::CONFLICT, ErrorCode::DuplicateSlug),
        RepoError::Conflict { .. } | RepoError::NotEditable { .. } => {
            (StatusCode::CONFLICT, ErrorCode::Conflict)
        }
        RepoError::Lifecycle(e) => classify_lifecycle(e),
        RepoError::Corrupted { .. } | RepoError::Store(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Internal)
        }
    }
}

fn classify_lifecycle(err: &LifecycleError) -> (StatusCode, ErrorCode) {
    match err {
        LifecycleError::IllegalTransition { .. } => {
            (StatusCode::CONFLICT, ErrorCode::IllegalTransition)
        }
        LifecycleError::ApprovalDenied => (StatusCode::FORBIDDEN, ErrorCode::Forbidden),
        LifecycleError::SchemaInvalid | LifecycleError::FeedbackRequired => {
            (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::Validation)
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ApiError::new(code, self.to_string()))).into_response()
    }
}
