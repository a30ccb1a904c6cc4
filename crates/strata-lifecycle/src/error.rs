use strata_types::EntityStatus;
use thiserror::Error;

use crate::action::LifecycleAction;

/// Errors produced by lifecycle transition decisions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// The (status, action) pair is not in the transition table.
    #[error("illegal transition: cannot {action} while {from}")]
    IllegalTransition {
        from: EntityStatus,
        action: LifecycleAction,
    },

    /// Submission guard: the entity failed schema validation.
    #[error("entity does not pass schema validation")]
    SchemaInvalid,

    /// Approval guard: the actor lacks approval authority.
    #[error("actor lacks approval authority")]
    ApprovalDenied,

    /// Rejection guard: rejection requires non-empty feedback.
    #[error("rejection requires feedback")]
    FeedbackRequired,
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
