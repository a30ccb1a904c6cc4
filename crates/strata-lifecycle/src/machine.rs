use strata_types::EntityStatus;

use crate::action::LifecycleAction;
use crate::error::{LifecycleError, LifecycleResult};

/// Guard inputs resolved by the caller before asking for a decision.
///
/// The machine itself never performs validation or permission checks; the
/// repository resolves both and passes the verdicts in.
#[derive(Clone, Copy, Debug)]
pub struct TransitionGuards {
    /// Whether the entity currently passes its type's schema validation.
    pub schema_valid: bool,
    /// Whether the acting user holds approval authority.
    pub has_approval_authority: bool,
}

impl TransitionGuards {
    /// Guards with everything granted, for actions that have none.
    pub fn permissive() -> Self {
        Self {
            schema_valid: true,
            has_approval_authority: true,
        }
    }
}

/// Decide the status an entity moves to for `action`, or fail.
///
/// Pure function: the first failing guard wins, and an action missing from
/// the table for the current status is always
/// [`LifecycleError::IllegalTransition`] — never a silent no-op.
pub fn transition(
    current: EntityStatus,
    action: LifecycleAction,
    feedback: Option<&str>,
    guards: &TransitionGuards,
) -> LifecycleResult<EntityStatus> {
    use EntityStatus as S;
    use LifecycleAction as A;

    match (current, action) {
        (S::Draft, A::SubmitForApproval) => {
            if !guards.schema_valid {
                return Err(LifecycleError::SchemaInvalid);
            }
            Ok(S::Pending)
        }
        (S::Pending, A::Approve) => {
            if !guards.has_approval_authority {
                return Err(LifecycleError::ApprovalDenied);
            }
            Ok(S::Published)
        }
        (S::Pending, A::Reject) => {
            if feedback.map_or(true, |f| f.trim().is_empty()) {
                return Err(LifecycleError::FeedbackRequired);
            }
            Ok(S::Draft)
        }
        (S::Published, A::Archive) => Ok(S::Archived),
        (S::Archived, A::Restore) => Ok(S::Draft),
        (S::Deleted, A::Restore) => Ok(S::Draft),
        (S::Draft, A::Delete) => Ok(S::Deleted),
        (from, action) => Err(LifecycleError::IllegalTransition { from, action }),
    }
}

/// The actions legal from a given status, in table order.
pub fn legal_actions(status: EntityStatus) -> &'static [LifecycleAction] {
    use EntityStatus as S;
    use LifecycleAction as A;

    match status {
        S::Draft => &[A::SubmitForApproval, A::Delete],
        S::Pending => &[A::Approve, A::Reject],
        S::Published => &[A::Archive],
        S::Archived => &[A::Restore],
        S::Deleted => &[A::Restore],
    }
}
