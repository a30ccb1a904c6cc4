use std::fmt;

use serde::{Deserialize, Serialize};

/// An action a caller may request against an entity's lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LifecycleAction {
    SubmitForApproval,
    Approve,
    Reject,
    Archive,
    Restore,
    Delete,
}

impl LifecycleAction {
    /// All actions, for exhaustive table checks.
    pub const ALL: [LifecycleAction; 6] = [
        Self::SubmitForApproval,
        Self::Approve,
        Self::Reject,
        Self::Archive,
        Self::Restore,
        Self::Delete,
    ];
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubmitForApproval => write!(f, "submitForApproval"),
            Self::Approve => write!(f, "approve"),
            Self::Reject => write!(f, "reject"),
            Self::Archive => write!(f, "archive"),
            Self::Restore => write!(f, "restore"),
            Self::Delete => write!(f, "delete"),
        }
    }
}
