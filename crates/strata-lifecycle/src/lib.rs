//! Entity lifecycle state machine for Strata.
//!
//! The machine is a pure decision function over
//! `(current status, action, guards)` — it performs no I/O of its own.
//! The repository consults it first and persists strictly afterwards, so
//! side effects never interleave with the decision.
//!
//! Transition table:
//!
//! | From      | Action            | To        | Guard                    |
//! |-----------|-------------------|-----------|--------------------------|
//! | draft     | submitForApproval | pending   | schema validation passed |
//! | pending   | approve           | published | approval authority       |
//! | pending   | reject            | draft     | non-empty feedback       |
//! | published | archive           | archived  | —                        |
//! | archived  | restore           | draft     | —                        |
//! | deleted   | restore           | draft     | —                        |
//! | draft     | delete            | deleted   | —                        |
//!
//! Any (status, action) pair not in the table fails with
//! [`LifecycleError::IllegalTransition`], never a silent no-op. Superadmin
//! hard purge bypasses the machine entirely and lives in the repository.

pub mod action;
pub mod error;
pub mod machine;

pub use action::LifecycleAction;
pub use error::{LifecycleError, LifecycleResult};
pub use machine::{legal_actions, transition, TransitionGuards};
