//! Errors from the submission state machine.

use thiserror::Error;

use crate::submission::SubmissionState;

/// Error driving a [`SubmissionTracker`](crate::SubmissionTracker).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The transition is not allowed from the current state.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        /// Current state.
        from: SubmissionState,
        /// Requested state.
        to: SubmissionState,
    },
}
