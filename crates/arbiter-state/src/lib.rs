//! # arbiter-state — Submission Lifecycle
//!
//! One state machine: [`SubmissionState`], driven through
//! [`SubmissionTracker`]. States are a validated enum checked at runtime
//! because the flow moves between them across await points and the
//! current state is reported to callers as data.

pub mod error;
pub mod submission;

pub use error::StateError;
pub use submission::{SubmissionState, SubmissionTracker, TransitionRecord};
