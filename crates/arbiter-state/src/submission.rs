//! # Submission State Machine
//!
//! Tracks one dispute submission from form to chain.
//!
//! ## Transition Graph
//!
//! ```text
//! Idle ──begin_encryption()──▶ Encrypting ──encryption_succeeded()──▶ Encrypted
//!  ▲                               │                                     │
//!  │                          fail_encryption()            ┌─────────────┤
//!  │                               │                 fail_encryption()   begin_submission()
//!  │                               ▼                       │             │
//!  ├────────reset()───────────── Error ◀───────────────────┘             ▼
//!  │                                                                Submitting
//!  │                                                                │       │
//!  │                                                          confirm()   fail_submission()
//!  │                                                                │       │
//!  │                                                                ▼       ▼
//!  ├────────reset()────────────────────────────────────────── Confirmed   Failed
//!  └────────reset()──────────────────────────────────────────────────────────┘
//! ```
//!
//! `Confirmed`, `Failed`, and `Error` are resting states: nothing leaves
//! them except `reset()`.

use arbiter_core::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::StateError;

// ── State ──────────────────────────────────────────────────────────────

/// Where a submission currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Encrypting confidential fields.
    Encrypting,
    /// Payload ready; transaction not yet sent.
    Encrypted,
    /// Transaction sent, waiting for the receipt.
    Submitting,
    /// Receipt received with success status.
    Confirmed,
    /// Sending failed, or the transaction reverted.
    Failed,
    /// Preparation failed before anything was sent.
    Error,
}

impl SubmissionState {
    /// The canonical string name of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Encrypting => "encrypting",
            Self::Encrypted => "encrypted",
            Self::Submitting => "submitting",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
            Self::Error => "error",
        }
    }

    /// Whether a submission is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Encrypting | Self::Encrypted | Self::Submitting)
    }

    /// Whether the state is a resting outcome that only `reset` leaves.
    pub fn is_outcome(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed | Self::Error)
    }

    /// Valid target states from this state.
    pub fn valid_transitions(&self) -> &'static [SubmissionState] {
        match self {
            Self::Idle => &[Self::Encrypting],
            Self::Encrypting => &[Self::Encrypted, Self::Error],
            Self::Encrypted => &[Self::Submitting, Self::Error],
            Self::Submitting => &[Self::Confirmed, Self::Failed],
            Self::Confirmed | Self::Failed | Self::Error => &[Self::Idle],
        }
    }

    /// Whether `to` is reachable in one step.
    pub fn can_transition_to(&self, to: SubmissionState) -> bool {
        self.valid_transitions().contains(&to)
    }
}

impl std::fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Tracker ────────────────────────────────────────────────────────────

/// A single recorded transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// State before.
    pub from: SubmissionState,
    /// State after.
    pub to: SubmissionState,
    /// When it happened.
    pub at: Timestamp,
    /// Reason or transaction hash, where the transition carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Owns the current [`SubmissionState`] and its history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionTracker {
    state: SubmissionState,
    history: Vec<TransitionRecord>,
}

impl SubmissionTracker {
    /// A tracker in [`SubmissionState::Idle`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// Whether a submission is in flight.
    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// All recorded transitions, oldest first.
    pub fn history(&self) -> &[TransitionRecord] {
        &self.history
    }

    /// Detail attached to the most recent transition, if any.
    pub fn last_detail(&self) -> Option<&str> {
        self.history.last().and_then(|r| r.detail.as_deref())
    }

    /// Idle → Encrypting.
    pub fn begin_encryption(&mut self) -> Result<(), StateError> {
        self.transition(SubmissionState::Encrypting, None)
    }

    /// Encrypting → Encrypted.
    pub fn encryption_succeeded(&mut self) -> Result<(), StateError> {
        self.transition(SubmissionState::Encrypted, None)
    }

    /// Encrypting | Encrypted → Error.
    pub fn fail_encryption(&mut self, reason: impl Into<String>) -> Result<(), StateError> {
        self.transition(SubmissionState::Error, Some(reason.into()))
    }

    /// Encrypted → Submitting.
    pub fn begin_submission(&mut self) -> Result<(), StateError> {
        self.transition(SubmissionState::Submitting, None)
    }

    /// Submitting → Confirmed.
    pub fn confirm(&mut self, tx_hash: impl Into<String>) -> Result<(), StateError> {
        self.transition(SubmissionState::Confirmed, Some(tx_hash.into()))
    }

    /// Submitting → Failed.
    pub fn fail_submission(&mut self, reason: impl Into<String>) -> Result<(), StateError> {
        self.transition(SubmissionState::Failed, Some(reason.into()))
    }

    /// Close an attempt that stopped while busy, such as a dropped future.
    ///
    /// Encrypting | Encrypted → Error, Submitting → Failed. Any other state
    /// is left as it is. A `Submitting` attempt may already be on chain, so
    /// it lands in `Failed` rather than `Error`.
    pub fn abandon(&mut self, reason: impl Into<String>) -> Result<(), StateError> {
        match self.state {
            SubmissionState::Encrypting | SubmissionState::Encrypted => {
                self.fail_encryption(reason)
            }
            SubmissionState::Submitting => self.fail_submission(reason),
            _ => Ok(()),
        }
    }

    /// Confirmed | Failed | Error → Idle. History is kept.
    pub fn reset(&mut self) -> Result<(), StateError> {
        self.transition(SubmissionState::Idle, None)
    }

    fn transition(&mut self, to: SubmissionState, detail: Option<String>) -> Result<(), StateError> {
        if !self.state.can_transition_to(to) {
            return Err(StateError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        self.history.push(TransitionRecord {
            from: self.state,
            to,
            at: Timestamp::now(),
            detail,
        });
        self.state = to;
        Ok(())
    }
}
