//! # User Notifications
//!
//! Every outcome the submitter reports to the user is a [`Notification`]
//! with a stable [`NoticeCode`] for programs and a title/description pair
//! for people. Notifications never abort anything; a [`Notifier`] only
//! displays or records them.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Machine-readable notification kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeCode {
    /// No wallet account was available.
    WalletNotConnected,
    /// A required form field was empty.
    MissingRequiredField,
    /// A form field or derived value was unusable.
    InvalidInput,
    /// Confidential inputs could not be prepared.
    EncryptionFailed,
    /// The transaction failed or reverted.
    SubmissionFailed,
    /// The dispute transaction was mined successfully.
    DisputeConfirmed,
}

impl NoticeCode {
    /// The canonical string name of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WalletNotConnected => "wallet_not_connected",
            Self::MissingRequiredField => "missing_required_field",
            Self::InvalidInput => "invalid_input",
            Self::EncryptionFailed => "encryption_failed",
            Self::SubmissionFailed => "submission_failed",
            Self::DisputeConfirmed => "dispute_confirmed",
        }
    }
}

impl std::fmt::Display for NoticeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Normal informational style.
    Default,
    /// Error style.
    Destructive,
}

/// One user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Stable kind, for programs.
    pub code: NoticeCode,
    /// Presentation style.
    pub severity: Severity,
    /// Short heading.
    pub title: String,
    /// One or two sentences for the user.
    pub description: String,
}

impl Notification {
    fn new(code: NoticeCode, severity: Severity, title: &str, description: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            title: title.to_string(),
            description: description.into(),
        }
    }

    /// No account to send from.
    pub fn wallet_not_connected() -> Self {
        Self::new(
            NoticeCode::WalletNotConnected,
            Severity::Destructive,
            "Wallet Not Connected",
            "Please connect your wallet to submit a dispute.",
        )
    }

    /// A required field is empty or whitespace.
    pub fn missing_information() -> Self {
        Self::new(
            NoticeCode::MissingRequiredField,
            Severity::Destructive,
            "Missing Information",
            "Please fill in all required fields.",
        )
    }

    /// A field was present but unusable; `reason` says which and why.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::new(NoticeCode::InvalidInput, Severity::Destructive, "Invalid Input", reason)
    }

    /// Encryption failed before any transaction was built.
    pub fn encryption_failed() -> Self {
        Self::new(
            NoticeCode::EncryptionFailed,
            Severity::Destructive,
            "Encryption Failed",
            "Your dispute could not be encrypted. Nothing was submitted.",
        )
    }

    /// The transaction failed to send or did not succeed on chain.
    pub fn submission_failed() -> Self {
        Self::new(
            NoticeCode::SubmissionFailed,
            Severity::Destructive,
            "Submission Failed",
            "There was an error submitting your dispute. Please try again.",
        )
    }

    /// The dispute is on chain.
    pub fn dispute_confirmed() -> Self {
        Self::new(
            NoticeCode::DisputeConfirmed,
            Severity::Default,
            "Dispute Submitted Successfully",
            "Your encrypted dispute has been submitted to the blockchain.",
        )
    }
}

// ── Notifiers ──────────────────────────────────────────────────────────

/// Displays notifications.
pub trait Notifier: Send + Sync {
    /// Show or record one notification. Must not block on user input.
    fn notify(&self, notification: Notification);
}

/// Emits notifications as tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: Notification) {
        match n.severity {
            Severity::Default => tracing::info!(
                code = n.code.as_str(),
                title = %n.title,
                "{}",
                n.description
            ),
            Severity::Destructive => tracing::warn!(
                code = n.code.as_str(),
                title = %n.title,
                "{}",
                n.description
            ),
        }
    }
}

/// Records notifications in memory.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().clone()
    }

    /// Codes recorded so far, oldest first.
    pub fn codes(&self) -> Vec<NoticeCode> {
        self.seen.lock().iter().map(|n| n.code).collect()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().push(notification);
    }
}
