//! # Dispute Forms and Submissions
//!
//! A [`DisputeForm`] holds the claimant's input exactly as entered. A
//! [`DisputeSubmission`] is the validated result, ready for encryption and
//! contract assembly.
//!
//! ## Validation Order
//!
//! Required fields are checked first, in the order respondent, description,
//! amount, so the first missing field is the one reported. Only then are
//! individual values parsed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::address::Address;
use crate::amount::{parse_ether, Wei};
use crate::error::ValidationError;
use crate::temporal::Timestamp;

// ── Identifiers ────────────────────────────────────────────────────────

/// Client-side identifier for one submission attempt.
///
/// Never sent on-chain; the contract assigns its own dispute id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    /// Create a new random submission identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "submission:{}", self.0)
    }
}

// ── Dispute Types ──────────────────────────────────────────────────────

/// Categories offered by the submission form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeType {
    /// Contract dispute.
    Contract,
    /// Payment dispute.
    Payment,
    /// Governance issue.
    Governance,
    /// Intellectual property dispute.
    Intellectual,
}

impl DisputeType {
    /// All dispute types as a slice.
    pub fn all() -> &'static [DisputeType] {
        &[
            Self::Contract,
            Self::Payment,
            Self::Governance,
            Self::Intellectual,
        ]
    }

    /// The form value for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contract => "contract",
            Self::Payment => "payment",
            Self::Governance => "governance",
            Self::Intellectual => "intellectual",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Contract => "Contract Dispute",
            Self::Payment => "Payment Dispute",
            Self::Governance => "Governance Issue",
            Self::Intellectual => "IP Dispute",
        }
    }

    /// Parse a form value.
    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for DisputeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Evidence ───────────────────────────────────────────────────────────

/// A reference to supporting evidence (typically a URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvidenceRef(pub String);

impl EvidenceRef {
    /// The reference text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ── Form ───────────────────────────────────────────────────────────────

/// Raw dispute input as entered by the claimant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisputeForm {
    /// One of the [`DisputeType`] form values, or empty.
    pub dispute_type: String,
    /// Decimal ether amount in dispute.
    pub amount: String,
    /// Optional short title.
    pub title: String,
    /// Detailed description of the dispute.
    pub description: String,
    /// Whitespace-separated evidence links.
    pub evidence: String,
    /// Respondent address.
    pub respondent: String,
}

impl DisputeForm {
    /// Validate the form into a submission with the given deadline.
    ///
    /// Whitespace-only values count as missing.
    pub fn validate(&self, deadline: Timestamp) -> Result<DisputeSubmission, ValidationError> {
        let respondent = required(&self.respondent, "respondent")?;
        let description = required(&self.description, "description")?;
        let amount = required(&self.amount, "amount")?;

        let respondent =
            Address::parse(respondent).map_err(ValidationError::InvalidRespondent)?;
        if respondent.is_zero() {
            return Err(ValidationError::ZeroRespondent);
        }
        let amount = parse_ether(amount).map_err(ValidationError::InvalidAmount)?;

        let dispute_type = match self.dispute_type.trim() {
            "" => None,
            other => Some(
                DisputeType::parse(other)
                    .ok_or_else(|| ValidationError::UnknownDisputeType(other.to_string()))?,
            ),
        };

        let title = match self.title.trim() {
            "" => None,
            t => Some(t.to_string()),
        };

        let evidence = self
            .evidence
            .split_whitespace()
            .map(|s| EvidenceRef(s.to_string()))
            .collect();

        Ok(DisputeSubmission {
            id: SubmissionId::new(),
            dispute_type,
            respondent,
            title,
            description: description.to_string(),
            evidence,
            amount,
            deadline,
        })
    }
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingRequiredField(field))
    } else {
        Ok(trimmed)
    }
}

// ── Submission ─────────────────────────────────────────────────────────

/// A validated dispute ready for encryption and submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeSubmission {
    /// Client-side identifier.
    pub id: SubmissionId,
    /// Optional category.
    pub dispute_type: Option<DisputeType>,
    /// The party the dispute is raised against.
    pub respondent: Address,
    /// Optional short title.
    pub title: Option<String>,
    /// Detailed description.
    pub description: String,
    /// Supporting evidence references.
    pub evidence: Vec<EvidenceRef>,
    /// Amount in dispute. Confidential: only its ciphertext is published.
    pub amount: Wei,
    /// Response deadline.
    pub deadline: Timestamp,
}

impl DisputeSubmission {
    /// Evidence references joined by newlines, the text that gets hashed.
    pub fn evidence_text(&self) -> String {
        self.evidence
            .iter()
            .map(EvidenceRef::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AmountError;

    const RESPONDENT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    fn form() -> DisputeForm {
        DisputeForm {
            dispute_type: "payment".into(),
            amount: "2.5".into(),
            title: "Unpaid invoice".into(),
            description: "Milestone 3 was delivered but never paid.".into(),
            evidence: "https://example.org/invoice.pdf\nhttps://example.org/chat.png".into(),
            respondent: RESPONDENT.into(),
        }
    }

    fn deadline() -> Timestamp {
        Timestamp::parse("2026-01-22T12:00:00Z").unwrap()
    }

    #[test]
    fn valid_form_produces_submission() {
        let sub = form().validate(deadline()).unwrap();
        assert_eq!(sub.respondent.to_checksum(), RESPONDENT);
        assert_eq!(sub.amount.get(), 2_500_000_000_000_000_000);
        assert_eq!(sub.dispute_type, Some(DisputeType::Payment));
        assert_eq!(sub.title.as_deref(), Some("Unpaid invoice"));
        assert_eq!(sub.evidence.len(), 2);
        assert_eq!(sub.deadline, deadline());
    }

    #[test]
    fn missing_fields_reported_in_order() {
        let mut f = form();
        f.respondent.clear();
        f.description.clear();
        assert_eq!(
            f.validate(deadline()),
            Err(ValidationError::MissingRequiredField("respondent"))
        );

        let mut f = form();
        f.description = "   ".into();
        assert_eq!(
            f.validate(deadline()),
            Err(ValidationError::MissingRequiredField("description"))
        );

        let mut f = form();
        f.amount.clear();
        let err = f.validate(deadline()).unwrap_err();
        assert!(err.is_missing_field());
        assert_eq!(err.field(), "amount");
    }

    #[test]
    fn optional_fields_may_be_empty() {
        let mut f = form();
        f.dispute_type.clear();
        f.title.clear();
        f.evidence.clear();
        let sub = f.validate(deadline()).unwrap();
        assert_eq!(sub.dispute_type, None);
        assert_eq!(sub.title, None);
        assert!(sub.evidence.is_empty());
        assert_eq!(sub.evidence_text(), "");
    }

    #[test]
    fn malformed_values_are_rejected() {
        let mut f = form();
        f.respondent = "0x1234".into();
        assert!(matches!(
            f.validate(deadline()),
            Err(ValidationError::InvalidRespondent(_))
        ));

        let mut f = form();
        f.respondent = "0x0000000000000000000000000000000000000000".into();
        assert_eq!(f.validate(deadline()), Err(ValidationError::ZeroRespondent));

        let mut f = form();
        f.amount = "-1".into();
        assert!(matches!(
            f.validate(deadline()),
            Err(ValidationError::InvalidAmount(AmountError::Negative(_)))
        ));

        let mut f = form();
        f.dispute_type = "criminal".into();
        assert_eq!(
            f.validate(deadline()),
            Err(ValidationError::UnknownDisputeType("criminal".into()))
        );
    }

    #[test]
    fn evidence_text_joins_references() {
        let sub = form().validate(deadline()).unwrap();
        assert_eq!(
            sub.evidence_text(),
            "https://example.org/invoice.pdf\nhttps://example.org/chat.png"
        );
    }

    #[test]
    fn dispute_type_values_and_labels() {
        for t in DisputeType::all() {
            assert_eq!(DisputeType::parse(t.as_str()), Some(*t));
        }
        assert_eq!(DisputeType::Intellectual.label(), "IP Dispute");
    }

    #[test]
    fn each_submission_gets_a_fresh_id() {
        let a = form().validate(deadline()).unwrap();
        let b = form().validate(deadline()).unwrap();
        assert_ne!(a.id, b.id);
    }
}
