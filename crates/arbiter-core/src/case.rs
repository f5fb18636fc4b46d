//! # Case Dashboard Records
//!
//! Read-only case summaries for the dashboard listing. The list is fixed
//! sample data: there is no query, filter, pagination, or lifecycle here.

use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Review status shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseStatus {
    /// An arbitrator is reviewing the case.
    InReview,
    /// Waiting on a party to provide evidence.
    AwaitingEvidence,
    /// The case has been decided.
    Resolved,
}

impl CaseStatus {
    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InReview => "In Review",
            Self::AwaitingEvidence => "Awaiting Evidence",
            Self::Resolved => "Resolved",
        }
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Case priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// High priority.
    High,
    /// Medium priority.
    Medium,
    /// Low priority.
    Low,
}

impl Priority {
    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Who is handling a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArbitratorAssignment {
    /// Assigned to the given arbitrator.
    Assigned(Address),
    /// Not yet assigned.
    Pending,
}

impl std::fmt::Display for ArbitratorAssignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Assigned(addr) => f.write_str(&addr.abbreviated()),
            Self::Pending => f.write_str("Pending Assignment"),
        }
    }
}

/// A case summary row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    /// Case reference ("CASE-001").
    pub id: String,
    /// Short title.
    pub title: String,
    /// Amount as displayed ("2.5 ETH").
    pub amount: String,
    /// Review status.
    pub status: CaseStatus,
    /// Priority.
    pub priority: Priority,
    /// Submission date (YYYY-MM-DD).
    pub submitted_at: String,
    /// Arbitrator assignment.
    pub arbitrator: ArbitratorAssignment,
}

/// The fixed sample case list.
pub fn sample_cases() -> Vec<Case> {
    let arbitrator = |bytes: [u8; 20]| ArbitratorAssignment::Assigned(Address::from_bytes(bytes));
    let mut first = [0u8; 20];
    first[..2].copy_from_slice(&[0x12, 0x34]);
    first[18..].copy_from_slice(&[0x56, 0x78]);
    let mut third = [0u8; 20];
    third[..2].copy_from_slice(&[0x98, 0x76]);
    third[18..].copy_from_slice(&[0x32, 0x10]);

    vec![
        Case {
            id: "CASE-001".into(),
            title: "Smart Contract Payment Dispute".into(),
            amount: "2.5 ETH".into(),
            status: CaseStatus::InReview,
            priority: Priority::High,
            submitted_at: "2024-01-15".into(),
            arbitrator: arbitrator(first),
        },
        Case {
            id: "CASE-002".into(),
            title: "DAO Governance Vote Challenge".into(),
            amount: "0.8 ETH".into(),
            status: CaseStatus::AwaitingEvidence,
            priority: Priority::Medium,
            submitted_at: "2024-01-12".into(),
            arbitrator: ArbitratorAssignment::Pending,
        },
        Case {
            id: "CASE-003".into(),
            title: "NFT Ownership Dispute".into(),
            amount: "5.2 ETH".into(),
            status: CaseStatus::Resolved,
            priority: Priority::High,
            submitted_at: "2024-01-08".into(),
            arbitrator: arbitrator(third),
        },
    ]
}
