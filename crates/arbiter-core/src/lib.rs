//! # arbiter-core — Foundational Types for Secret Arbiter
//!
//! Every other crate in the workspace depends on `arbiter-core`; it depends
//! on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtypes for on-chain primitives.** `Address`, `Wei`, `Timestamp`,
//!    `SubmissionId` all have validated constructors. No bare strings or
//!    floats cross a crate boundary.
//!
//! 2. **Amounts are integers.** Ether amounts are parsed from decimal
//!    strings straight into wei (`u128`). Floating point never appears on
//!    the amount path.
//!
//! 3. **Forms are validated once.** A raw [`DisputeForm`] becomes a
//!    [`DisputeSubmission`] only through [`DisputeForm::validate`], so a
//!    submission in hand always has a parseable respondent and amount.
//!
//! 4. **UTC-only timestamps** with seconds precision, matching the
//!    `uint256` unix-second deadlines the contract expects.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `arbiter-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod address;
pub mod amount;
pub mod case;
pub mod digest;
pub mod dispute;
pub mod error;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use address::Address;
pub use amount::{parse_ether, Wei, WEI_PER_ETHER, WEI_PER_MILLI_ETHER};
pub use case::{sample_cases, ArbitratorAssignment, Case, CaseStatus, Priority};
pub use digest::{sha256_bytes, sha256_text, ContentDigest};
pub use dispute::{DisputeForm, DisputeSubmission, DisputeType, EvidenceRef, SubmissionId};
pub use error::{AddressError, AmountError, CoreError, ValidationError};
pub use temporal::{Timestamp, DEFAULT_DISPUTE_WINDOW_SECS};
