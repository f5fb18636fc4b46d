//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared by the core domain types. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Parsing errors carry the offending input so callers can echo it back.
//! - Validation errors name the form field that failed, which the
//!   submission flow forwards into user notifications.

use thiserror::Error;

/// Top-level error type for `arbiter-core`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Address parsing failed.
    #[error("address error: {0}")]
    Address(#[from] AddressError),

    /// Amount parsing failed.
    #[error("amount error: {0}")]
    Amount(#[from] AmountError),

    /// Dispute form validation failed.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Timestamp construction or arithmetic failed.
    #[error("timestamp error: {0}")]
    Timestamp(String),
}

/// Error parsing an Ethereum account address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The `0x` prefix is missing.
    #[error("address must start with 0x: {0:?}")]
    MissingPrefix(String),

    /// The hex body is not exactly 40 characters.
    #[error("address must have 40 hex characters after 0x, got {0}")]
    InvalidLength(usize),

    /// The body contains a non-hex character.
    #[error("address contains non-hex characters: {0:?}")]
    InvalidHex(String),

    /// Mixed-case input did not match its EIP-55 checksum.
    #[error("address fails EIP-55 checksum: {0:?}")]
    ChecksumMismatch(String),
}

/// Error parsing a decimal ether amount.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// The amount string is empty.
    #[error("amount is empty")]
    Empty,

    /// Negative amounts cannot be escrowed.
    #[error("amount must not be negative: {0:?}")]
    Negative(String),

    /// The amount is not a decimal number.
    #[error("amount is not a decimal number: {0:?}")]
    NotDecimal(String),

    /// More fractional digits than the unit supports.
    #[error("amount has {found} fractional digits, at most {max} allowed")]
    TooManyDecimals {
        /// Fractional digits in the input.
        found: usize,
        /// Maximum supported fractional digits.
        max: usize,
    },

    /// The amount does not fit in 128 bits of wei.
    #[error("amount overflows the wei range: {0:?}")]
    Overflow(String),
}

/// Error validating a dispute form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was left empty.
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    /// The respondent is not a valid address.
    #[error("invalid respondent address: {0}")]
    InvalidRespondent(AddressError),

    /// The respondent is the zero address, which nobody controls.
    #[error("respondent must not be the zero address")]
    ZeroRespondent,

    /// The amount is not a valid ether amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(AmountError),

    /// The dispute type is not one of the supported categories.
    #[error("unknown dispute type: {0:?}")]
    UnknownDisputeType(String),
}

impl ValidationError {
    /// The form field this error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingRequiredField(field) => field,
            Self::InvalidRespondent(_) | Self::ZeroRespondent => "respondent",
            Self::InvalidAmount(_) => "amount",
            Self::UnknownDisputeType(_) => "dispute_type",
        }
    }

    /// Whether this is a missing-field error (as opposed to malformed input).
    pub fn is_missing_field(&self) -> bool {
        matches!(self, Self::MissingRequiredField(_))
    }
}
