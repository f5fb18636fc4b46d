//! Errors from ABI encoding and decoding.

use thiserror::Error;

/// Error decoding ABI data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    /// Input ended before a complete word or payload.
    #[error("calldata truncated: need {needed} bytes at offset {offset}, have {available}")]
    Truncated {
        /// Offset of the read.
        offset: usize,
        /// Bytes the read needed.
        needed: usize,
        /// Bytes actually available.
        available: usize,
    },

    /// The 4-byte selector is not the expected function's.
    #[error("selector mismatch: expected 0x{expected}, found 0x{found}")]
    SelectorMismatch {
        /// Expected selector, hex.
        expected: String,
        /// Selector present in the data, hex.
        found: String,
    },

    /// A dynamic offset or length does not fit in memory.
    #[error("invalid offset or length word at {0}")]
    InvalidOffset(usize),

    /// A uint word exceeds what the decoder can represent.
    #[error("uint at offset {0} exceeds 128 bits")]
    UintOverflow(usize),

    /// An address word has non-zero high bytes.
    #[error("address at offset {0} has non-zero padding")]
    DirtyAddress(usize),

    /// A string argument is not UTF-8.
    #[error("string at offset {0} is not valid UTF-8")]
    InvalidUtf8(usize),

    /// The decoded tokens do not match the expected parameter types.
    #[error("unexpected parameter layout: {0}")]
    Layout(String),
}
