//! # arbiter-contract — Dispute Contract ABI
//!
//! Builds the calldata the wallet signs. Nothing here talks to a node:
//! [`TransactionRequest`] is a plain value handed to the wallet bridge.

pub mod abi;
pub mod create_dispute;
pub mod error;

pub use abi::{decode, decode_call, encode, encode_call, function_selector, keccak256, ParamType, Token};
pub use create_dispute::{
    create_dispute_selector, CreateDisputeCall, TransactionRequest, CREATE_DISPUTE_SIGNATURE,
};
pub use error::AbiError;
