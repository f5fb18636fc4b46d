//! # `createDispute` Call Assembly
//!
//! ```solidity
//! function createDispute(
//!     address _respondent,
//!     string _description,
//!     uint256 _deadline,
//!     bytes _amount,
//!     bytes inputProof
//! ) external payable returns (uint256);
//! ```
//!
//! The selector for this signature is `0x9aba2276`.

use arbiter_core::{Address, Wei};
use serde::{Deserialize, Serialize};

use crate::abi::{decode_call, encode_call, function_selector, ParamType, Token};
use crate::error::AbiError;

/// Canonical signature of the dispute entry point.
pub const CREATE_DISPUTE_SIGNATURE: &str = "createDispute(address,string,uint256,bytes,bytes)";

const CREATE_DISPUTE_PARAMS: [ParamType; 5] = [
    ParamType::Address,
    ParamType::String,
    ParamType::Uint,
    ParamType::Bytes,
    ParamType::Bytes,
];

/// The 4-byte selector of `createDispute`.
pub fn create_dispute_selector() -> [u8; 4] {
    function_selector(CREATE_DISPUTE_SIGNATURE)
}

/// Arguments of one `createDispute` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDisputeCall {
    /// `_respondent`.
    pub respondent: Address,
    /// `_description`: the published description text or its digest.
    pub description: String,
    /// `_deadline`, unix seconds.
    pub deadline: u64,
    /// `_amount`: the encrypted amount ciphertext.
    #[serde(with = "hex")]
    pub encrypted_amount: Vec<u8>,
    /// `inputProof`: the proof accompanying the ciphertext.
    #[serde(with = "hex")]
    pub input_proof: Vec<u8>,
}

impl CreateDisputeCall {
    /// ABI-encoded calldata, selector first.
    pub fn encode(&self) -> Vec<u8> {
        encode_call(
            CREATE_DISPUTE_SIGNATURE,
            &[
                Token::Address(self.respondent),
                Token::String(self.description.clone()),
                Token::Uint(u128::from(self.deadline)),
                Token::Bytes(self.encrypted_amount.clone()),
                Token::Bytes(self.input_proof.clone()),
            ],
        )
    }

    /// Decode calldata produced by [`encode`](Self::encode).
    pub fn decode(calldata: &[u8]) -> Result<Self, AbiError> {
        let tokens = decode_call(CREATE_DISPUTE_SIGNATURE, &CREATE_DISPUTE_PARAMS, calldata)?;
        match tokens.as_slice() {
            [Token::Address(respondent), Token::String(description), Token::Uint(deadline), Token::Bytes(amount), Token::Bytes(proof)] => {
                Ok(Self {
                    respondent: *respondent,
                    description: description.clone(),
                    deadline: u64::try_from(*deadline)
                        .map_err(|_| AbiError::Layout("deadline exceeds u64".into()))?,
                    encrypted_amount: amount.clone(),
                    input_proof: proof.clone(),
                })
            }
            _ => Err(AbiError::Layout("createDispute argument types".into())),
        }
    }

    /// Wrap the call in a transaction from `from` to `contract` carrying
    /// `value`.
    pub fn into_transaction(&self, from: Address, contract: Address, value: Wei) -> TransactionRequest {
        TransactionRequest {
            from,
            to: contract,
            data: self.encode(),
            value,
        }
    }
}

// ── Transaction ────────────────────────────────────────────────────────

/// An unsigned transaction handed to the wallet for signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    /// Sender; the wallet's connected account.
    pub from: Address,
    /// Target contract.
    pub to: Address,
    /// Calldata.
    pub data: Vec<u8>,
    /// Attached ether.
    pub value: Wei,
}

impl TransactionRequest {
    /// The `eth_sendTransaction` parameter object.
    pub fn to_rpc_json(&self) -> serde_json::Value {
        serde_json::json!({
            "from": self.from.to_lower_hex(),
            "to": self.to.to_lower_hex(),
            "data": format!("0x{}", hex::encode(&self.data)),
            "value": self.value.to_hex_quantity(),
        })
    }
}
