//! # Solidity ABI Encoding
//!
//! The subset of the contract ABI the dispute contract needs: `address`,
//! `uint256`, `bytes`, and `string` parameters with the standard head/tail
//! layout. Static values occupy one 32-byte head word; dynamic values put
//! an offset in the head and `length || data || zero padding` in the tail.
//! Offsets are relative to the start of the argument block, after the
//! selector.

use arbiter_core::Address;
use sha3::{Digest, Keccak256};

use crate::error::AbiError;

/// ABI word size.
pub const WORD: usize = 32;

/// A value to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `address`, left-padded to a word.
    Address(Address),
    /// `uint256`. Values above 128 bits are not needed here.
    Uint(u128),
    /// Dynamic `bytes`.
    Bytes(Vec<u8>),
    /// Dynamic `string` (UTF-8).
    String(String),
}

/// A parameter type to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// `address`.
    Address,
    /// `uint256`.
    Uint,
    /// `bytes`.
    Bytes,
    /// `string`.
    String,
}

/// `keccak256(data)`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(data));
    out
}

/// The 4-byte selector of a canonical function signature such as
/// `transfer(address,uint256)`.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn uint_word(value: u128) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

fn encode_dynamic(payload: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&uint_word(payload.len() as u128));
    out.extend_from_slice(payload);
    out.resize(out.len() + padded_len(payload.len()) - payload.len(), 0);
}

/// ABI-encode an argument tuple.
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len = tokens.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        match token {
            Token::Address(addr) => {
                let mut word = [0u8; WORD];
                word[12..].copy_from_slice(addr.as_bytes());
                head.extend_from_slice(&word);
            }
            Token::Uint(v) => head.extend_from_slice(&uint_word(*v)),
            Token::Bytes(bytes) => {
                head.extend_from_slice(&uint_word((head_len + tail.len()) as u128));
                encode_dynamic(bytes, &mut tail);
            }
            Token::String(s) => {
                head.extend_from_slice(&uint_word((head_len + tail.len()) as u128));
                encode_dynamic(s.as_bytes(), &mut tail);
            }
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Selector followed by the encoded arguments.
pub fn encode_call(signature: &str, tokens: &[Token]) -> Vec<u8> {
    let mut out = function_selector(signature).to_vec();
    out.extend_from_slice(&encode(tokens));
    out
}

// ── Decoding ───────────────────────────────────────────────────────────

fn read_word(data: &[u8], offset: usize) -> Result<&[u8], AbiError> {
    let end = offset.checked_add(WORD).ok_or(AbiError::InvalidOffset(offset))?;
    data.get(offset..end).ok_or(AbiError::Truncated {
        offset,
        needed: WORD,
        available: data.len().saturating_sub(offset),
    })
}

fn read_u128(data: &[u8], offset: usize) -> Result<u128, AbiError> {
    let word = read_word(data, offset)?;
    if word[..16].iter().any(|b| *b != 0) {
        return Err(AbiError::UintOverflow(offset));
    }
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&word[16..]);
    Ok(u128::from_be_bytes(bytes))
}

fn read_usize(data: &[u8], offset: usize) -> Result<usize, AbiError> {
    let v = read_u128(data, offset).map_err(|e| match e {
        AbiError::UintOverflow(o) => AbiError::InvalidOffset(o),
        other => other,
    })?;
    usize::try_from(v).map_err(|_| AbiError::InvalidOffset(offset))
}

fn read_dynamic(data: &[u8], head_offset: usize) -> Result<Vec<u8>, AbiError> {
    let start = read_usize(data, head_offset)?;
    let len = read_usize(data, start)?;
    let body = start + WORD;
    let end = body.checked_add(len).ok_or(AbiError::InvalidOffset(start))?;
    data.get(body..end)
        .map(<[u8]>::to_vec)
        .ok_or(AbiError::Truncated {
            offset: body,
            needed: len,
            available: data.len().saturating_sub(body),
        })
}

/// Decode an argument tuple of the given types.
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, AbiError> {
    types
        .iter()
        .enumerate()
        .map(|(i, ty)| {
            let offset = i * WORD;
            match ty {
                ParamType::Address => {
                    let word = read_word(data, offset)?;
                    if word[..12].iter().any(|b| *b != 0) {
                        return Err(AbiError::DirtyAddress(offset));
                    }
                    let mut bytes = [0u8; 20];
                    bytes.copy_from_slice(&word[12..]);
                    Ok(Token::Address(Address::from_bytes(bytes)))
                }
                ParamType::Uint => Ok(Token::Uint(read_u128(data, offset)?)),
                ParamType::Bytes => Ok(Token::Bytes(read_dynamic(data, offset)?)),
                ParamType::String => {
                    let bytes = read_dynamic(data, offset)?;
                    String::from_utf8(bytes)
                        .map(Token::String)
                        .map_err(|_| AbiError::InvalidUtf8(offset))
                }
            }
        })
        .collect()
}

/// Check the selector of `calldata` and decode the arguments after it.
pub fn decode_call(
    signature: &str,
    types: &[ParamType],
    calldata: &[u8],
) -> Result<Vec<Token>, AbiError> {
    let expected = function_selector(signature);
    let found = calldata.get(..4).ok_or(AbiError::Truncated {
        offset: 0,
        needed: 4,
        available: calldata.len(),
    })?;
    if found != expected.as_slice() {
        return Err(AbiError::SelectorMismatch {
            expected: hex::encode(expected),
            found: hex::encode(found),
        });
    }
    decode(types, &calldata[4..])
}
