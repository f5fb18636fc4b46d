//! # Ether Amounts
//!
//! `Wei` is an integer amount of the chain's native unit. Decimal ether
//! strings are parsed straight into wei without passing through floating
//! point, mirroring `viem`'s `parseEther` for well-formed input.
//!
//! ## Security Invariant
//!
//! Financial amounts are never represented as `f64`. The confidential
//! amount encoding ([`Wei::milli_ether`]) truncates toward zero, so
//! the encrypted value never exceeds the escrowed value.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AmountError;

/// Number of decimals in one ether.
pub const ETHER_DECIMALS: usize = 18;

/// 10^18 wei per ether.
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// 10^15 wei per milli-ether, the unit of the confidential amount encoding.
pub const WEI_PER_MILLI_ETHER: u128 = 1_000_000_000_000_000;

/// An amount in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Wei(u128);

impl Wei {
    /// Zero wei.
    pub const ZERO: Wei = Wei(0);

    /// Wrap a raw wei amount.
    pub const fn new(wei: u128) -> Self {
        Self(wei)
    }

    /// Raw wei value.
    pub const fn get(&self) -> u128 {
        self.0
    }

    /// Amount in whole milli-ether, truncated.
    pub fn milli_ether(&self) -> u128 {
        self.0 / WEI_PER_MILLI_ETHER
    }

    /// Render as a decimal ether string without trailing zeros ("2.5", "0.001").
    pub fn format_ether(&self) -> String {
        let whole = self.0 / WEI_PER_ETHER;
        let frac = self.0 % WEI_PER_ETHER;
        if frac == 0 {
            return whole.to_string();
        }
        let frac = format!("{frac:018}");
        format!("{whole}.{}", frac.trim_end_matches('0'))
    }

    /// Hex quantity (`0x`-prefixed, no leading zeros) as JSON-RPC expects.
    pub fn to_hex_quantity(&self) -> String {
        format!("0x{:x}", self.0)
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ETH", self.format_ether())
    }
}

// Serialized as a decimal wei string: JSON numbers cannot carry 128 bits.
impl Serialize for Wei {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Wei {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<u128>()
            .map(Wei)
            .map_err(|e| serde::de::Error::custom(format!("invalid wei amount {s:?}: {e}")))
    }
}

/// Parse a decimal ether string ("2.5", ".5", "10") into wei.
///
/// # Errors
///
/// Rejects empty input, a leading minus sign, anything other than digits
/// and a single `.`, more than 18 fractional digits, and values above
/// `u128::MAX` wei.
pub fn parse_ether(input: &str) -> Result<Wei, AmountError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(AmountError::Empty);
    }
    if s.starts_with('-') {
        return Err(AmountError::Negative(s.to_string()));
    }

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
        return Err(AmountError::NotDecimal(s.to_string()));
    }
    if frac.len() > ETHER_DECIMALS {
        return Err(AmountError::TooManyDecimals {
            found: frac.len(),
            max: ETHER_DECIMALS,
        });
    }

    let overflow = || AmountError::Overflow(s.to_string());
    let whole_wei = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<u128>()
            .map_err(|_| overflow())?
            .checked_mul(WEI_PER_ETHER)
            .ok_or_else(overflow)?
    };
    let frac_wei = if frac.is_empty() {
        0
    } else {
        let padded = format!("{frac:0<width$}", width = ETHER_DECIMALS);
        padded.parse::<u128>().map_err(|_| overflow())?
    };

    whole_wei
        .checked_add(frac_wei)
        .map(Wei)
        .ok_or_else(overflow)
}
