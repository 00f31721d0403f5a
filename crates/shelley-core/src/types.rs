//! Core ledger types: hashes, values, inputs, outputs.
//!
//! All monetary values are in lovelace and use checked `u64` arithmetic.
//! Amounts cross the API boundary as decimal strings and are never
//! represented as floating point.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::address::Address;
use crate::error::{CryptoError, ValueError};

/// A 32-byte hash value.
///
/// Used for fragment ids, the genesis hash, transaction sign-data hashes
/// and stake pool ids.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// The zero hash (32 zero bytes).
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create a Hash256 from a byte array.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a hash from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidHashLength(bytes.len()))?;
        Ok(Self(arr))
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// BLAKE3 digest of arbitrary data.
    pub fn digest(data: &[u8]) -> Self {
        Self(blake3::hash(data).into())
    }

    /// Check if this is the zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Identifier of a fragment (transaction) on the ledger.
pub type FragmentId = Hash256;

/// An amount of lovelace.
///
/// Bounded by `u64`. Parsing a decimal above `u64::MAX` fails with
/// [`ValueError::Overflow`] and arithmetic is checked, so an amount is
/// never truncated or wrapped.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct Value(pub u64);

impl Value {
    pub const ZERO: Self = Self(0);

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Value) -> Option<Value> {
        self.0.checked_add(other.0).map(Value)
    }

    pub fn checked_sub(self, other: Value) -> Option<Value> {
        self.0.checked_sub(other.0).map(Value)
    }

    pub fn checked_mul(self, n: u64) -> Option<Value> {
        self.0.checked_mul(n).map(Value)
    }

    /// Sum an iterator of values. Returns None on overflow.
    pub fn sum<I: IntoIterator<Item = Value>>(values: I) -> Option<Value> {
        values
            .into_iter()
            .try_fold(Value::ZERO, |acc, v| acc.checked_add(v))
    }
}

impl FromStr for Value {
    type Err = ValueError;

    /// Parse a plain decimal string of ASCII digits.
    ///
    /// Signs, whitespace, separators and fractional parts are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ValueError::Empty);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValueError::Invalid(s.to_string()));
        }
        s.parse::<u64>()
            .map(Value)
            .map_err(|_| ValueError::Overflow(s.to_string()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Sign of `inputs - outputs - fee` for an in-progress transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Balance {
    /// Inputs exceed outputs plus fee by this amount.
    Positive(Value),
    /// Exactly balanced.
    Zero,
    /// Outputs plus fee exceed inputs by this amount.
    Negative(Value),
}

impl Balance {
    /// Compute the balance of `inputs - (outputs + fee)`.
    pub fn compute(inputs: Value, outputs_plus_fee: Value) -> Self {
        use std::cmp::Ordering;
        match inputs.cmp(&outputs_plus_fee) {
            Ordering::Greater => Balance::Positive(Value(inputs.0 - outputs_plus_fee.0)),
            Ordering::Equal => Balance::Zero,
            Ordering::Less => Balance::Negative(Value(outputs_plus_fee.0 - inputs.0)),
        }
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, Balance::Negative(_))
    }
}

/// A transaction input: a pointer to a previous output and the value it holds.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash,
    bincode::Encode, bincode::Decode,
)]
pub struct Input {
    /// Fragment containing the referenced output.
    pub fragment_id: FragmentId,
    /// Index of the output within that fragment.
    pub output_index: u32,
    /// Value of the referenced output.
    pub value: Value,
}

impl Input {
    /// Create an input spending output `output_index` of `fragment_id`.
    pub fn from_utxo(fragment_id: FragmentId, output_index: u32, value: Value) -> Self {
        Self {
            fragment_id,
            output_index,
            value,
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.fragment_id, self.output_index)
    }
}

/// A transaction output, paying `value` to `address`.
#[derive(Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct Output {
    pub address: Address,
    pub value: Value,
}
