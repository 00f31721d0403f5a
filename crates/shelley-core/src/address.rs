//! Shelley address encoding.
//!
//! An address is a header byte followed by key material:
//!
//! | kind      | header   | payload                         |
//! |-----------|----------|---------------------------------|
//! | `Single`  | `0x03`   | spending key (32)               |
//! | `Group`   | `0x04`   | spending key (32) + account (32) |
//! | `Account` | `0x05`   | account key (32)                |
//!
//! The high bit of the header ([`DISCRIMINATION_TEST_BIT`]) marks
//! test-network addresses. Addresses cross the API boundary hex-encoded.

use std::fmt;

use crate::constants::DISCRIMINATION_TEST_BIT;
use crate::crypto::PublicKey;
use crate::error::{AddressError, CryptoError};

const KIND_SINGLE: u8 = 0x03;
const KIND_GROUP: u8 = 0x04;
const KIND_ACCOUNT: u8 = 0x05;

/// Network the address belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, bincode::Encode, bincode::Decode)]
pub enum Discrimination {
    Production,
    Test,
}

/// Key material carried by an address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, bincode::Encode, bincode::Decode)]
pub enum AddressKind {
    /// UTXO address controlled by a single spending key.
    Single([u8; 32]),
    /// UTXO address whose stake is delegated through an account key.
    Group([u8; 32], [u8; 32]),
    /// Account (reward) address.
    Account([u8; 32]),
}

impl AddressKind {
    fn name(&self) -> &'static str {
        match self {
            AddressKind::Single(_) => "single",
            AddressKind::Group(_, _) => "group",
            AddressKind::Account(_) => "account",
        }
    }
}

/// A parsed Shelley address with validated key material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, bincode::Encode, bincode::Decode)]
pub struct Address {
    discrimination: Discrimination,
    kind: AddressKind,
}

impl Address {
    /// Single address paying to `spending_key`.
    pub fn single(discrimination: Discrimination, spending_key: &PublicKey) -> Self {
        Self {
            discrimination,
            kind: AddressKind::Single(spending_key.to_bytes()),
        }
    }

    /// Group address paying to `spending_key` with stake on `account_key`.
    pub fn group(discrimination: Discrimination, spending_key: &PublicKey, account_key: &PublicKey) -> Self {
        Self {
            discrimination,
            kind: AddressKind::Group(spending_key.to_bytes(), account_key.to_bytes()),
        }
    }

    /// Account address for `account_key`.
    pub fn account(discrimination: Discrimination, account_key: &PublicKey) -> Self {
        Self {
            discrimination,
            kind: AddressKind::Account(account_key.to_bytes()),
        }
    }

    /// Parse and validate address bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
        let (&header, payload) = bytes.split_first().ok_or(AddressError::Empty)?;
        let discrimination = if header & DISCRIMINATION_TEST_BIT != 0 {
            Discrimination::Test
        } else {
            Discrimination::Production
        };
        let kind = match header & !DISCRIMINATION_TEST_BIT {
            KIND_SINGLE => AddressKind::Single(parse_key(payload, "single", 0, 32)?),
            KIND_GROUP => AddressKind::Group(
                parse_key(payload, "group", 0, 64)?,
                parse_key(payload, "group", 32, 64)?,
            ),
            KIND_ACCOUNT => AddressKind::Account(parse_key(payload, "account", 0, 32)?),
            other => return Err(AddressError::UnknownKind(other)),
        };
        Ok(Self {
            discrimination,
            kind,
        })
    }

    /// Parse a hex-encoded address.
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let bytes = hex::decode(s).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Canonical byte encoding: header followed by key material.
    pub fn to_bytes(&self) -> Vec<u8> {
        let tag = match self.kind {
            AddressKind::Single(_) => KIND_SINGLE,
            AddressKind::Group(_, _) => KIND_GROUP,
            AddressKind::Account(_) => KIND_ACCOUNT,
        };
        let header = match self.discrimination {
            Discrimination::Production => tag,
            Discrimination::Test => tag | DISCRIMINATION_TEST_BIT,
        };
        let mut out = Vec::with_capacity(65);
        out.push(header);
        match &self.kind {
            AddressKind::Single(k) | AddressKind::Account(k) => out.extend_from_slice(k),
            AddressKind::Group(s, a) => {
                out.extend_from_slice(s);
                out.extend_from_slice(a);
            }
        }
        out
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn discrimination(&self) -> Discrimination {
        self.discrimination
    }

    pub fn kind(&self) -> &AddressKind {
        &self.kind
    }

    /// The key that must sign to spend outputs held at this address.
    ///
    /// Fails with [`CryptoError::NoSpendingKey`] for account addresses,
    /// which hold no UTXOs.
    pub fn spending_key(&self) -> Result<PublicKey, CryptoError> {
        match &self.kind {
            AddressKind::Single(k) | AddressKind::Group(k, _) => PublicKey::from_bytes(k),
            AddressKind::Account(_) => Err(CryptoError::NoSpendingKey),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

fn parse_key(
    payload: &[u8],
    kind: &'static str,
    offset: usize,
    expected: usize,
) -> Result<[u8; 32], AddressError> {
    if payload.len() != expected {
        return Err(AddressError::InvalidLength {
            kind,
            got: payload.len(),
            expected,
        });
    }
    let mut key = [0u8; 32];
    key.copy_from_slice(&payload[offset..offset + 32]);
    PublicKey::from_bytes(&key).map_err(|_| AddressError::InvalidKey)?;
    Ok(key)
}

impl std::str::FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for AddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
