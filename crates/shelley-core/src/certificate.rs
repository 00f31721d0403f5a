//! Certificates, transaction payloads and payload authentication.
//!
//! The transaction pipeline treats certificates as opaque: it only needs to
//! know whether one is present (for the fee) and to attach the matching
//! authentication once the transaction is witnessed.

use crate::crypto::{PrivateKey, PublicKey, Signature};
use crate::types::Hash256;

/// A ledger action carried by a transaction.
#[derive(Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub enum Certificate {
    /// Delegate the stake of `account` to the pool `pool_id`.
    StakeDelegation { account: [u8; 32], pool_id: Hash256 },
    /// Withdraw `account` from delegation.
    StakeDeregistration { account: [u8; 32] },
}

impl Certificate {
    pub fn stake_delegation(account: &PublicKey, pool_id: Hash256) -> Self {
        Certificate::StakeDelegation {
            account: account.to_bytes(),
            pool_id,
        }
    }

    pub fn stake_deregistration(account: &PublicKey) -> Self {
        Certificate::StakeDeregistration {
            account: account.to_bytes(),
        }
    }

    /// Account key that must authorize this certificate.
    pub fn account(&self) -> &[u8; 32] {
        match self {
            Certificate::StakeDelegation { account, .. } => account,
            Certificate::StakeDeregistration { account } => account,
        }
    }
}

/// Optional extra content of a transaction.
#[derive(Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub enum Payload {
    NoPayload,
    Certificate(Certificate),
}

impl Payload {
    pub fn no_payload() -> Self {
        Payload::NoPayload
    }

    pub fn certificate(certificate: Certificate) -> Self {
        Payload::Certificate(certificate)
    }

    pub fn has_certificate(&self) -> bool {
        matches!(self, Payload::Certificate(_))
    }
}

impl From<Option<Certificate>> for Payload {
    fn from(certificate: Option<Certificate>) -> Self {
        certificate.map_or(Payload::NoPayload, Payload::Certificate)
    }
}

/// Signature by an account key over a transaction's binding auth data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct AccountBindingSignature(pub Signature);

impl AccountBindingSignature {
    /// Sign `auth_data` with a single account key.
    pub fn new_single(key: &PrivateKey, auth_data: &[u8]) -> Self {
        Self(key.sign(auth_data))
    }

    pub fn verify(&self, key: &PublicKey, auth_data: &[u8]) -> bool {
        key.verify(auth_data, &self.0).is_ok()
    }
}

/// Authentication attached to a transaction's payload.
#[derive(Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub enum PayloadAuthData {
    NoPayload,
    Certificate(AccountBindingSignature),
}

impl PayloadAuthData {
    pub fn for_no_payload() -> Self {
        PayloadAuthData::NoPayload
    }

    pub fn for_certificate(signature: AccountBindingSignature) -> Self {
        PayloadAuthData::Certificate(signature)
    }

    /// Whether this authentication is the right shape for `payload`.
    pub fn matches(&self, payload: &Payload) -> bool {
        matches!(
            (self, payload),
            (PayloadAuthData::NoPayload, Payload::NoPayload)
                | (PayloadAuthData::Certificate(_), Payload::Certificate(_))
        )
    }
}
