//! Wallet views of unspent outputs.
//!
//! A [`RawUtxo`] is what an indexer reports. An [`AddressedUtxo`] adds the
//! derivation coordinates of the key that owns it, which signing needs.

use serde::{Deserialize, Serialize};

use shelley_core::types::{Hash256, Input, Value};

use crate::error::WalletError;

/// BIP-44 style coordinates relative to an account key.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Addressing {
    /// Chain: 0 external, 1 internal (change).
    pub change: u32,
    /// Address index within the chain.
    pub index: u32,
}

/// An unspent output as reported by the UTXO source.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RawUtxo {
    /// Hex-encoded id of the fragment that created the output.
    pub tx_hash: String,
    /// Output index within that fragment.
    pub tx_index: u32,
    /// Hex-encoded address holding the output.
    pub receiver: String,
    /// Decimal lovelace amount.
    pub amount: String,
    pub utxo_id: String,
}

impl RawUtxo {
    /// Parsed amount.
    pub fn value(&self) -> Result<Value, WalletError> {
        Ok(self.amount.parse()?)
    }

    /// The transaction input spending this output.
    pub fn to_tx_input(&self) -> Result<Input, WalletError> {
        Ok(Input::from_utxo(
            Hash256::from_hex(&self.tx_hash)?,
            self.tx_index,
            self.value()?,
        ))
    }

    /// Structural key identifying this output's bare fields.
    pub fn key(&self) -> UtxoKey {
        UtxoKey {
            tx_hash: self.tx_hash.clone(),
            tx_index: self.tx_index,
            amount: self.amount.clone(),
            receiver: self.receiver.clone(),
        }
    }
}

impl AsRef<RawUtxo> for RawUtxo {
    fn as_ref(&self) -> &RawUtxo {
        self
    }
}

/// A UTXO together with the addressing of its owning key.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AddressedUtxo {
    #[serde(flatten)]
    pub utxo: RawUtxo,
    pub addressing: Addressing,
}

impl AddressedUtxo {
    pub fn new(utxo: RawUtxo, addressing: Addressing) -> Self {
        Self { utxo, addressing }
    }

    /// The bare view, without addressing.
    pub fn raw(&self) -> &RawUtxo {
        &self.utxo
    }
}

impl AsRef<RawUtxo> for AddressedUtxo {
    fn as_ref(&self) -> &RawUtxo {
        &self.utxo
    }
}

/// Lookup key pairing a bare UTXO with its addressed original.
///
/// Built from the fields that identify the output on chain plus the fields
/// the selector reads, so a selected bare UTXO maps back unambiguously.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UtxoKey {
    pub tx_hash: String,
    pub tx_index: u32,
    pub amount: String,
    pub receiver: String,
}
