//! Network parameters for building and signing transactions.
//!
//! Defaults match the incentivized testnet. Each value can be overridden
//! from the environment:
//!
//! | Variable | Field |
//! |---|---|
//! | `SHELLEY_FEE_CONSTANT` | `fee_constant` |
//! | `SHELLEY_FEE_COEFFICIENT` | `fee_coefficient` |
//! | `SHELLEY_FEE_CERTIFICATE` | `fee_certificate` |
//! | `SHELLEY_GENESIS_HASH` | `genesis_hash` |

use serde::{Deserialize, Serialize};

use shelley_core::constants::{
    DEFAULT_FEE_CERTIFICATE, DEFAULT_FEE_COEFFICIENT, DEFAULT_FEE_CONSTANT, DEFAULT_GENESIS_HASH,
};
use shelley_core::fee::LinearFee;
use shelley_core::types::Hash256;

use crate::error::WalletError;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WalletConfig {
    /// Decimal lovelace charged per transaction.
    pub fee_constant: String,
    /// Decimal lovelace charged per input and per output.
    pub fee_coefficient: String,
    /// Decimal lovelace charged when a certificate is attached.
    pub fee_certificate: String,
    /// Hex-encoded genesis block hash.
    pub genesis_hash: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            fee_constant: DEFAULT_FEE_CONSTANT.to_string(),
            fee_coefficient: DEFAULT_FEE_COEFFICIENT.to_string(),
            fee_certificate: DEFAULT_FEE_CERTIFICATE.to_string(),
            genesis_hash: DEFAULT_GENESIS_HASH.to_string(),
        }
    }
}

impl WalletConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults for unset ones. Values are validated.
    pub fn from_env() -> Result<Self, WalletError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, WalletError> {
        let defaults = Self::default();
        let config = Self {
            fee_constant: lookup("SHELLEY_FEE_CONSTANT").unwrap_or(defaults.fee_constant),
            fee_coefficient: lookup("SHELLEY_FEE_COEFFICIENT").unwrap_or(defaults.fee_coefficient),
            fee_certificate: lookup("SHELLEY_FEE_CERTIFICATE").unwrap_or(defaults.fee_certificate),
            genesis_hash: lookup("SHELLEY_GENESIS_HASH").unwrap_or(defaults.genesis_hash),
        };
        config.linear_fee()?;
        config.genesis_hash()?;
        Ok(config)
    }

    pub fn linear_fee(&self) -> Result<LinearFee, WalletError> {
        LinearFee::from_str_parts(&self.fee_constant, &self.fee_coefficient, &self.fee_certificate)
            .map_err(|e| WalletError::InvalidConfig(format!("fee: {e}")))
    }

    pub fn genesis_hash(&self) -> Result<Hash256, WalletError> {
        Hash256::from_hex(&self.genesis_hash)
            .map_err(|e| WalletError::InvalidConfig(format!("genesis hash: {e}")))
    }
}
