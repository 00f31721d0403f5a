//! Wallet error types.

use shelley_core::error::{AddressError, CryptoError, TransactionError, ValueError};
use thiserror::Error;

/// Errors that can occur while assembling or signing a transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// The UTXO set cannot cover the amount plus fee.
    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds {
        /// Value of the UTXOs considered, in lovelace.
        have: u64,
        /// Value required, in lovelace.
        need: u64,
    },

    /// The caller asked for something this pipeline does not support,
    /// such as more than one change address.
    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// A selected input could not be mapped back to its addressed UTXO.
    #[error("internal consistency: {0}")]
    InternalConsistency(String),

    /// Invalid monetary amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Invalid configuration value.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Amount parse error from shelley-core.
    #[error(transparent)]
    Value(#[from] ValueError),

    /// Address parse error from shelley-core.
    #[error(transparent)]
    Address(#[from] AddressError),

    /// Cryptographic error from shelley-core.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Transaction construction error from shelley-core.
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

impl WalletError {
    /// Whether retrying with different inputs or a different amount could
    /// succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, WalletError::InsufficientFunds { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_insufficient_funds() {
        let e = WalletError::InsufficientFunds {
            have: 100,
            need: 200,
        };
        assert_eq!(e.to_string(), "insufficient funds: have 100, need 200");
    }

    #[test]
    fn display_unsupported_configuration() {
        let e = WalletError::UnsupportedConfiguration("only one change address".into());
        assert_eq!(e.to_string(), "unsupported configuration: only one change address");
    }

    #[test]
    fn clone_and_eq() {
        let e1 = WalletError::InternalConsistency("lost utxo".into());
        let e2 = e1.clone();
        assert_eq!(e1, e2);
    }

    #[test]
    fn from_crypto_error() {
        let crypto = CryptoError::InvalidPublicKey;
        let wallet: WalletError = crypto.into();
        assert_eq!(wallet, WalletError::Crypto(CryptoError::InvalidPublicKey));
    }

    #[test]
    fn from_transaction_error_is_transparent() {
        let tx = TransactionError::ValueOverflow;
        let wallet: WalletError = tx.clone().into();
        assert_eq!(wallet.to_string(), tx.to_string());
    }

    #[test]
    fn only_insufficient_funds_is_recoverable() {
        assert!(WalletError::InsufficientFunds { have: 0, need: 1 }.is_recoverable());
        assert!(!WalletError::UnsupportedConfiguration("x".into()).is_recoverable());
        assert!(!WalletError::InternalConsistency("x".into()).is_recoverable());
        assert!(!WalletError::Value(ValueError::Empty).is_recoverable());
    }
}
