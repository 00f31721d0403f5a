//! # shelley-wallet: unsigned transaction construction and signing.
//!
//! Turns a snapshot of wallet UTXOs into a signed, broadcastable fragment:
//! first-match-first input selection, sealing under a change policy,
//! change detection, and per-input witness generation.
//!
//! # Modules
//!
//! - [`error`]: `WalletError` enum
//! - [`utxo`]: raw and addressed UTXO views
//! - [`coin_selection`]: first-match-first input selection
//! - [`change`]: detection of the change output after sealing
//! - [`builder`]: transaction assembly, including send-all
//! - [`signer`]: witness and payload signature building
//! - [`config`]: network fee schedule and genesis hash

pub mod builder;
pub mod change;
pub mod coin_selection;
pub mod config;
pub mod error;
pub mod signer;
pub mod utxo;

// Re-exports for convenient access
pub use builder::{
    UnsignedTx, new_unsigned_tx, new_unsigned_tx_from_utxo, send_all_unsigned_tx,
    send_all_unsigned_tx_from_utxo,
};
pub use change::{ChangeAddress, ChangeRecord};
pub use config::WalletConfig;
pub use error::WalletError;
pub use signer::{StakingPayload, WitnessScheme, sign_transaction};
pub use utxo::{AddressedUtxo, Addressing, RawUtxo, UtxoKey};
