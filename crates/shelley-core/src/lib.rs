//! # shelley-core
//! Ledger primitives for building Shelley-era UTXO transactions.

pub mod address;
pub mod certificate;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod fee;
pub mod io;
pub mod transaction;
pub mod types;
