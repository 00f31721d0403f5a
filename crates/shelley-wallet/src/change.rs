//! Detection of the change output after sealing.
//!
//! Sealing under [`OutputPolicy::One`](shelley_core::io::OutputPolicy::One)
//! only emits a change output when the leftover covers its fee, so the
//! wallet cannot assume one exists. Instead the sealed outputs are scanned
//! for the change address.
//!
//! If the change address also funded the transaction, an output at that
//! address whose amount equals one of those inputs is treated as a
//! self-payment rather than change. This is a best-effort heuristic: a
//! genuine change amount that happens to equal such an input is
//! misclassified.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use shelley_core::address::Address;
use shelley_core::types::{Output, Value};

use crate::error::WalletError;
use crate::utxo::{Addressing, RawUtxo};

/// An address the wallet allows change to be sent to.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChangeAddress {
    /// Hex-encoded address.
    pub address: String,
    pub addressing: Addressing,
}

/// Value that sealing routed to a change address.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChangeRecord {
    /// Hex-encoded address.
    pub address: String,
    pub addressing: Addressing,
    pub value: Value,
}

/// Find how much of the sealed `outputs` went to `change`.
///
/// Returns zero or one record; an empty result means the transaction
/// balanced without change.
pub fn filter_to_used_change(
    change: &ChangeAddress,
    outputs: &[Output],
    selected: &[RawUtxo],
) -> Result<Vec<ChangeRecord>, WalletError> {
    let change_address = Address::from_hex(&change.address)?;

    let mut possible_duplicates = Vec::new();
    for utxo in selected {
        if Address::from_hex(&utxo.receiver)? == change_address {
            possible_duplicates.push(utxo.value()?);
        }
    }
    if !possible_duplicates.is_empty() {
        warn!(
            count = possible_duplicates.len(),
            "change address also funds this transaction"
        );
    }

    let mut records = Vec::new();
    for output in outputs.iter().filter(|o| o.address == change_address) {
        let duplicate = possible_duplicates
            .iter()
            .position(|value| *value == output.value);
        match duplicate {
            Some(index) => {
                debug!(value = %output.value, "skipping self-payment at change address");
                possible_duplicates.remove(index);
            }
            None => records.push(ChangeRecord {
                address: change.address.clone(),
                addressing: change.addressing,
                value: output.value,
            }),
        }
    }

    debug!(found = records.len(), "change resolved");
    Ok(records)
}
