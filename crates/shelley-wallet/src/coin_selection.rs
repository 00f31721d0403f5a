//! First-match-first input selection.
//!
//! Adds UTXOs in the order the caller supplies them until the in-progress
//! transaction balances (`inputs - outputs - fee >= 0`). The fee is
//! re-evaluated after every addition since each input grows the
//! transaction. The result is order dependent and makes no attempt to
//! minimize the input count or the fee.

use tracing::debug;

use shelley_core::certificate::Payload;
use shelley_core::error::TransactionError;
use shelley_core::fee::FeeAlgorithm;
use shelley_core::io::InputOutputBuilder;
use shelley_core::types::Balance;

use crate::error::WalletError;
use crate::utxo::RawUtxo;

/// Greedy first-fit input selector.
pub struct InputSelector;

impl InputSelector {
    /// Select UTXOs for the outputs already present in `io_builder`.
    ///
    /// Every selected UTXO is added to `io_builder` as an input, in order.
    /// Returns the selected UTXOs in that same order.
    ///
    /// # Errors
    /// - [`WalletError::InsufficientFunds`] if `utxos` is empty or all of
    ///   them together do not cover outputs plus fee
    /// - parse errors for malformed `tx_hash` or `amount` fields
    pub fn first_match_first(
        io_builder: &mut InputOutputBuilder,
        utxos: &[RawUtxo],
        fee_algorithm: &impl FeeAlgorithm,
        payload: &Payload,
    ) -> Result<Vec<RawUtxo>, WalletError> {
        if utxos.is_empty() {
            return Err(insufficient(io_builder, fee_algorithm, payload)?);
        }

        let mut selected = Vec::new();
        for utxo in utxos {
            io_builder.add_input(utxo.to_tx_input()?);
            selected.push(utxo.clone());

            if !io_builder.balance(payload, fee_algorithm)?.is_negative() {
                debug!(
                    selected = selected.len(),
                    available = utxos.len(),
                    "input selection balanced"
                );
                return Ok(selected);
            }
        }

        Err(insufficient(io_builder, fee_algorithm, payload)?)
    }
}

fn insufficient(
    io_builder: &InputOutputBuilder,
    fee_algorithm: &impl FeeAlgorithm,
    payload: &Payload,
) -> Result<WalletError, WalletError> {
    let have = io_builder.total_input()?;
    let need = match io_builder.balance(payload, fee_algorithm)? {
        Balance::Negative(missing) => have
            .checked_add(missing)
            .ok_or(TransactionError::ValueOverflow)?,
        _ => have,
    };
    debug!(%have, %need, "input selection exhausted");
    Ok(WalletError::InsufficientFunds {
        have: have.as_u64(),
        need: need.as_u64(),
    })
}
