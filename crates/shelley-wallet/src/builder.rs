//! Unsigned transaction assembly.
//!
//! Builds a balanced set of inputs and outputs paying one receiver:
//! 1. Add the receiver output
//! 2. Select inputs first-match-first
//! 3. Seal, sending leftover to the change address if one is given
//!    (at most one is supported) or forgetting it otherwise
//! 4. Report what, if anything, went to change
//!
//! The send-all variant spends every UTXO to the receiver, bypassing
//! selection. Its fee is taken from a dry run over all inputs, which is
//! discarded.
//!
//! Both variants come in two forms: over bare [`RawUtxo`]s, and over
//! [`AddressedUtxo`]s, which keeps the addressing needed for signing.

use std::collections::HashMap;

use tracing::debug;

use shelley_core::address::Address;
use shelley_core::certificate::{Certificate, Payload};
use shelley_core::crypto::PublicKey;
use shelley_core::error::TransactionError;
use shelley_core::fee::FeeAlgorithm;
use shelley_core::io::{InputOutput, InputOutputBuilder, OutputPolicy};
use shelley_core::types::Value;

use crate::change::{ChangeAddress, ChangeRecord, filter_to_used_change};
use crate::coin_selection::InputSelector;
use crate::error::WalletError;
use crate::utxo::{AddressedUtxo, RawUtxo, UtxoKey};

/// A balanced transaction waiting to be signed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedTx<U> {
    /// UTXOs spent, in the same order as `ios.inputs()`.
    pub sender_utxos: Vec<U>,
    /// Sealed inputs and outputs.
    pub ios: InputOutput,
    /// Change actually routed to the change address: zero or one record.
    pub change: Vec<ChangeRecord>,
    /// Certificate the fee was priced with, if any.
    pub certificate: Option<Certificate>,
}

impl<U: AsRef<RawUtxo>> UnsignedTx<U> {
    /// Spending keys of the addresses holding each input, in input order.
    ///
    /// These are the keys [`Transaction::verify`] checks the witnesses
    /// against.
    ///
    /// [`Transaction::verify`]: shelley_core::transaction::Transaction::verify
    pub fn spending_keys(&self) -> Result<Vec<PublicKey>, WalletError> {
        self.sender_utxos
            .iter()
            .map(|utxo| -> Result<PublicKey, WalletError> {
                let address = Address::from_hex(&utxo.as_ref().receiver)?;
                Ok(address.spending_key()?)
            })
            .collect()
    }
}

/// Assemble a transaction paying `amount` to `receiver` from bare UTXOs.
///
/// # Arguments
/// - `fee_algorithm`: the network fee schedule
/// - `receiver`: hex-encoded destination address
/// - `amount`: decimal lovelace amount
/// - `change_addresses`: zero (leftover forgotten) or one change address
/// - `utxos`: candidate UTXOs, in selection order
/// - `certificate`: optional certificate payload
///
/// # Errors
/// - [`WalletError::UnsupportedConfiguration`] for more than one change address
/// - [`WalletError::InsufficientFunds`] if the UTXOs cannot cover amount plus fee
pub fn new_unsigned_tx_from_utxo(
    fee_algorithm: &impl FeeAlgorithm,
    receiver: &str,
    amount: &str,
    change_addresses: &[ChangeAddress],
    utxos: &[RawUtxo],
    certificate: Option<Certificate>,
) -> Result<UnsignedTx<RawUtxo>, WalletError> {
    check_change_addresses(change_addresses)?;
    let receiver = Address::from_hex(receiver)?;
    let amount: Value = amount.parse()?;
    assemble(fee_algorithm, receiver, amount, change_addresses, utxos, certificate)
}

/// Assemble a transaction from addressed UTXOs.
///
/// Same as [`new_unsigned_tx_from_utxo`], with the selected inputs mapped
/// back to their addressed originals.
///
/// # Errors
/// As [`new_unsigned_tx_from_utxo`], plus
/// [`WalletError::InternalConsistency`] if a selected input has no
/// addressed original.
pub fn new_unsigned_tx(
    fee_algorithm: &impl FeeAlgorithm,
    receiver: &str,
    amount: &str,
    change_addresses: &[ChangeAddress],
    utxos: &[AddressedUtxo],
    certificate: Option<Certificate>,
) -> Result<UnsignedTx<AddressedUtxo>, WalletError> {
    let raw: Vec<RawUtxo> = utxos.iter().map(|u| u.utxo.clone()).collect();
    let unsigned =
        new_unsigned_tx_from_utxo(fee_algorithm, receiver, amount, change_addresses, &raw, certificate)?;
    attach_addressing(unsigned, utxos)
}

/// Spend every UTXO to `receiver`, with no change.
///
/// # Errors
/// [`WalletError::InsufficientFunds`] if the UTXOs sum to zero or do not
/// exceed the fee.
pub fn send_all_unsigned_tx_from_utxo(
    fee_algorithm: &impl FeeAlgorithm,
    receiver: &str,
    utxos: &[RawUtxo],
) -> Result<UnsignedTx<RawUtxo>, WalletError> {
    let receiver = Address::from_hex(receiver)?;
    let values = utxos
        .iter()
        .map(RawUtxo::value)
        .collect::<Result<Vec<_>, _>>()?;
    let total = Value::sum(values).ok_or(TransactionError::ValueOverflow)?;

    if total.is_zero() {
        let fee = fee_algorithm
            .calculate(&Payload::NoPayload, utxos.len(), 1)
            .ok_or(TransactionError::ValueOverflow)?;
        return Err(WalletError::InsufficientFunds {
            have: 0,
            need: fee.as_u64().saturating_add(1),
        });
    }

    let inputs = utxos
        .iter()
        .map(RawUtxo::to_tx_input)
        .collect::<Result<Vec<_>, _>>()?;

    // Dry run over every input to price the transaction. Never sealed.
    let fee = {
        let mut dry_run = InputOutputBuilder::empty();
        for input in &inputs {
            dry_run.add_input(input.clone());
        }
        dry_run.add_output(receiver, total)?;
        dry_run.estimate_fee(fee_algorithm, &Payload::NoPayload)?
    };

    let amount = match total.checked_sub(fee) {
        Some(amount) if !amount.is_zero() => amount,
        _ => {
            return Err(WalletError::InsufficientFunds {
                have: total.as_u64(),
                need: fee.as_u64().saturating_add(1),
            });
        }
    };
    debug!(%total, %fee, %amount, inputs = utxos.len(), "send-all priced");

    // Every input is spent, so selection is skipped.
    let mut io_builder = InputOutputBuilder::empty();
    for input in inputs {
        io_builder.add_input(input);
    }
    io_builder.add_output(receiver, amount)?;
    let ios = io_builder.seal_with_output_policy(
        &Payload::NoPayload,
        fee_algorithm,
        OutputPolicy::Forget,
    )?;

    Ok(UnsignedTx {
        sender_utxos: utxos.to_vec(),
        ios,
        change: Vec::new(),
        certificate: None,
    })
}

/// Spend every addressed UTXO to `receiver`, with no change.
pub fn send_all_unsigned_tx(
    fee_algorithm: &impl FeeAlgorithm,
    receiver: &str,
    utxos: &[AddressedUtxo],
) -> Result<UnsignedTx<AddressedUtxo>, WalletError> {
    let raw: Vec<RawUtxo> = utxos.iter().map(|u| u.utxo.clone()).collect();
    let unsigned = send_all_unsigned_tx_from_utxo(fee_algorithm, receiver, &raw)?;
    attach_addressing(unsigned, utxos)
}

fn check_change_addresses(change_addresses: &[ChangeAddress]) -> Result<(), WalletError> {
    if change_addresses.len() > 1 {
        return Err(WalletError::UnsupportedConfiguration(format!(
            "only a single change address is supported, got {}",
            change_addresses.len()
        )));
    }
    Ok(())
}

fn assemble(
    fee_algorithm: &impl FeeAlgorithm,
    receiver: Address,
    amount: Value,
    change_addresses: &[ChangeAddress],
    utxos: &[RawUtxo],
    certificate: Option<Certificate>,
) -> Result<UnsignedTx<RawUtxo>, WalletError> {
    if amount.is_zero() {
        return Err(WalletError::InvalidAmount("amount must be non-zero".into()));
    }

    let mut io_builder = InputOutputBuilder::empty();
    io_builder.add_output(receiver, amount)?;
    let payload = Payload::from(certificate.clone());

    let selected =
        InputSelector::first_match_first(&mut io_builder, utxos, fee_algorithm, &payload)?;

    let (ios, change) = match change_addresses {
        [change_address] => {
            let policy = OutputPolicy::One(Address::from_hex(&change_address.address)?);
            let ios = io_builder.seal_with_output_policy(&payload, fee_algorithm, policy)?;
            let change = filter_to_used_change(change_address, ios.outputs(), &selected)?;
            (ios, change)
        }
        _ => {
            let ios =
                io_builder.seal_with_output_policy(&payload, fee_algorithm, OutputPolicy::Forget)?;
            (ios, Vec::new())
        }
    };

    debug!(
        inputs = ios.inputs().len(),
        outputs = ios.outputs().len(),
        fee = %ios.fee(),
        change = change.len(),
        "unsigned transaction assembled"
    );

    Ok(UnsignedTx {
        sender_utxos: selected,
        ios,
        change,
        certificate,
    })
}

/// Replace each selected bare UTXO by its addressed original.
fn attach_addressing(
    unsigned: UnsignedTx<RawUtxo>,
    utxos: &[AddressedUtxo],
) -> Result<UnsignedTx<AddressedUtxo>, WalletError> {
    let mut by_key: HashMap<UtxoKey, &AddressedUtxo> = HashMap::with_capacity(utxos.len());
    for utxo in utxos {
        by_key.entry(utxo.utxo.key()).or_insert(utxo);
    }

    let sender_utxos = unsigned
        .sender_utxos
        .iter()
        .map(|raw| {
            by_key.get(&raw.key()).map(|a| (*a).clone()).ok_or_else(|| {
                WalletError::InternalConsistency(format!(
                    "selected utxo {}:{} has no addressed original",
                    raw.tx_hash, raw.tx_index
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(UnsignedTx {
        sender_utxos,
        ios: unsigned.ios,
        change: unsigned.change,
        certificate: unsigned.certificate,
    })
}
