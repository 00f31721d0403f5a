//! Input/output builder and sealing under an output policy.
//!
//! The builder accumulates inputs and outputs, reports the running balance
//! against a [`FeeAlgorithm`], and finally seals into an immutable
//! [`InputOutput`]. Sealing decides what happens to any value left over
//! after outputs and fee:
//!
//! - [`OutputPolicy::Forget`] leaves it to the ledger as extra fee.
//! - [`OutputPolicy::One`] sends it to a change address, but only if the
//!   leftover still covers the fee of the extra output. Otherwise the
//!   leftover is forgotten as above.

use tracing::debug;

use crate::address::Address;
use crate::certificate::Payload;
use crate::error::TransactionError;
use crate::fee::FeeAlgorithm;
use crate::types::{Balance, Input, Output, Value};

/// What to do with value left over after sealing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputPolicy {
    /// Leftover value is not claimed by any output.
    Forget,
    /// Leftover value goes to this address when it is worth an output.
    One(Address),
}

/// Mutable accumulator of transaction inputs and outputs.
#[derive(Clone, Debug, Default)]
pub struct InputOutputBuilder {
    inputs: Vec<Input>,
    outputs: Vec<Output>,
}

impl InputOutputBuilder {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn add_input(&mut self, input: Input) -> &mut Self {
        self.inputs.push(input);
        self
    }

    /// Append an output. Zero-value outputs are rejected.
    pub fn add_output(&mut self, address: Address, value: Value) -> Result<&mut Self, TransactionError> {
        if value.is_zero() {
            return Err(TransactionError::ZeroValueOutput(self.outputs.len()));
        }
        self.outputs.push(Output { address, value });
        Ok(self)
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn total_input(&self) -> Result<Value, TransactionError> {
        Value::sum(self.inputs.iter().map(|i| i.value)).ok_or(TransactionError::ValueOverflow)
    }

    pub fn total_output(&self) -> Result<Value, TransactionError> {
        Value::sum(self.outputs.iter().map(|o| o.value)).ok_or(TransactionError::ValueOverflow)
    }

    /// Fee the algorithm charges for the current shape.
    pub fn estimate_fee(
        &self,
        fee_algorithm: &impl FeeAlgorithm,
        payload: &Payload,
    ) -> Result<Value, TransactionError> {
        fee_algorithm
            .calculate(payload, self.inputs.len(), self.outputs.len())
            .ok_or(TransactionError::ValueOverflow)
    }

    /// `inputs - outputs - fee` for the current shape.
    pub fn balance(
        &self,
        payload: &Payload,
        fee_algorithm: &impl FeeAlgorithm,
    ) -> Result<Balance, TransactionError> {
        let fee = self.estimate_fee(fee_algorithm, payload)?;
        let needed = self
            .total_output()?
            .checked_add(fee)
            .ok_or(TransactionError::ValueOverflow)?;
        Ok(Balance::compute(self.total_input()?, needed))
    }

    /// Seal the inputs and outputs, applying `policy` to any leftover.
    ///
    /// Fails with [`TransactionError::NotEnoughInput`] if the inputs do not
    /// cover outputs plus fee.
    pub fn seal_with_output_policy(
        mut self,
        payload: &Payload,
        fee_algorithm: &impl FeeAlgorithm,
        policy: OutputPolicy,
    ) -> Result<InputOutput, TransactionError> {
        let total_in = self.total_input()?;
        let total_out = self.total_output()?;
        let fee = self.estimate_fee(fee_algorithm, payload)?;
        let needed = total_out.checked_add(fee).ok_or(TransactionError::ValueOverflow)?;

        match Balance::compute(total_in, needed) {
            Balance::Negative(_) => {
                return Err(TransactionError::NotEnoughInput {
                    have: total_in.as_u64(),
                    need: needed.as_u64(),
                });
            }
            Balance::Zero => {}
            Balance::Positive(leftover) => match policy {
                OutputPolicy::Forget => {
                    debug!(%leftover, "forgetting leftover value");
                }
                OutputPolicy::One(change_address) => {
                    let fee_with_change = fee_algorithm
                        .calculate(payload, self.inputs.len(), self.outputs.len() + 1)
                        .ok_or(TransactionError::ValueOverflow)?;
                    let needed_with_change = total_out
                        .checked_add(fee_with_change)
                        .ok_or(TransactionError::ValueOverflow)?;
                    match Balance::compute(total_in, needed_with_change) {
                        Balance::Positive(change) => {
                            debug!(%change, address = %change_address, "adding change output");
                            self.outputs.push(Output {
                                address: change_address,
                                value: change,
                            });
                        }
                        _ => {
                            debug!(%leftover, %fee_with_change, "leftover does not cover a change output");
                        }
                    }
                }
            },
        }

        let total_out = self.total_output()?;
        let fee = total_in
            .checked_sub(total_out)
            .ok_or(TransactionError::ValueOverflow)?;
        Ok(InputOutput {
            inputs: self.inputs,
            outputs: self.outputs,
            fee,
        })
    }
}

/// Sealed, balanced inputs and outputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputOutput {
    inputs: Vec<Input>,
    outputs: Vec<Output>,
    fee: Value,
}

impl InputOutput {
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Value paid to the ledger: total inputs minus total outputs,
    /// including any leftover that was forgotten.
    pub fn fee(&self) -> Value {
        self.fee
    }

    pub fn total_input(&self) -> Option<Value> {
        Value::sum(self.inputs.iter().map(|i| i.value))
    }

    pub fn total_output(&self) -> Option<Value> {
        Value::sum(self.outputs.iter().map(|o| o.value))
    }
}
