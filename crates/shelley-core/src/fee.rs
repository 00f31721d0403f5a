//! Linear fee model.
//!
//! `fee = constant + coefficient * (inputs + outputs) + certificate`, where
//! the certificate term only applies when the transaction carries a
//! certificate payload. The ledger measures transaction size in
//! inputs plus outputs.

use crate::certificate::Payload;
use crate::error::ValueError;
use crate::types::Value;

/// Computes the fee for a transaction of a given shape.
pub trait FeeAlgorithm {
    /// Fee for a transaction with `inputs` inputs and `outputs` outputs
    /// carrying `payload`. Returns `None` on arithmetic overflow.
    fn calculate(&self, payload: &Payload, inputs: usize, outputs: usize) -> Option<Value>;
}

/// The linear fee schedule published by the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinearFee {
    pub constant: Value,
    pub coefficient: Value,
    pub certificate: Value,
}

impl LinearFee {
    pub fn new(constant: Value, coefficient: Value, certificate: Value) -> Self {
        Self {
            constant,
            coefficient,
            certificate,
        }
    }

    /// Build from the three decimal strings of a fee schedule.
    pub fn from_str_parts(
        constant: &str,
        coefficient: &str,
        certificate: &str,
    ) -> Result<Self, ValueError> {
        Ok(Self::new(
            constant.parse()?,
            coefficient.parse()?,
            certificate.parse()?,
        ))
    }
}

impl FeeAlgorithm for LinearFee {
    fn calculate(&self, payload: &Payload, inputs: usize, outputs: usize) -> Option<Value> {
        let size = u64::try_from(inputs.checked_add(outputs)?).ok()?;
        let certificate = if payload.has_certificate() {
            self.certificate
        } else {
            Value::ZERO
        };
        self.coefficient
            .checked_mul(size)?
            .checked_add(self.constant)?
            .checked_add(certificate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::Certificate;
    use proptest::prelude::*;

    fn cert_payload() -> Payload {
        Payload::certificate(Certificate::StakeDeregistration { account: [1; 32] })
    }

    #[test]
    fn constant_only() {
        let fee = LinearFee::new(Value(200_000), Value(0), Value(400_000));
        assert_eq!(fee.calculate(&Payload::NoPayload, 5, 2), Some(Value(200_000)));
    }

    #[test]
    fn coefficient_scales_with_shape() {
        let fee = LinearFee::new(Value(1000), Value(10), Value(0));
        assert_eq!(fee.calculate(&Payload::NoPayload, 2, 3), Some(Value(1050)));
        assert_eq!(fee.calculate(&Payload::NoPayload, 0, 0), Some(Value(1000)));
    }

    #[test]
    fn certificate_fee_only_with_certificate() {
        let fee = LinearFee::new(Value(1000), Value(10), Value(500));
        assert_eq!(fee.calculate(&cert_payload(), 1, 1), Some(Value(1520)));
        assert_eq!(fee.calculate(&Payload::NoPayload, 1, 1), Some(Value(1020)));
    }

    #[test]
    fn overflow_is_none() {
        let fee = LinearFee::new(Value(u64::MAX), Value(1), Value(0));
        assert_eq!(fee.calculate(&Payload::NoPayload, 1, 0), None);
    }

    #[test]
    fn from_str_parts_parses() {
        let fee = LinearFee::from_str_parts("155381", "44", "400000").unwrap();
        assert_eq!(fee, LinearFee::new(Value(155_381), Value(44), Value(400_000)));
        assert!(LinearFee::from_str_parts("1.5", "0", "0").is_err());
        assert!(LinearFee::from_str_parts("", "0", "0").is_err());
    }

    proptest! {
        #[test]
        fn monotone_in_constant_and_coefficient(
            constant in 0u64..1_000_000_000,
            coefficient in 0u64..1_000_000,
            bump in 0u64..1_000_000,
            inputs in 0usize..100,
            outputs in 0usize..100,
            with_cert in any::<bool>(),
        ) {
            let payload = if with_cert { cert_payload() } else { Payload::NoPayload };
            let base = LinearFee::new(Value(constant), Value(coefficient), Value(400_000));
            let more_constant = LinearFee::new(Value(constant + bump), Value(coefficient), Value(400_000));
            let more_coefficient = LinearFee::new(Value(constant), Value(coefficient + bump), Value(400_000));

            let f0 = base.calculate(&payload, inputs, outputs).unwrap();
            prop_assert!(more_constant.calculate(&payload, inputs, outputs).unwrap() >= f0);
            prop_assert!(more_coefficient.calculate(&payload, inputs, outputs).unwrap() >= f0);
        }

        #[test]
        fn monotone_in_shape(
            constant in 0u64..1_000_000_000,
            coefficient in 0u64..1_000_000,
            inputs in 0usize..100,
            outputs in 0usize..100,
        ) {
            let fee = LinearFee::new(Value(constant), Value(coefficient), Value(0));
            let f0 = fee.calculate(&Payload::NoPayload, inputs, outputs).unwrap();
            prop_assert!(fee.calculate(&Payload::NoPayload, inputs + 1, outputs).unwrap() >= f0);
            prop_assert!(fee.calculate(&Payload::NoPayload, inputs, outputs + 1).unwrap() >= f0);
        }
    }
}
