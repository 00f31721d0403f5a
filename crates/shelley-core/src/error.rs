//! Error types for Shelley ledger primitives.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("empty amount")] Empty,
    #[error("invalid amount: {0}")] Invalid(String),
    #[error("amount overflows u64: {0}")] Overflow(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid hex: {0}")] InvalidHex(String),
    #[error("empty address")] Empty,
    #[error("unknown address kind: {0:#04x}")] UnknownKind(u8),
    #[error("invalid length for {kind}: got {got}, expected {expected}")] InvalidLength { kind: &'static str, got: usize, expected: usize },
    #[error("invalid key in address")] InvalidKey,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid public key bytes")] InvalidPublicKey,
    #[error("invalid key length: got {got}, expected {expected}")] InvalidKeyLength { got: usize, expected: usize },
    #[error("invalid hex: {0}")] InvalidHex(String),
    #[error("invalid hash length: {0}")] InvalidHashLength(usize),
    #[error("signature verification failed")] VerificationFailed,
    #[error("address has no spending key")] NoSpendingKey,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("not enough input: have {have}, need {need}")] NotEnoughInput { have: u64, need: u64 },
    #[error("value overflow")] ValueOverflow,
    #[error("zero-value output at index {0}")] ZeroValueOutput(usize),
    #[error("witness count mismatch: {witnesses} witnesses for {inputs} inputs")] WitnessCountMismatch { witnesses: usize, inputs: usize },
    #[error("payload authentication does not match payload")] PayloadAuthMismatch,
    #[error("invalid witness at index {index}: {source}")] InvalidWitness { index: usize, source: CryptoError },
    #[error("serialization: {0}")] Serialization(String),
    #[error("unknown fragment tag: {0}")] UnknownFragmentTag(u8),
    #[error("empty fragment")] EmptyFragment,
}
