//! Network constants. All monetary values in lovelace (1 ADA = 10^6 lovelace).

pub const LOVELACE_PER_ADA: u64 = 1_000_000;

/// Default fee charged per transaction regardless of shape.
pub const DEFAULT_FEE_CONSTANT: &str = "200000";

/// Default fee charged per input and per output.
pub const DEFAULT_FEE_COEFFICIENT: &str = "100000";

/// Default extra fee charged when the transaction carries a certificate.
pub const DEFAULT_FEE_CERTIFICATE: &str = "400000";

/// Hex-encoded hash of the Shelley genesis block (block0).
///
/// Every witness commits to this hash, so a transaction signed for one
/// network can never be replayed on another.
pub const DEFAULT_GENESIS_HASH: &str =
    "8e4d2a343f3dcf9330ad9035b3e8d168e6728904262f2c434a4f8f934ec7b676";

/// Address header bit set for test-network addresses.
pub const DISCRIMINATION_TEST_BIT: u8 = 0x80;

/// Witness tag: legacy (Icarus/Byron-style) UTXO witness.
pub const WITNESS_TAG_OLD_UTXO: u8 = 0;

/// Witness tag: Shelley UTXO witness.
pub const WITNESS_TAG_UTXO: u8 = 1;

/// Fragment tag for a transaction fragment without a certificate.
pub const FRAGMENT_TAG_TRANSACTION: u8 = 2;

/// Fragment tag for a transaction fragment carrying a certificate.
pub const FRAGMENT_TAG_CERTIFICATE: u8 = 3;
