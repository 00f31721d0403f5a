//! Shared fixtures for the integration tests.

use shelley_core::address::{Address, Discrimination};
use shelley_core::crypto::{Bip32PrivateKey, PrivateKey, PublicKey};
use shelley_core::fee::LinearFee;
use shelley_core::types::Value;
use shelley_wallet::{AddressedUtxo, Addressing, ChangeAddress, RawUtxo, UnsignedTx};

/// Deterministic account-level key.
pub fn account_key() -> Bip32PrivateKey {
    Bip32PrivateKey::from_bytes(&[0x42; 64])
}

/// Spending key the account derives at `addressing`.
pub fn spending_key(addressing: Addressing) -> PublicKey {
    account_key()
        .derive(addressing.change)
        .derive(addressing.index)
        .to_raw_key()
        .to_public()
}

/// Test-network single address owned by the account at `addressing`.
pub fn owned_address(addressing: Addressing) -> Address {
    Address::single(Discrimination::Test, &spending_key(addressing))
}

/// Test-network single address not owned by the account.
pub fn foreign_address(seed: u8) -> Address {
    Address::single(Discrimination::Test, &PrivateKey::from_bytes([seed; 32]).to_public())
}

/// External-chain UTXO owned by the account, unique per `n`.
pub fn utxo(n: u32, amount: u64) -> AddressedUtxo {
    let addressing = Addressing { change: 0, index: n };
    let mut tx_hash = [0u8; 32];
    tx_hash[..4].copy_from_slice(&n.to_le_bytes());
    tx_hash[31] = 0xEE;
    let tx_hash = hex::encode(tx_hash);
    AddressedUtxo::new(
        RawUtxo {
            utxo_id: format!("{tx_hash}{n}"),
            tx_hash,
            tx_index: n % 4,
            receiver: owned_address(addressing).to_hex(),
            amount: amount.to_string(),
        },
        addressing,
    )
}

/// Internal-chain change address at `index`.
pub fn change_address(index: u32) -> ChangeAddress {
    let addressing = Addressing { change: 1, index };
    ChangeAddress {
        address: owned_address(addressing).to_hex(),
        addressing,
    }
}

pub fn linear_fee(constant: u64, coefficient: u64, certificate: u64) -> LinearFee {
    LinearFee::new(Value(constant), Value(coefficient), Value(certificate))
}

/// Spending keys of the inputs of `unsigned`, in input order.
pub fn spending_keys(unsigned: &UnsignedTx<AddressedUtxo>) -> Vec<PublicKey> {
    unsigned
        .sender_utxos
        .iter()
        .map(|u| spending_key(u.addressing))
        .collect()
}

/// Sum of `inputs - outputs - fee` for a sealed transaction; zero when it
/// conserves value.
pub fn conservation_gap<U>(unsigned: &UnsignedTx<U>) -> Option<i128> {
    let inputs = unsigned.ios.total_input()?.as_u64() as i128;
    let outputs = unsigned.ios.total_output()?.as_u64() as i128;
    Some(inputs - outputs - unsigned.ios.fee().as_u64() as i128)
}
