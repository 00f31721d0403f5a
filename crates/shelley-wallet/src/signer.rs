//! Signing of assembled transactions.
//!
//! Each input is witnessed by the key at `account / change / index` taken
//! from the addressing of the UTXO it spends. Witnesses are positional.

use tracing::debug;

use shelley_core::certificate::{AccountBindingSignature, Certificate, PayloadAuthData};
use shelley_core::crypto::{Bip32PrivateKey, PrivateKey};
use shelley_core::transaction::{Fragment, TransactionBuilder, Witness};
use shelley_core::types::Hash256;

use crate::builder::UnsignedTx;
use crate::error::WalletError;
use crate::utxo::AddressedUtxo;

/// Which witness form to produce for every input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WitnessScheme {
    /// Legacy extended-key witness, for outputs held at bootstrap-era keys.
    Legacy,
    /// Signature-only witness.
    Current,
}

impl From<bool> for WitnessScheme {
    /// `true` selects the legacy scheme.
    fn from(legacy: bool) -> Self {
        if legacy {
            WitnessScheme::Legacy
        } else {
            WitnessScheme::Current
        }
    }
}

/// A certificate and the account key that authorizes it.
pub struct StakingPayload {
    pub staking_key: PrivateKey,
    pub certificate: Certificate,
}

/// Witness every input of `unsigned`, authenticate the payload and encode
/// the result.
///
/// `signing_key` is the account-level key. When `staking` is given its
/// certificate becomes the payload and the binding signature is made with
/// its staking key over the transaction's binding data.
///
/// # Errors
/// [`WalletError::UnsupportedConfiguration`] if `staking` does not carry
/// exactly the certificate `unsigned` was priced with.
pub fn sign_transaction(
    unsigned: &UnsignedTx<AddressedUtxo>,
    signing_key: &Bip32PrivateKey,
    scheme: WitnessScheme,
    genesis_hash: &Hash256,
    staking: Option<&StakingPayload>,
) -> Result<Fragment, WalletError> {
    if staking.map(|s| &s.certificate) != unsigned.certificate.as_ref() {
        return Err(WalletError::UnsupportedConfiguration(
            "staking certificate differs from the one the transaction was assembled with".into(),
        ));
    }

    let builder = match staking {
        Some(staking) => TransactionBuilder::new().payload(staking.certificate.clone()),
        None => TransactionBuilder::new().no_payload(),
    };
    let builder = builder.set_ios(unsigned.ios.inputs(), unsigned.ios.outputs())?;
    let sign_data_hash = builder.get_auth_data_for_witness();

    let witnesses = unsigned
        .sender_utxos
        .iter()
        .map(|utxo| {
            let key = signing_key
                .derive(utxo.addressing.change)
                .derive(utxo.addressing.index);
            match scheme {
                WitnessScheme::Legacy => {
                    Witness::for_legacy_icarus_utxo(genesis_hash, &sign_data_hash, &key)
                }
                WitnessScheme::Current => {
                    Witness::for_utxo(genesis_hash, &sign_data_hash, &key.to_raw_key())
                }
            }
        })
        .collect();

    let builder = builder.set_witnesses(witnesses)?;
    let payload_auth = match staking {
        Some(staking) => PayloadAuthData::for_certificate(AccountBindingSignature::new_single(
            &staking.staking_key,
            builder.get_auth_data().as_ref(),
        )),
        None => PayloadAuthData::for_no_payload(),
    };
    let tx = builder.set_payload_auth(payload_auth)?;
    let fragment = Fragment::from_transaction(&tx)?;

    debug!(
        id = %fragment.id(),
        inputs = tx.inputs().len(),
        ?scheme,
        certificate = staking.is_some(),
        "transaction signed"
    );
    Ok(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelley_core::address::{Address, Discrimination};
    use shelley_core::constants::FRAGMENT_TAG_CERTIFICATE;
    use shelley_core::crypto::PublicKey;
    use shelley_core::error::TransactionError;
    use shelley_core::fee::LinearFee;
    use shelley_core::types::Value;

    use crate::builder::new_unsigned_tx;
    use crate::utxo::{Addressing, RawUtxo};

    fn account() -> Bip32PrivateKey {
        Bip32PrivateKey::from_bytes(&[7; 64])
    }

    fn key_at(addressing: Addressing) -> PublicKey {
        account()
            .derive(addressing.change)
            .derive(addressing.index)
            .to_raw_key()
            .to_public()
    }

    fn owned_utxo(seed: u8, amount: u64, addressing: Addressing) -> AddressedUtxo {
        AddressedUtxo::new(
            RawUtxo {
                tx_hash: hex::encode([seed; 32]),
                tx_index: 0,
                receiver: Address::single(Discrimination::Test, &key_at(addressing)).to_hex(),
                amount: amount.to_string(),
                utxo_id: String::new(),
            },
            addressing,
        )
    }

    fn receiver() -> String {
        Address::single(Discrimination::Test, &PrivateKey::from_bytes([0xAA; 32]).to_public())
            .to_hex()
    }

    fn unsigned(utxos: &[AddressedUtxo], certificate: Option<Certificate>) -> UnsignedTx<AddressedUtxo> {
        let fee = LinearFee::new(Value(10), Value(1), Value(5));
        new_unsigned_tx(&fee, &receiver(), "150", &[], utxos, certificate).unwrap()
    }

    fn spending_keys(unsigned: &UnsignedTx<AddressedUtxo>) -> Vec<PublicKey> {
        unsigned.sender_utxos.iter().map(|u| key_at(u.addressing)).collect()
    }

    #[test]
    fn scheme_from_bool() {
        assert_eq!(WitnessScheme::from(true), WitnessScheme::Legacy);
        assert_eq!(WitnessScheme::from(false), WitnessScheme::Current);
    }

    #[test]
    fn current_scheme_verifies() {
        let utxos = vec![
            owned_utxo(1, 100, Addressing { change: 0, index: 0 }),
            owned_utxo(2, 100, Addressing { change: 1, index: 4 }),
        ];
        let unsigned = unsigned(&utxos, None);
        let genesis = Hash256([3; 32]);
        let fragment =
            sign_transaction(&unsigned, &account(), WitnessScheme::Current, &genesis, None).unwrap();
        let tx = fragment.to_transaction().unwrap();
        assert!(tx.witnesses().iter().all(|w| matches!(w, Witness::Utxo(_))));
        tx.verify(&genesis, &spending_keys(&unsigned)).unwrap();
    }

    #[test]
    fn legacy_scheme_verifies() {
        let utxos = vec![owned_utxo(1, 500, Addressing { change: 0, index: 2 })];
        let unsigned = unsigned(&utxos, None);
        let genesis = Hash256([3; 32]);
        let fragment =
            sign_transaction(&unsigned, &account(), WitnessScheme::Legacy, &genesis, None).unwrap();
        let tx = fragment.to_transaction().unwrap();
        assert!(matches!(tx.witnesses()[0], Witness::OldUtxo { .. }));
        tx.verify(&genesis, &spending_keys(&unsigned)).unwrap();
    }

    #[test]
    fn wrong_genesis_fails_verification() {
        let utxos = vec![owned_utxo(1, 500, Addressing { change: 0, index: 0 })];
        let unsigned = unsigned(&utxos, None);
        let fragment =
            sign_transaction(&unsigned, &account(), WitnessScheme::Current, &Hash256([3; 32]), None)
                .unwrap();
        let err = fragment
            .to_transaction()
            .unwrap()
            .verify(&Hash256([4; 32]), &spending_keys(&unsigned))
            .unwrap_err();
        assert!(matches!(err, TransactionError::InvalidWitness { index: 0, .. }));
    }

    #[test]
    fn certificate_binding_signature_verifies() {
        let staking_key = PrivateKey::from_bytes([0x55; 32]);
        let certificate = Certificate::stake_delegation(&staking_key.to_public(), Hash256([9; 32]));
        let utxos = vec![owned_utxo(1, 500, Addressing { change: 0, index: 0 })];
        let unsigned = unsigned(&utxos, Some(certificate.clone()));
        let staking = StakingPayload {
            staking_key,
            certificate,
        };
        let genesis = Hash256([3; 32]);
        let fragment = sign_transaction(
            &unsigned,
            &account(),
            WitnessScheme::Current,
            &genesis,
            Some(&staking),
        )
        .unwrap();
        assert_eq!(fragment.as_bytes()[0], FRAGMENT_TAG_CERTIFICATE);
        fragment
            .to_transaction()
            .unwrap()
            .verify(&genesis, &spending_keys(&unsigned))
            .unwrap();
    }

    #[test]
    fn certificate_not_priced_is_rejected() {
        let staking_key = PrivateKey::from_bytes([0x55; 32]);
        let certificate = Certificate::stake_deregistration(&staking_key.to_public());
        let utxos = vec![owned_utxo(1, 500, Addressing { change: 0, index: 0 })];
        let unsigned = unsigned(&utxos, None);
        let staking = StakingPayload {
            staking_key,
            certificate,
        };
        let err = sign_transaction(
            &unsigned,
            &account(),
            WitnessScheme::Current,
            &Hash256([3; 32]),
            Some(&staking),
        )
        .unwrap_err();
        assert!(matches!(err, WalletError::UnsupportedConfiguration(_)));
    }

    #[test]
    fn priced_certificate_requires_staking_payload() {
        let staking_key = PrivateKey::from_bytes([0x55; 32]);
        let certificate = Certificate::stake_deregistration(&staking_key.to_public());
        let utxos = vec![owned_utxo(1, 500, Addressing { change: 0, index: 0 })];
        let unsigned = unsigned(&utxos, Some(certificate));
        let err = sign_transaction(&unsigned, &account(), WitnessScheme::Current, &Hash256([3; 32]), None)
            .unwrap_err();
        assert!(matches!(err, WalletError::UnsupportedConfiguration(_)));
    }

    #[test]
    fn spending_keys_from_addresses_verify() {
        let utxos = vec![
            owned_utxo(1, 100, Addressing { change: 0, index: 3 }),
            owned_utxo(2, 100, Addressing { change: 1, index: 1 }),
        ];
        let unsigned = unsigned(&utxos, None);
        let genesis = Hash256([3; 32]);
        let fragment =
            sign_transaction(&unsigned, &account(), WitnessScheme::Legacy, &genesis, None).unwrap();
        let keys = unsigned.spending_keys().unwrap();
        assert_eq!(keys, spending_keys(&unsigned));
        fragment.to_transaction().unwrap().verify(&genesis, &keys).unwrap();
    }

    #[test]
    fn signing_is_deterministic() {
        let utxos = vec![owned_utxo(1, 500, Addressing { change: 0, index: 0 })];
        let unsigned = unsigned(&utxos, None);
        let genesis = Hash256([3; 32]);
        let a = sign_transaction(&unsigned, &account(), WitnessScheme::Current, &genesis, None).unwrap();
        let b = sign_transaction(&unsigned, &account(), WitnessScheme::Current, &genesis, None).unwrap();
        assert_eq!(a.id(), b.id());
    }
}
