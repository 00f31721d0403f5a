//! Transaction assembly state machine, witnesses and fragments.
//!
//! A transaction is finalized in four steps, each a distinct type so a
//! step cannot be skipped:
//!
//! 1. [`TransactionBuilder`]: choose the payload (certificate or none)
//! 2. [`TransactionBuilderSetIOs`]: fix the sealed inputs and outputs
//! 3. [`TransactionBuilderSetWitness`]: attach one witness per input
//! 4. [`TransactionBuilderSetAuthData`]: attach payload authentication
//!
//! # Signing scheme
//!
//! Witnesses sign `tag || genesis_hash || sign_data_hash`, where
//! `sign_data_hash` is the BLAKE3 hash of the encoded payload, inputs and
//! outputs. Committing to the genesis hash binds the witness to one
//! network. Payload authentication (the account-binding signature) signs
//! the binding auth data: `sign_data_hash || encoded witnesses`.
//!
//! Encoding uses bincode with the standard configuration.

use crate::certificate::{Certificate, Payload, PayloadAuthData};
use crate::constants::{
    FRAGMENT_TAG_CERTIFICATE, FRAGMENT_TAG_TRANSACTION, WITNESS_TAG_OLD_UTXO, WITNESS_TAG_UTXO,
};
use crate::crypto::{Bip32PrivateKey, Bip32PublicKey, PrivateKey, PublicKey, Signature};
use crate::error::{CryptoError, TransactionError};
use crate::types::{FragmentId, Hash256, Input, Output};

fn encode<T: bincode::Encode>(value: &T) -> Result<Vec<u8>, TransactionError> {
    bincode::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| TransactionError::Serialization(e.to_string()))
}

/// Hash that every input witness signs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransactionSignDataHash(pub Hash256);

/// Data that payload authentication signs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionBindingAuthData(pub Vec<u8>);

impl AsRef<[u8]> for TransactionBindingAuthData {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// The signed-over content of a transaction.
#[derive(Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct TransactionBody {
    pub payload: Payload,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
}

impl TransactionBody {
    pub fn sign_data_hash(&self) -> Result<TransactionSignDataHash, TransactionError> {
        Ok(TransactionSignDataHash(Hash256::digest(&encode(self)?)))
    }
}

/// Proof that the owner of a spent output authorized the transaction.
#[derive(Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub enum Witness {
    /// Legacy witness: extended public key plus signature.
    OldUtxo { xpub: [u8; 64], signature: Signature },
    /// Shelley witness: signature only; the key comes from the spent address.
    Utxo(Signature),
}

fn witness_message(tag: u8, genesis: &Hash256, sign_data_hash: &TransactionSignDataHash) -> Vec<u8> {
    let mut msg = Vec::with_capacity(1 + 32 + 32);
    msg.push(tag);
    msg.extend_from_slice(genesis.as_bytes());
    msg.extend_from_slice(sign_data_hash.0.as_bytes());
    msg
}

impl Witness {
    /// Shelley witness signed with the raw key of the spent output.
    pub fn for_utxo(
        genesis: &Hash256,
        sign_data_hash: &TransactionSignDataHash,
        key: &PrivateKey,
    ) -> Self {
        Witness::Utxo(key.sign(&witness_message(WITNESS_TAG_UTXO, genesis, sign_data_hash)))
    }

    /// Legacy witness signed with the full extended key of the spent output.
    pub fn for_legacy_icarus_utxo(
        genesis: &Hash256,
        sign_data_hash: &TransactionSignDataHash,
        key: &Bip32PrivateKey,
    ) -> Self {
        let msg = witness_message(WITNESS_TAG_OLD_UTXO, genesis, sign_data_hash);
        Witness::OldUtxo {
            xpub: key.to_public().to_bytes(),
            signature: key.sign(&msg),
        }
    }

    /// Check this witness against the key that owns the spent output.
    pub fn verify(
        &self,
        genesis: &Hash256,
        sign_data_hash: &TransactionSignDataHash,
        spending_key: &PublicKey,
    ) -> Result<(), CryptoError> {
        match self {
            Witness::Utxo(signature) => spending_key.verify(
                &witness_message(WITNESS_TAG_UTXO, genesis, sign_data_hash),
                signature,
            ),
            Witness::OldUtxo { xpub, signature } => {
                let xpub = Bip32PublicKey::from_bytes(xpub)?;
                if xpub.public_key() != spending_key {
                    return Err(CryptoError::VerificationFailed);
                }
                xpub.public_key().verify(
                    &witness_message(WITNESS_TAG_OLD_UTXO, genesis, sign_data_hash),
                    signature,
                )
            }
        }
    }
}

/// Entry point of the builder: choose the payload.
#[derive(Debug, Default)]
pub struct TransactionBuilder;

impl TransactionBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn payload(self, certificate: Certificate) -> TransactionBuilderSetIOs {
        TransactionBuilderSetIOs {
            payload: Payload::Certificate(certificate),
        }
    }

    pub fn no_payload(self) -> TransactionBuilderSetIOs {
        TransactionBuilderSetIOs {
            payload: Payload::NoPayload,
        }
    }
}

/// Payload chosen; waiting for inputs and outputs.
#[derive(Debug)]
pub struct TransactionBuilderSetIOs {
    payload: Payload,
}

impl TransactionBuilderSetIOs {
    pub fn set_ios(
        self,
        inputs: &[Input],
        outputs: &[Output],
    ) -> Result<TransactionBuilderSetWitness, TransactionError> {
        let body = TransactionBody {
            payload: self.payload,
            inputs: inputs.to_vec(),
            outputs: outputs.to_vec(),
        };
        let sign_data_hash = body.sign_data_hash()?;
        Ok(TransactionBuilderSetWitness {
            body,
            sign_data_hash,
        })
    }
}

/// Body fixed; waiting for one witness per input.
#[derive(Debug)]
pub struct TransactionBuilderSetWitness {
    body: TransactionBody,
    sign_data_hash: TransactionSignDataHash,
}

impl TransactionBuilderSetWitness {
    /// The hash every input witness must sign.
    pub fn get_auth_data_for_witness(&self) -> TransactionSignDataHash {
        self.sign_data_hash
    }

    /// Attach witnesses. They are positional: witness `i` authorizes input `i`.
    pub fn set_witnesses(
        self,
        witnesses: Vec<Witness>,
    ) -> Result<TransactionBuilderSetAuthData, TransactionError> {
        if witnesses.len() != self.body.inputs.len() {
            return Err(TransactionError::WitnessCountMismatch {
                witnesses: witnesses.len(),
                inputs: self.body.inputs.len(),
            });
        }
        let mut auth = self.sign_data_hash.0.as_bytes().to_vec();
        auth.extend_from_slice(&encode(&witnesses)?);
        Ok(TransactionBuilderSetAuthData {
            body: self.body,
            witnesses,
            auth_data: TransactionBindingAuthData(auth),
        })
    }
}

/// Witnessed; waiting for payload authentication.
#[derive(Debug)]
pub struct TransactionBuilderSetAuthData {
    body: TransactionBody,
    witnesses: Vec<Witness>,
    auth_data: TransactionBindingAuthData,
}

impl TransactionBuilderSetAuthData {
    /// The data an account-binding signature must sign.
    pub fn get_auth_data(&self) -> &TransactionBindingAuthData {
        &self.auth_data
    }

    pub fn set_payload_auth(
        self,
        payload_auth: PayloadAuthData,
    ) -> Result<Transaction, TransactionError> {
        if !payload_auth.matches(&self.body.payload) {
            return Err(TransactionError::PayloadAuthMismatch);
        }
        Ok(Transaction {
            body: self.body,
            witnesses: self.witnesses,
            payload_auth,
        })
    }
}

/// A fully authenticated transaction.
#[derive(Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct Transaction {
    body: TransactionBody,
    witnesses: Vec<Witness>,
    payload_auth: PayloadAuthData,
}

impl Transaction {
    pub fn body(&self) -> &TransactionBody {
        &self.body
    }

    pub fn inputs(&self) -> &[Input] {
        &self.body.inputs
    }

    pub fn outputs(&self) -> &[Output] {
        &self.body.outputs
    }

    pub fn payload(&self) -> &Payload {
        &self.body.payload
    }

    pub fn witnesses(&self) -> &[Witness] {
        &self.witnesses
    }

    pub fn payload_auth(&self) -> &PayloadAuthData {
        &self.payload_auth
    }

    pub fn binding_auth_data(&self) -> Result<TransactionBindingAuthData, TransactionError> {
        let mut auth = self.body.sign_data_hash()?.0.as_bytes().to_vec();
        auth.extend_from_slice(&encode(&self.witnesses)?);
        Ok(TransactionBindingAuthData(auth))
    }

    /// Verify every witness against the spending key of the output it
    /// spends, in input order, and the payload authentication against the
    /// certificate's account key.
    pub fn verify(&self, genesis: &Hash256, spending_keys: &[PublicKey]) -> Result<(), TransactionError> {
        if spending_keys.len() != self.witnesses.len() {
            return Err(TransactionError::WitnessCountMismatch {
                witnesses: self.witnesses.len(),
                inputs: spending_keys.len(),
            });
        }
        let sign_data_hash = self.body.sign_data_hash()?;
        for (index, (witness, key)) in self.witnesses.iter().zip(spending_keys).enumerate() {
            witness
                .verify(genesis, &sign_data_hash, key)
                .map_err(|source| TransactionError::InvalidWitness { index, source })?;
        }

        match (&self.body.payload, &self.payload_auth) {
            (Payload::NoPayload, PayloadAuthData::NoPayload) => Ok(()),
            (Payload::Certificate(cert), PayloadAuthData::Certificate(sig)) => {
                let account = PublicKey::from_bytes(cert.account())
                    .map_err(|_| TransactionError::PayloadAuthMismatch)?;
                if sig.verify(&account, self.binding_auth_data()?.as_ref()) {
                    Ok(())
                } else {
                    Err(TransactionError::PayloadAuthMismatch)
                }
            }
            _ => Err(TransactionError::PayloadAuthMismatch),
        }
    }
}

/// An encoded transaction ready for broadcast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
    bytes: Vec<u8>,
}

impl Fragment {
    /// Encode a transaction: a tag byte followed by the bincode encoding.
    pub fn from_transaction(tx: &Transaction) -> Result<Self, TransactionError> {
        let tag = match tx.payload() {
            Payload::NoPayload => FRAGMENT_TAG_TRANSACTION,
            Payload::Certificate(_) => FRAGMENT_TAG_CERTIFICATE,
        };
        let mut bytes = vec![tag];
        bytes.extend_from_slice(&encode(tx)?);
        Ok(Self { bytes })
    }

    /// Parse and validate fragment bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, TransactionError> {
        let fragment = Self { bytes };
        fragment.to_transaction()?;
        Ok(fragment)
    }

    /// Decode the contained transaction, re-validating output addresses.
    pub fn to_transaction(&self) -> Result<Transaction, TransactionError> {
        let (&tag, body) = self.bytes.split_first().ok_or(TransactionError::EmptyFragment)?;
        if tag != FRAGMENT_TAG_TRANSACTION && tag != FRAGMENT_TAG_CERTIFICATE {
            return Err(TransactionError::UnknownFragmentTag(tag));
        }
        let (tx, read): (Transaction, usize) =
            bincode::decode_from_slice(body, bincode::config::standard())
                .map_err(|e| TransactionError::Serialization(e.to_string()))?;
        if read != body.len() {
            return Err(TransactionError::Serialization(format!(
                "{} trailing bytes",
                body.len() - read
            )));
        }
        for output in tx.outputs() {
            crate::address::Address::from_bytes(&output.address.to_bytes())
                .map_err(|e| TransactionError::Serialization(e.to_string()))?;
        }
        Ok(tx)
    }

    /// Content id: BLAKE3 hash of the fragment bytes.
    pub fn id(&self) -> FragmentId {
        Hash256::digest(&self.bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{Address, Discrimination};
    use crate::certificate::AccountBindingSignature;
    use crate::types::Value;

    const GENESIS: Hash256 = Hash256([0x8E; 32]);

    fn key(i: u32) -> Bip32PrivateKey {
        Bip32PrivateKey::from_bytes(&[0x42; 64]).derive(0).derive(i)
    }

    fn inputs(n: u8) -> Vec<Input> {
        (0..n)
            .map(|i| Input::from_utxo(Hash256([i + 1; 32]), i as u32, Value(1000)))
            .collect()
    }

    fn outputs() -> Vec<Output> {
        let pk = PrivateKey::from_bytes([7; 32]).to_public();
        vec![Output {
            address: Address::single(Discrimination::Test, &pk),
            value: Value(900),
        }]
    }

    fn witnessed(n: u8, legacy: bool) -> (TransactionBuilderSetAuthData, Vec<PublicKey>) {
        let ins = inputs(n);
        let set_witness = TransactionBuilder::new()
            .no_payload()
            .set_ios(&ins, &outputs())
            .unwrap();
        let hash = set_witness.get_auth_data_for_witness();
        let witnesses = (0..n as u32)
            .map(|i| {
                if legacy {
                    Witness::for_legacy_icarus_utxo(&GENESIS, &hash, &key(i))
                } else {
                    Witness::for_utxo(&GENESIS, &hash, &key(i).to_raw_key())
                }
            })
            .collect();
        let keys = (0..n as u32).map(|i| *key(i).to_public().public_key()).collect();
        (set_witness.set_witnesses(witnesses).unwrap(), keys)
    }

    #[test]
    fn sign_data_hash_depends_on_body() {
        let a = TransactionBuilder::new().no_payload().set_ios(&inputs(1), &outputs()).unwrap();
        let b = TransactionBuilder::new().no_payload().set_ios(&inputs(2), &outputs()).unwrap();
        assert_ne!(a.get_auth_data_for_witness(), b.get_auth_data_for_witness());
    }

    #[test]
    fn current_witnesses_verify() {
        let (auth, keys) = witnessed(3, false);
        let tx = auth.set_payload_auth(PayloadAuthData::for_no_payload()).unwrap();
        assert_eq!(tx.witnesses().len(), 3);
        assert!(tx.verify(&GENESIS, &keys).is_ok());
    }

    #[test]
    fn legacy_witnesses_verify() {
        let (auth, keys) = witnessed(2, true);
        let tx = auth.set_payload_auth(PayloadAuthData::for_no_payload()).unwrap();
        assert!(matches!(tx.witnesses()[0], Witness::OldUtxo { .. }));
        assert!(tx.verify(&GENESIS, &keys).is_ok());
    }

    #[test]
    fn witnesses_bound_to_genesis() {
        let (auth, keys) = witnessed(1, false);
        let tx = auth.set_payload_auth(PayloadAuthData::for_no_payload()).unwrap();
        let err = tx.verify(&Hash256::ZERO, &keys).unwrap_err();
        assert!(matches!(err, TransactionError::InvalidWitness { index: 0, .. }));
    }

    #[test]
    fn witnesses_are_positional() {
        let (auth, mut keys) = witnessed(2, false);
        let tx = auth.set_payload_auth(PayloadAuthData::for_no_payload()).unwrap();
        keys.swap(0, 1);
        assert!(tx.verify(&GENESIS, &keys).is_err());
    }

    #[test]
    fn witness_count_must_match_inputs() {
        let set_witness = TransactionBuilder::new()
            .no_payload()
            .set_ios(&inputs(2), &outputs())
            .unwrap();
        let hash = set_witness.get_auth_data_for_witness();
        let err = set_witness
            .set_witnesses(vec![Witness::for_utxo(&GENESIS, &hash, &key(0).to_raw_key())])
            .unwrap_err();
        assert_eq!(err, TransactionError::WitnessCountMismatch { witnesses: 1, inputs: 2 });
    }

    #[test]
    fn payload_auth_must_match_payload() {
        let (auth, _) = witnessed(1, false);
        let sig = AccountBindingSignature::new_single(&PrivateKey::from_bytes([1; 32]), b"x");
        assert_eq!(
            auth.set_payload_auth(PayloadAuthData::for_certificate(sig)).unwrap_err(),
            TransactionError::PayloadAuthMismatch
        );
    }

    #[test]
    fn certificate_binding_signature_verifies() {
        let stake = PrivateKey::from_bytes([9; 32]);
        let cert = Certificate::stake_delegation(&stake.to_public(), Hash256([3; 32]));
        let ins = inputs(1);
        let set_witness = TransactionBuilder::new().payload(cert).set_ios(&ins, &outputs()).unwrap();
        let hash = set_witness.get_auth_data_for_witness();
        let auth = set_witness
            .set_witnesses(vec![Witness::for_utxo(&GENESIS, &hash, &key(0).to_raw_key())])
            .unwrap();
        let sig = AccountBindingSignature::new_single(&stake, auth.get_auth_data().as_ref());
        let tx = auth.set_payload_auth(PayloadAuthData::for_certificate(sig)).unwrap();
        assert!(tx.verify(&GENESIS, &[*key(0).to_public().public_key()]).is_ok());
    }

    #[test]
    fn binding_auth_data_matches_builder() {
        let (auth, _) = witnessed(2, false);
        let expected = auth.get_auth_data().clone();
        let tx = auth.set_payload_auth(PayloadAuthData::for_no_payload()).unwrap();
        assert_eq!(tx.binding_auth_data().unwrap(), expected);
    }

    #[test]
    fn fragment_roundtrip() {
        let (auth, keys) = witnessed(2, false);
        let tx = auth.set_payload_auth(PayloadAuthData::for_no_payload()).unwrap();
        let fragment = Fragment::from_transaction(&tx).unwrap();
        assert_eq!(fragment.as_bytes()[0], FRAGMENT_TAG_TRANSACTION);

        let parsed = Fragment::from_bytes(fragment.as_bytes().to_vec()).unwrap();
        assert_eq!(parsed.id(), fragment.id());
        let decoded = parsed.to_transaction().unwrap();
        assert_eq!(decoded, tx);
        assert!(decoded.verify(&GENESIS, &keys).is_ok());
    }

    #[test]
    fn fragment_rejects_garbage() {
        assert_eq!(Fragment::from_bytes(vec![]).unwrap_err(), TransactionError::EmptyFragment);
        assert_eq!(
            Fragment::from_bytes(vec![0x7F, 1, 2]).unwrap_err(),
            TransactionError::UnknownFragmentTag(0x7F)
        );
        assert!(matches!(
            Fragment::from_bytes(vec![FRAGMENT_TAG_TRANSACTION, 0xFF]),
            Err(TransactionError::Serialization(_))
        ));
    }

    #[test]
    fn fragment_id_is_content_hash() {
        let (auth, _) = witnessed(1, true);
        let tx = auth.set_payload_auth(PayloadAuthData::for_no_payload()).unwrap();
        let fragment = Fragment::from_transaction(&tx).unwrap();
        assert_eq!(fragment.id(), Hash256::digest(fragment.as_bytes()));
        assert_eq!(fragment.to_hex().len(), fragment.as_bytes().len() * 2);
    }
}
