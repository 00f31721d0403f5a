//! Ed25519 keys, hierarchical child derivation and signatures.
//!
//! Uses ed25519-dalek for signing and BLAKE3 for child key derivation.
//!
//! # Key hierarchy
//!
//! A [`Bip32PrivateKey`] is a 32-byte Ed25519 secret paired with a 32-byte
//! chain code. A child at index `i` is derived by feeding the parent secret
//! and `i` through BLAKE3 keyed with the parent chain code and splitting the
//! 64-byte XOF output into the child secret and child chain code. Wallets
//! sign with `account.derive(change).derive(index)`.
//!
//! The raw (non-extended) form, [`PrivateKey`], drops the chain code and
//! is what the current witness scheme and account-binding signatures use.

use ed25519_dalek::{Signer, Verifier};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// Domain separator mixed into every child derivation.
const DERIVE_DOMAIN: &[u8] = b"shelley-core-child-derivation-v1";

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(self.0))
    }
}

/// Raw Ed25519 private key without a chain code.
pub struct PrivateKey {
    signing_key: ed25519_dalek::SigningKey,
}

impl PrivateKey {
    /// Generate a random key using the OS cryptographic RNG.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    /// Create a key from 32-byte secret key material.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(&bytes),
        }
    }

    /// Parse a key from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength { got: bytes.len(), expected: 32 })?;
        Ok(Self::from_bytes(arr))
    }

    /// Get the raw secret key bytes. Handle with care.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    pub fn to_public(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }
}

impl Clone for PrivateKey {
    fn clone(&self) -> Self {
        Self::from_bytes(self.secret_bytes())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.to_public())
            .finish_non_exhaustive()
    }
}

/// Ed25519 public key.
#[derive(Clone, Copy)]
pub struct PublicKey {
    verifying_key: ed25519_dalek::VerifyingKey,
}

impl PublicKey {
    /// Create a public key from raw bytes. Fails if the bytes are not a
    /// valid curve point.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let vk = ed25519_dalek::VerifyingKey::from_bytes(bytes)
            .map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self { verifying_key: vk })
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    /// Verify an Ed25519 signature on a message.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), CryptoError> {
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        self.verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::VerificationFailed)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.to_bytes()))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.to_bytes()))
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PublicKey {}

impl std::hash::Hash for PublicKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state);
    }
}

/// Extended private key: Ed25519 secret plus chain code.
///
/// Secret material is zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Bip32PrivateKey {
    secret: [u8; 32],
    chain_code: [u8; 32],
}

impl Bip32PrivateKey {
    /// Generate a random extended key from the OS cryptographic RNG.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; 64];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    pub fn from_parts(secret: [u8; 32], chain_code: [u8; 32]) -> Self {
        Self { secret, chain_code }
    }

    /// Create a key from 64 bytes: secret followed by chain code.
    pub fn from_bytes(bytes: &[u8; 64]) -> Self {
        let mut secret = [0u8; 32];
        let mut chain_code = [0u8; 32];
        secret.copy_from_slice(&bytes[..32]);
        chain_code.copy_from_slice(&bytes[32..]);
        Self { secret, chain_code }
    }

    /// Parse a key from a 128-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let mut bytes = hex::decode(s).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        let key = <&[u8; 64]>::try_from(bytes.as_slice())
            .map(Self::from_bytes)
            .map_err(|_| CryptoError::InvalidKeyLength { got: bytes.len(), expected: 64 });
        bytes.zeroize();
        key
    }

    /// Derive the child key at `index`.
    pub fn derive(&self, index: u32) -> Bip32PrivateKey {
        let mut hasher = blake3::Hasher::new_keyed(&self.chain_code);
        hasher.update(DERIVE_DOMAIN);
        hasher.update(&self.secret);
        hasher.update(&index.to_le_bytes());
        let mut out = [0u8; 64];
        hasher.finalize_xof().fill(&mut out);
        let child = Self::from_bytes(&out);
        out.zeroize();
        child
    }

    /// Drop the chain code, keeping only the Ed25519 secret.
    pub fn to_raw_key(&self) -> PrivateKey {
        PrivateKey::from_bytes(self.secret)
    }

    pub fn to_public(&self) -> Bip32PublicKey {
        Bip32PublicKey {
            public_key: self.to_raw_key().to_public(),
            chain_code: self.chain_code,
        }
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.to_raw_key().sign(message)
    }
}

impl Clone for Bip32PrivateKey {
    fn clone(&self) -> Self {
        Self {
            secret: self.secret,
            chain_code: self.chain_code,
        }
    }
}

impl fmt::Debug for Bip32PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bip32PrivateKey")
            .field("secret", &"[REDACTED]")
            .field("public_key", &self.to_public().public_key)
            .finish()
    }
}

/// Extended public key: Ed25519 public key plus chain code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bip32PublicKey {
    public_key: PublicKey,
    chain_code: [u8; 32],
}

impl Bip32PublicKey {
    /// Parse from 64 bytes: public key followed by chain code.
    pub fn from_bytes(bytes: &[u8; 64]) -> Result<Self, CryptoError> {
        let mut pk = [0u8; 32];
        let mut chain_code = [0u8; 32];
        pk.copy_from_slice(&bytes[..32]);
        chain_code.copy_from_slice(&bytes[32..]);
        Ok(Self {
            public_key: PublicKey::from_bytes(&pk)?,
            chain_code,
        })
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.public_key.to_bytes());
        out[32..].copy_from_slice(&self.chain_code);
        out
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }
}
