//! Key pairs derived from a seed along a path

use secp256k1::PublicKey as Secp256k1PublicKey;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::keys::extended::ExtendedKey;
use crate::crypto::keys::path::DerivationPath;
use crate::crypto::seed::Seed;
use crate::error::{Error, Result};

/// A 32-byte secp256k1 private scalar, wiped on drop
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    /// Get the raw private key bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex without prefix
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0))
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey([REDACTED])")
    }
}

/// A 33-byte compressed secp256k1 public key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 33]);

impl PublicKey {
    /// Create a public key from compressed bytes, checking it lies on the curve
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 33 {
            return Err(Error::InvalidPublicKey);
        }
        let point = Secp256k1PublicKey::from_slice(bytes).map_err(|_| Error::InvalidPublicKey)?;
        Ok(Self(point.serialize()))
    }

    /// Get the compressed public key bytes
    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    /// The 65-byte uncompressed encoding, `0x04 || x || y`
    pub fn uncompressed(&self) -> Result<[u8; 65]> {
        let point = Secp256k1PublicKey::from_slice(&self.0).map_err(|_| Error::InvalidPublicKey)?;
        Ok(point.serialize_uncompressed())
    }

    /// Lowercase hex without prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// A private key and its public key
#[derive(Debug, Clone)]
pub struct KeyPair {
    /// The private key
    private_key: PrivateKey,
    /// The public key
    public_key: PublicKey,
}

impl KeyPair {
    /// Take the key pair out of a private extended key
    pub fn from_extended(key: &ExtendedKey) -> Result<Self> {
        let secret = key.private_key_bytes().ok_or_else(|| {
            Error::InvalidExtendedKey("public extended key has no private part".to_string())
        })?;
        Ok(Self {
            private_key: PrivateKey(*secret),
            public_key: PublicKey(key.public_key_bytes()),
        })
    }

    /// Get the private key
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// Get the public key
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

/// Derive the key pair at `path` from a seed
pub fn derive_key_pair(seed: &Seed, path: &DerivationPath) -> Result<KeyPair> {
    let master = ExtendedKey::master_from_seed(seed.as_bytes())?;
    let leaf = master.derive_path(path)?;
    KeyPair::from_extended(&leaf)
}
