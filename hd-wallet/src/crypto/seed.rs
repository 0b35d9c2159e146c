//! Seed derivation from a mnemonic phrase and optional passphrase
//!
//! seed = PBKDF2-HMAC-SHA512(NFKD(mnemonic), "mnemonic" || NFKD(passphrase), 2048, 64)

use sha2::Sha512;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// PBKDF2 iteration count
pub const PBKDF2_ROUNDS: u32 = 2048;

/// Seed length in bytes
pub const SEED_LEN: usize = 64;

const SALT_PREFIX: &str = "mnemonic";

/// A 64-byte wallet seed, wiped from memory on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; SEED_LEN]);

impl Seed {
    /// Wrap raw seed bytes
    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw seed bytes
    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }
}

impl AsRef<[u8]> for Seed {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Seed([REDACTED])")
    }
}

/// NFKD-normalize and collapse runs of whitespace to single spaces
fn normalize_mnemonic(mnemonic: &str) -> Zeroizing<String> {
    let decomposed: Zeroizing<String> = Zeroizing::new(mnemonic.nfkd().collect());
    Zeroizing::new(decomposed.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Derive the 64-byte seed from mnemonic text and a passphrase (may be empty)
///
/// The mnemonic is not checked against the dictionary here; callers that need
/// validation parse a [`crate::crypto::Mnemonic`] first.
pub fn derive_seed(mnemonic: &str, passphrase: &str) -> Seed {
    let password = normalize_mnemonic(mnemonic);
    let mut salt = Zeroizing::new(String::from(SALT_PREFIX));
    salt.extend(passphrase.nfkd());

    let mut seed = [0u8; SEED_LEN];
    pbkdf2::pbkdf2_hmac::<Sha512>(password.as_bytes(), salt.as_bytes(), PBKDF2_ROUNDS, &mut seed);
    let result = Seed(seed);
    seed.zeroize();
    result
}

/// Generate a seed from a mnemonic phrase and optional passphrase
pub fn mnemonic_to_seed(phrase: &str, passphrase: Option<&str>) -> Seed {
    derive_seed(phrase, passphrase.unwrap_or(""))
}
