//! HD Wallet Core - hierarchical deterministic key derivation
//!
//! This library turns entropy into a BIP-39 mnemonic, the mnemonic into a
//! 64-byte seed, and the seed into a BIP-32 key tree from which EVM and
//! Bitcoin P2PKH addresses are derived along BIP-44 paths.

pub mod error;
pub mod crypto;
pub mod account;

// Re-export commonly used types for convenience
pub use account::{derive_account, AddressScheme, Network, WalletAccount, WalletSession};
pub use crypto::keys::{ChildNumber, DerivationPath, ExtendedKey};
pub use crypto::mnemonic::{Mnemonic, MnemonicStrength};
pub use crypto::seed::Seed;
pub use error::{Error, ErrorKind, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generate a mnemonic from `strength_bits` of fresh OS entropy
///
/// Accepts 128, 160, 192, 224 or 256 bits.
pub fn generate_mnemonic(strength_bits: u32) -> Result<Mnemonic> {
    Mnemonic::generate(MnemonicStrength::from_bits(strength_bits)?)
}

/// Check a phrase's words, length and checksum
pub fn validate_mnemonic(text: &str) -> bool {
    crypto::mnemonic::validate(text)
}
