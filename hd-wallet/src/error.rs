//! Error types for the hd-wallet library
//!
//! No variant carries key, seed, entropy or mnemonic material. Unknown words
//! are reported by position only.

use thiserror::Error;

/// Custom error type for hd-wallet operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid entropy length: {0} bytes (expected 16, 20, 24, 28 or 32)")]
    InvalidEntropyLength(usize),

    #[error("Invalid word count: {0} (expected 12, 15, 18, 21 or 24)")]
    InvalidWordCount(usize),

    #[error("Unknown word at position {position}")]
    UnknownWord { position: usize },

    #[error("Invalid mnemonic checksum")]
    InvalidChecksum,

    #[error("Malformed derivation path segment: {segment:?}")]
    MalformedPath { segment: String },

    #[error("Derivation index out of range in segment: {segment:?}")]
    IndexOutOfRange { segment: String },

    #[error("Invalid child index: {0:#x} (must be below 2^31 before hardening)")]
    InvalidIndex(u32),

    #[error("Unsupported address scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Invalid seed length: {0} bytes (expected 16 to 64)")]
    InvalidSeedLength(usize),

    #[error("Seed produces an invalid master key")]
    InvalidMasterKey,

    #[error("Invalid child key at index {index:#x}")]
    InvalidChildKey { index: u32 },

    #[error("Derivation path exceeds maximum depth of 255")]
    PathTooDeep,

    #[error("Cannot derive hardened child {0:#x} from a public key")]
    HardenedFromPublic(u32),

    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Invalid extended key: {0}")]
    InvalidExtendedKey(String),
}

/// Coarse classification of [`Error`] values
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The caller supplied malformed input
    InputValidation,
    /// A mnemonic failed its checksum
    ChecksumFailure,
    /// Derivation hit an invalid scalar or point for this seed and path
    DerivationFailure,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidChecksum => ErrorKind::ChecksumFailure,
            Error::InvalidMasterKey
            | Error::InvalidChildKey { .. }
            | Error::PathTooDeep => ErrorKind::DerivationFailure,
            Error::InvalidEntropyLength(_)
            | Error::InvalidWordCount(_)
            | Error::UnknownWord { .. }
            | Error::MalformedPath { .. }
            | Error::IndexOutOfRange { .. }
            | Error::InvalidIndex(_)
            | Error::UnsupportedScheme(_)
            | Error::InvalidSeedLength(_)
            | Error::HardenedFromPublic(_)
            | Error::InvalidPublicKey
            | Error::InvalidExtendedKey(_) => ErrorKind::InputValidation,
        }
    }
}

/// Result type for hd-wallet operations
pub type Result<T> = std::result::Result<T, Error>;
