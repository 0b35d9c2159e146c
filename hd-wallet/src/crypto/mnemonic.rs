//! Mnemonic phrase generation and handling
//!
//! Entropy is extended with the leading `ENT / 32` bits of its SHA-256 digest
//! and sliced into 11-bit groups, each selecting one word from the English
//! reference list.

use tracing::warn;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::entropy::{EntropySource, OsEntropy};
use crate::crypto::hash::sha256;
use crate::crypto::seed::{derive_seed, Seed};
use crate::error::{Error, Result};

/// Number of words in the dictionary
pub const DICTIONARY_SIZE: usize = 2048;

/// The English reference word list, shared read-only by every caller
pub fn dictionary() -> &'static [&'static str; DICTIONARY_SIZE] {
    bip39::Language::English.word_list()
}

fn word_index(word: &str) -> Option<u16> {
    // The reference list is sorted, which the lookup relies on.
    dictionary()
        .binary_search_by(|probe| (*probe).cmp(word))
        .ok()
        .map(|i| i as u16)
}

/// Supported mnemonic strengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum MnemonicStrength {
    /// 12 words (128 bits)
    Words12,
    /// 15 words (160 bits)
    Words15,
    /// 18 words (192 bits)
    Words18,
    /// 21 words (224 bits)
    Words21,
    /// 24 words (256 bits)
    Words24,
}

impl MnemonicStrength {
    /// Strength for an entropy size in bits
    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            128 => Ok(Self::Words12),
            160 => Ok(Self::Words15),
            192 => Ok(Self::Words18),
            224 => Ok(Self::Words21),
            256 => Ok(Self::Words24),
            _ => Err(Error::InvalidEntropyLength(bits as usize / 8)),
        }
    }

    /// Strength for an entropy length in bytes
    pub fn from_entropy_len(len: usize) -> Result<Self> {
        match len {
            16 => Ok(Self::Words12),
            20 => Ok(Self::Words15),
            24 => Ok(Self::Words18),
            28 => Ok(Self::Words21),
            32 => Ok(Self::Words24),
            _ => Err(Error::InvalidEntropyLength(len)),
        }
    }

    /// Strength for a phrase word count
    pub fn from_word_count(count: usize) -> Result<Self> {
        match count {
            12 => Ok(Self::Words12),
            15 => Ok(Self::Words15),
            18 => Ok(Self::Words18),
            21 => Ok(Self::Words21),
            24 => Ok(Self::Words24),
            _ => Err(Error::InvalidWordCount(count)),
        }
    }

    /// Get entropy length in bytes
    pub fn entropy_bytes(&self) -> usize {
        match self {
            Self::Words12 => 16,
            Self::Words15 => 20,
            Self::Words18 => 24,
            Self::Words21 => 28,
            Self::Words24 => 32,
        }
    }

    /// Number of checksum bits appended to the entropy
    pub fn checksum_bits(&self) -> usize {
        self.entropy_bytes() * 8 / 32
    }

    /// Number of words in the phrase
    pub fn word_count(&self) -> usize {
        (self.entropy_bytes() * 8 + self.checksum_bits()) / 11
    }
}

/// A checksummed mnemonic, held as dictionary indices
#[derive(Clone, PartialEq, Eq)]
pub struct Mnemonic {
    indices: Vec<u16>,
}

impl Zeroize for Mnemonic {
    fn zeroize(&mut self) {
        self.indices.zeroize();
    }
}

impl Drop for Mnemonic {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl Mnemonic {
    /// Encode raw entropy (16, 20, 24, 28 or 32 bytes) as a mnemonic
    pub fn from_entropy(entropy: &[u8]) -> Result<Self> {
        let strength = MnemonicStrength::from_entropy_len(entropy.len())?;

        // At most 8 checksum bits, so the first digest byte always suffices.
        let checksum = sha256(entropy)[0];
        let word_count = strength.word_count();

        let mut indices = Vec::with_capacity(word_count);
        let mut acc: u32 = 0;
        let mut acc_bits = 0u32;
        for &byte in entropy.iter().chain(std::iter::once(&checksum)) {
            acc = (acc << 8) | u32::from(byte);
            acc_bits += 8;
            while acc_bits >= 11 && indices.len() < word_count {
                acc_bits -= 11;
                indices.push(((acc >> acc_bits) & 0x7ff) as u16);
            }
            acc &= (1 << acc_bits) - 1;
        }
        acc.zeroize();

        Ok(Self { indices })
    }

    /// Generate a new mnemonic using the operating system CSPRNG
    pub fn generate(strength: MnemonicStrength) -> Result<Self> {
        Self::generate_with(&mut OsEntropy, strength)
    }

    /// Generate a new mnemonic from the given entropy source
    pub fn generate_with<S: EntropySource + ?Sized>(
        source: &mut S,
        strength: MnemonicStrength,
    ) -> Result<Self> {
        let mut entropy = Zeroizing::new(vec![0u8; strength.entropy_bytes()]);
        source.fill(&mut entropy);
        Self::from_entropy(&entropy)
    }

    /// Parse and fully validate a phrase
    ///
    /// The phrase is NFKD-normalized and split on any whitespace. Fails with
    /// `InvalidWordCount`, `UnknownWord` or `InvalidChecksum`.
    pub fn parse(phrase: &str) -> Result<Self> {
        let normalized: Zeroizing<String> = Zeroizing::new(phrase.nfkd().collect());
        let words: Vec<&str> = normalized.split_whitespace().collect();
        let strength = MnemonicStrength::from_word_count(words.len())?;

        let mut indices = Vec::with_capacity(words.len());
        for (position, word) in words.iter().enumerate() {
            let index = word_index(word).ok_or(Error::UnknownWord { position })?;
            indices.push(index);
        }
        let mnemonic = Self { indices };

        let packed = mnemonic.packed_bits();
        let entropy_len = strength.entropy_bytes();
        let mask = 0xffu8 << (8 - strength.checksum_bits());
        let expected = sha256(&packed[..entropy_len])[0] & mask;
        if packed[entropy_len] & mask != expected {
            return Err(Error::InvalidChecksum);
        }

        Ok(mnemonic)
    }

    /// Pack the 11-bit word indices into bytes, zero-padding the final byte
    fn packed_bits(&self) -> Zeroizing<Vec<u8>> {
        let mut bytes = Zeroizing::new(Vec::with_capacity(self.indices.len() * 11 / 8 + 1));
        let mut acc: u32 = 0;
        let mut acc_bits = 0u32;
        for &index in &self.indices {
            acc = (acc << 11) | u32::from(index);
            acc_bits += 11;
            while acc_bits >= 8 {
                acc_bits -= 8;
                bytes.push((acc >> acc_bits) as u8);
            }
            acc &= (1 << acc_bits) - 1;
        }
        if acc_bits > 0 {
            bytes.push((acc << (8 - acc_bits)) as u8);
        }
        acc.zeroize();
        bytes
    }

    /// The strength of this mnemonic
    pub fn strength(&self) -> MnemonicStrength {
        // Construction guarantees a supported word count.
        match self.indices.len() {
            12 => MnemonicStrength::Words12,
            15 => MnemonicStrength::Words15,
            18 => MnemonicStrength::Words18,
            21 => MnemonicStrength::Words21,
            _ => MnemonicStrength::Words24,
        }
    }

    /// Decode the entropy this mnemonic encodes
    pub fn entropy(&self) -> Zeroizing<Vec<u8>> {
        let mut packed = self.packed_bits();
        packed.truncate(self.strength().entropy_bytes());
        packed
    }

    /// Number of words
    pub fn word_count(&self) -> usize {
        self.indices.len()
    }

    /// Iterate over the words of the phrase
    pub fn words(&self) -> impl Iterator<Item = &'static str> + '_ {
        let list = dictionary();
        self.indices.iter().map(move |&i| list[usize::from(i)])
    }

    /// The canonical phrase: lowercase words separated by single spaces
    pub fn phrase(&self) -> Zeroizing<String> {
        Zeroizing::new(self.words().collect::<Vec<_>>().join(" "))
    }

    /// Derive the 64-byte seed for this mnemonic and passphrase
    pub fn to_seed(&self, passphrase: &str) -> Seed {
        derive_seed(&self.phrase(), passphrase)
    }
}

impl std::str::FromStr for Mnemonic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Mnemonic({} words)", self.word_count())
    }
}

/// Encode entropy as a mnemonic
pub fn encode(entropy: &[u8]) -> Result<Mnemonic> {
    Mnemonic::from_entropy(entropy)
}

/// Decode a phrase back to its entropy
pub fn decode(phrase: &str) -> Result<Zeroizing<Vec<u8>>> {
    Ok(Mnemonic::parse(phrase)?.entropy())
}

/// Check a phrase without raising: `false` on any decoding failure
pub fn validate(phrase: &str) -> bool {
    match Mnemonic::parse(phrase) {
        Ok(_) => true,
        Err(e) => {
            warn!(kind = ?e.kind(), "mnemonic rejected: {}", e);
            false
        }
    }
}
