//! Secure random entropy for mnemonic generation

use rand::{rngs::OsRng, RngCore};

/// A source of cryptographically secure random bytes
pub trait EntropySource {
    /// Fill `dest` with random bytes
    fn fill(&mut self, dest: &mut [u8]);
}

/// Entropy drawn from the operating system CSPRNG
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&mut self, dest: &mut [u8]) {
        OsRng.fill_bytes(dest);
    }
}
