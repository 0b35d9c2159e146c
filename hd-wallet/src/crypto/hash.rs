//! Hash functions used by the mnemonic codec, key tree and address schemes

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use sha3::Keccak256;

/// Compute SHA-256 hash
#[inline]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute double SHA-256 hash
#[inline]
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Compute HASH160 (SHA-256 followed by RIPEMD-160)
#[inline]
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(sha256(data));
    hasher.finalize().into()
}

/// Compute Keccak-256 hash (the pre-standard variant, not SHA3-256)
#[inline]
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Append a 4-byte double-SHA-256 checksum and encode as Base58
pub fn base58check_encode(payload: &[u8]) -> String {
    let checksum = double_sha256(payload);
    let mut data = Vec::with_capacity(payload.len() + 4);
    data.extend_from_slice(payload);
    data.extend_from_slice(&checksum[..4]);
    bs58::encode(data).into_string()
}

/// Decode Base58 and verify the trailing 4-byte checksum, returning the payload
pub fn base58check_decode(encoded: &str) -> Option<Vec<u8>> {
    let mut data = bs58::decode(encoded).into_vec().ok()?;
    if data.len() < 4 {
        return None;
    }
    let payload_len = data.len() - 4;
    let checksum = double_sha256(&data[..payload_len]);
    if checksum[..4] != data[payload_len..] {
        return None;
    }
    data.truncate(payload_len);
    Some(data)
}
