//! BIP-32 extended keys over secp256k1
//!
//! Child private keys are `parse256(IL) + k_par (mod n)`; child public keys are
//! `point(parse256(IL)) + K_par`. An `IL >= n`, a zero private key or a point at
//! infinity is reported as [`Error::InvalidChildKey`] for that index. The next
//! index is never tried in its place.

use std::fmt;
use std::sync::OnceLock;

use hmac::{Hmac, Mac};
use secp256k1::{All, PublicKey, Scalar, Secp256k1, SecretKey};
use sha2::Sha512;
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::hash::{base58check_decode, base58check_encode, hash160};
use crate::crypto::keys::path::{ChildNumber, DerivationPath};
use crate::error::{Error, Result};

type HmacSha512 = Hmac<Sha512>;

/// HMAC key used to derive the master key from a seed
pub const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// Deepest level a key can sit at
pub const MAX_DEPTH: u8 = u8::MAX;

/// Accepted seed lengths in bytes (128 to 512 bits)
pub const MIN_SEED_LEN: usize = 16;
pub const MAX_SEED_LEN: usize = 64;

/// Mainnet version bytes for serialized private keys (`xprv`)
pub const XPRV_VERSION: [u8; 4] = [0x04, 0x88, 0xad, 0xe4];
/// Mainnet version bytes for serialized public keys (`xpub`)
pub const XPUB_VERSION: [u8; 4] = [0x04, 0x88, 0xb2, 0x1e];

const SERIALIZED_LEN: usize = 78;

/// Process-wide curve context, built once and shared read-only
fn secp() -> &'static Secp256k1<All> {
    static CONTEXT: OnceLock<Secp256k1<All>> = OnceLock::new();
    CONTEXT.get_or_init(Secp256k1::new)
}

fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Option<Zeroizing<[u8; 64]>> {
    let mut mac = HmacSha512::new_from_slice(key).ok()?;
    for part in parts {
        mac.update(part);
    }
    let mut out = Zeroizing::new([0u8; 64]);
    out.copy_from_slice(&mac.finalize().into_bytes());
    Some(out)
}

/// Split an HMAC output into the `IL` tweak and the `IR` chain code
fn split_tweak(i: &[u8; 64]) -> Option<(Scalar, [u8; 32])> {
    let mut il = [0u8; 32];
    il.copy_from_slice(&i[..32]);
    // Rejects IL >= n.
    let tweak = Scalar::from_be_bytes(il).ok();
    il.zeroize();

    let mut chain_code = [0u8; 32];
    chain_code.copy_from_slice(&i[32..]);
    Some((tweak?, chain_code))
}

#[derive(Clone)]
enum KeyMaterial {
    Private(SecretKey),
    Public(PublicKey),
}

/// A private or public key bundled with its chain code and tree position
#[derive(Clone)]
pub struct ExtendedKey {
    key: KeyMaterial,
    chain_code: [u8; 32],
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_index: u32,
}

impl Drop for ExtendedKey {
    fn drop(&mut self) {
        if let KeyMaterial::Private(secret) = &mut self.key {
            secret.non_secure_erase();
        }
        self.chain_code.zeroize();
    }
}

impl ExtendedKey {
    /// Derive the master private key from a seed
    ///
    /// `I = HMAC-SHA512("Bitcoin seed", seed)`; the left half is the private
    /// scalar and the right half the chain code. A scalar of zero or at least
    /// the curve order fails with [`Error::InvalidMasterKey`].
    pub fn master_from_seed(seed: &[u8]) -> Result<Self> {
        if !(MIN_SEED_LEN..=MAX_SEED_LEN).contains(&seed.len()) {
            return Err(Error::InvalidSeedLength(seed.len()));
        }

        let i = hmac_sha512(MASTER_HMAC_KEY, &[seed]).ok_or(Error::InvalidMasterKey)?;
        let secret = SecretKey::from_slice(&i[..32]).map_err(|_| Error::InvalidMasterKey)?;
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&i[32..]);

        debug!("derived master key");
        Ok(Self {
            key: KeyMaterial::Private(secret),
            chain_code,
            depth: 0,
            parent_fingerprint: [0u8; 4],
            child_index: 0,
        })
    }

    /// Derive the child at `index`, hardened or not
    ///
    /// `index` must be below 2^31; the hardened flag is applied afterwards.
    /// Public-only keys can only derive non-hardened children.
    pub fn derive_child(&self, index: u32, hardened: bool) -> Result<Self> {
        self.derive(ChildNumber::new(index, hardened)?)
    }

    /// Derive the child identified by `child`
    pub fn derive(&self, child: ChildNumber) -> Result<Self> {
        let secret = match &self.key {
            KeyMaterial::Private(secret) => secret,
            KeyMaterial::Public(_) => return self.derive_public(child),
        };

        let depth = self.next_depth()?;
        let index = child.to_raw();
        let index_be = index.to_be_bytes();

        let i = if child.is_hardened() {
            let secret_bytes = Zeroizing::new(secret.secret_bytes());
            hmac_sha512(&self.chain_code, &[&[0u8][..], &secret_bytes[..], &index_be[..]])
        } else {
            hmac_sha512(&self.chain_code, &[&self.public_key_bytes()[..], &index_be[..]])
        }
        .ok_or(Error::InvalidChildKey { index })?;

        let (tweak, chain_code) = split_tweak(&i).ok_or(Error::InvalidChildKey { index })?;
        let child_secret = secret
            .add_tweak(&tweak)
            .map_err(|_| Error::InvalidChildKey { index })?;

        debug!(depth, index = child.index(), hardened = child.is_hardened(), "derived private child");
        Ok(Self {
            key: KeyMaterial::Private(child_secret),
            chain_code,
            depth,
            parent_fingerprint: self.fingerprint(),
            child_index: index,
        })
    }

    /// Derive the public child at a non-hardened `index`
    ///
    /// Works from both private and public keys and always yields a public key.
    pub fn derive_child_public(&self, index: u32) -> Result<Self> {
        self.derive_public(ChildNumber::normal(index)?)
    }

    fn derive_public(&self, child: ChildNumber) -> Result<Self> {
        if child.is_hardened() {
            return Err(Error::HardenedFromPublic(child.to_raw()));
        }

        let depth = self.next_depth()?;
        let index = child.to_raw();
        let parent = self.public_key();

        let i = hmac_sha512(&self.chain_code, &[&parent.serialize()[..], &index.to_be_bytes()[..]])
            .ok_or(Error::InvalidChildKey { index })?;
        let (tweak, chain_code) = split_tweak(&i).ok_or(Error::InvalidChildKey { index })?;
        // Fails on the point at infinity.
        let point = parent
            .add_exp_tweak(secp(), &tweak)
            .map_err(|_| Error::InvalidChildKey { index })?;

        debug!(depth, index, "derived public child");
        Ok(Self {
            key: KeyMaterial::Public(point),
            chain_code,
            depth,
            parent_fingerprint: self.fingerprint(),
            child_index: index,
        })
    }

    /// Apply each segment of `path` in order
    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self> {
        if usize::from(self.depth) + path.len() > usize::from(MAX_DEPTH) {
            return Err(Error::PathTooDeep);
        }

        let mut current = self.clone();
        for child in path {
            current = current.derive(*child)?;
        }
        Ok(current)
    }

    fn next_depth(&self) -> Result<u8> {
        self.depth.checked_add(1).ok_or(Error::PathTooDeep)
    }

    /// The public counterpart of this key, with the same tree position
    pub fn neuter(&self) -> Self {
        Self {
            key: KeyMaterial::Public(self.public_key()),
            chain_code: self.chain_code,
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            child_index: self.child_index,
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self.key, KeyMaterial::Private(_))
    }

    /// The 32-byte private scalar, if this is a private key
    pub fn private_key_bytes(&self) -> Option<Zeroizing<[u8; 32]>> {
        match &self.key {
            KeyMaterial::Private(secret) => Some(Zeroizing::new(secret.secret_bytes())),
            KeyMaterial::Public(_) => None,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        match &self.key {
            KeyMaterial::Private(secret) => PublicKey::from_secret_key(secp(), secret),
            KeyMaterial::Public(point) => *point,
        }
    }

    /// The 33-byte compressed public key
    pub fn public_key_bytes(&self) -> [u8; 33] {
        self.public_key().serialize()
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    /// The raw child index, top bit set for hardened children
    pub fn child_index(&self) -> u32 {
        self.child_index
    }

    /// First four bytes of HASH160 of the compressed public key
    pub fn fingerprint(&self) -> [u8; 4] {
        let hash = hash160(&self.public_key_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    /// Serialize as Base58Check `xprv` or `xpub`
    pub fn to_base58(&self) -> Zeroizing<String> {
        let mut data = Zeroizing::new(Vec::with_capacity(SERIALIZED_LEN));
        match &self.key {
            KeyMaterial::Private(_) => data.extend_from_slice(&XPRV_VERSION),
            KeyMaterial::Public(_) => data.extend_from_slice(&XPUB_VERSION),
        }
        data.push(self.depth);
        data.extend_from_slice(&self.parent_fingerprint);
        data.extend_from_slice(&self.child_index.to_be_bytes());
        data.extend_from_slice(&self.chain_code);
        match &self.key {
            KeyMaterial::Private(secret) => {
                data.push(0);
                data.extend_from_slice(&Zeroizing::new(secret.secret_bytes())[..]);
            }
            KeyMaterial::Public(point) => data.extend_from_slice(&point.serialize()),
        }
        Zeroizing::new(base58check_encode(&data))
    }

    /// Parse a Base58Check `xprv` or `xpub`
    pub fn from_base58(encoded: &str) -> Result<Self> {
        let data = Zeroizing::new(
            base58check_decode(encoded)
                .ok_or_else(|| Error::InvalidExtendedKey("bad encoding or checksum".to_string()))?,
        );
        if data.len() != SERIALIZED_LEN {
            return Err(Error::InvalidExtendedKey(format!("length {}", data.len())));
        }

        let depth = data[4];
        let parent_fingerprint = [data[5], data[6], data[7], data[8]];
        let child_index = u32::from_be_bytes([data[9], data[10], data[11], data[12]]);
        if depth == 0 && (parent_fingerprint != [0u8; 4] || child_index != 0) {
            return Err(Error::InvalidExtendedKey(
                "master key with non-zero parent or index".to_string(),
            ));
        }

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&data[13..45]);
        let key_data = &data[45..];

        let key = if data[..4] == XPRV_VERSION {
            if key_data[0] != 0 {
                return Err(Error::InvalidExtendedKey("bad private key prefix".to_string()));
            }
            let secret = SecretKey::from_slice(&key_data[1..])
                .map_err(|_| Error::InvalidExtendedKey("private key out of range".to_string()))?;
            KeyMaterial::Private(secret)
        } else if data[..4] == XPUB_VERSION {
            let point = PublicKey::from_slice(key_data)
                .map_err(|_| Error::InvalidExtendedKey("invalid public key".to_string()))?;
            KeyMaterial::Public(point)
        } else {
            return Err(Error::InvalidExtendedKey("unknown version".to_string()));
        };

        Ok(Self {
            key,
            chain_code,
            depth,
            parent_fingerprint,
            child_index,
        })
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ExtendedKey");
        s.field("depth", &self.depth)
            .field("child_index", &self.child_index)
            .field("parent_fingerprint", &hex::encode(self.parent_fingerprint));
        match &self.key {
            KeyMaterial::Private(_) => s.field("private_key", &"[REDACTED]"),
            KeyMaterial::Public(point) => s.field("public_key", &hex::encode(point.serialize())),
        };
        s.finish()
    }
}

impl PartialEq for ExtendedKey {
    fn eq(&self, other: &Self) -> bool {
        let keys_equal = match (&self.key, &other.key) {
            (KeyMaterial::Private(a), KeyMaterial::Private(b)) => a == b,
            (KeyMaterial::Public(a), KeyMaterial::Public(b)) => a == b,
            _ => false,
        };
        keys_equal
            && self.chain_code == other.chain_code
            && self.depth == other.depth
            && self.parent_fingerprint == other.parent_fingerprint
            && self.child_index == other.child_index
    }
}

impl Eq for ExtendedKey {}

/// Derive the master private key from a seed
pub fn master_from_seed(seed: &[u8]) -> Result<ExtendedKey> {
    ExtendedKey::master_from_seed(seed)
}

/// Derive the key at `path` below `master`
pub fn derive_path(master: &ExtendedKey, path: &DerivationPath) -> Result<ExtendedKey> {
    master.derive_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // BIP-32 test vector 1
    const TEST_SEED_1: [u8; 16] = hex!("000102030405060708090a0b0c0d0e0f");

    #[test]
    fn test_master_key_from_seed() {
        let master = ExtendedKey::master_from_seed(&TEST_SEED_1).unwrap();
        assert_eq!(master.depth(), 0);
        assert_eq!(master.child_index(), 0);
        assert_eq!(master.parent_fingerprint(), [0u8; 4]);
        assert!(master.is_private());
        assert_eq!(
            hex::encode(master.chain_code()),
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
        );
        assert_eq!(
            hex::encode(*master.private_key_bytes().unwrap()),
            "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
        );
        assert_eq!(hex::encode(master.fingerprint()), "3442193e");
    }

    #[test]
    fn test_seed_length_bounds() {
        assert_eq!(
            ExtendedKey::master_from_seed(&[0u8; 15]).unwrap_err(),
            Error::InvalidSeedLength(15)
        );
        assert_eq!(
            ExtendedKey::master_from_seed(&[0u8; 65]).unwrap_err(),
            Error::InvalidSeedLength(65)
        );
        assert!(ExtendedKey::master_from_seed(&[0u8; 64]).is_ok());
    }

    #[test]
    fn test_hardened_child() {
        let master = ExtendedKey::master_from_seed(&TEST_SEED_1).unwrap();
        let child = master.derive_child(0, true).unwrap();
        assert_eq!(child.depth(), 1);
        assert_eq!(child.child_index(), 0x8000_0000);
        assert_eq!(child.parent_fingerprint(), master.fingerprint());
        assert_eq!(
            hex::encode(*child.private_key_bytes().unwrap()),
            "edb2e14f9ee77d26dd93b4ecede8d16ed408ce149b6cd80b0715a2d911a0afea"
        );
    }

    #[test]
    fn test_hardened_differs_from_normal() {
        let master = ExtendedKey::master_from_seed(&TEST_SEED_1).unwrap();
        let hardened = master.derive_child(5, true).unwrap();
        let normal = master.derive_child(5, false).unwrap();
        assert_ne!(hardened.private_key_bytes(), normal.private_key_bytes());
        assert_ne!(hardened.chain_code(), normal.chain_code());
    }

    #[test]
    fn test_index_must_fit_31_bits() {
        let master = ExtendedKey::master_from_seed(&TEST_SEED_1).unwrap();
        assert_eq!(
            master.derive_child(0x8000_0000, false).unwrap_err(),
            Error::InvalidIndex(0x8000_0000)
        );
        assert_eq!(
            master.derive_child(0x8000_0001, true).unwrap_err(),
            Error::InvalidIndex(0x8000_0001)
        );
    }

    #[test]
    fn test_public_derivation_matches_private() {
        let master = ExtendedKey::master_from_seed(&TEST_SEED_1).unwrap();
        let account = master.derive_child(0, true).unwrap();

        let via_private = account.derive_child(1, false).unwrap().neuter();
        let via_public = account.neuter().derive_child_public(1).unwrap();
        assert_eq!(via_private, via_public);
        assert!(!via_public.is_private());
        assert!(via_public.private_key_bytes().is_none());
    }

    #[test]
    fn test_public_key_rejects_hardened() {
        let master = ExtendedKey::master_from_seed(&TEST_SEED_1).unwrap();
        let xpub = master.neuter();
        assert_eq!(
            xpub.derive_child(0, true).unwrap_err(),
            Error::HardenedFromPublic(0x8000_0000)
        );
        let path = DerivationPath::parse("m/0/1'").unwrap();
        assert_eq!(
            xpub.derive_path(&path).unwrap_err(),
            Error::HardenedFromPublic(0x8000_0001)
        );
    }

    #[test]
    fn test_path_too_deep() {
        let master = ExtendedKey::master_from_seed(&TEST_SEED_1).unwrap();
        let deep: DerivationPath = vec![ChildNumber::normal(0).unwrap(); 256].into();
        assert_eq!(master.derive_path(&deep).unwrap_err(), Error::PathTooDeep);
    }

    #[test]
    fn test_max_depth_reachable() {
        let master = ExtendedKey::master_from_seed(&TEST_SEED_1).unwrap();
        let path: DerivationPath = vec![ChildNumber::normal(0).unwrap(); 255].into();
        let leaf = master.neuter().derive_path(&path).unwrap();
        assert_eq!(leaf.depth(), 255);
        assert_eq!(leaf.derive_child_public(0).unwrap_err(), Error::PathTooDeep);
    }

    #[test]
    fn test_base58_round_trip_and_rejection() {
        let master = ExtendedKey::master_from_seed(&TEST_SEED_1).unwrap();
        let xprv = master.to_base58();
        assert_eq!(ExtendedKey::from_base58(&xprv).unwrap(), master);

        let xpub = master.neuter().to_base58();
        assert!(xpub.starts_with("xpub"));
        assert!(ExtendedKey::from_base58("xpub1111").is_err());
    }

    #[test]
    fn test_bad_xpub_point_is_invalid_extended_key() {
        let master = ExtendedKey::master_from_seed(&TEST_SEED_1).unwrap();
        let xpub = master.neuter().to_base58();
        let mut data = base58check_decode(&xpub).unwrap();
        // 0x05 is not a valid compressed-point prefix
        data[45] = 0x05;
        let corrupted = base58check_encode(&data);
        assert_eq!(
            ExtendedKey::from_base58(&corrupted).unwrap_err(),
            Error::InvalidExtendedKey("invalid public key".to_string())
        );
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let master = ExtendedKey::master_from_seed(&TEST_SEED_1).unwrap();
        let debug = format!("{:?}", master);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("e8f32e72"));
    }
}
