//! Address derivation from compressed public keys

use std::fmt;
use std::str::FromStr;

use crate::crypto::hash::{base58check_decode, base58check_encode, hash160, keccak256};
use crate::crypto::keys::{DerivationPath, PublicKey};
use crate::error::{Error, Result};

/// Bitcoin network, selecting the P2PKH version byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    /// Version byte prefixed to the HASH160 payload
    pub fn p2pkh_version(self) -> u8 {
        match self {
            Network::Mainnet => 0x00,
            Network::Testnet => 0x6f,
        }
    }
}

/// How a public key is turned into an address
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AddressScheme {
    /// Last 20 bytes of Keccak-256 of the uncompressed point, EIP-55 hex
    #[default]
    Evm,
    /// Base58Check of version byte + HASH160 of the compressed key
    BitcoinP2pkh(Network),
}

impl AddressScheme {
    /// SLIP-44 coin type used in the default path
    pub fn coin_type(&self) -> u32 {
        match self {
            AddressScheme::Evm => 60,
            AddressScheme::BitcoinP2pkh(Network::Mainnet) => 0,
            AddressScheme::BitcoinP2pkh(Network::Testnet) => 1,
        }
    }

    /// The BIP-44 path `m/44'/coin'/0'/0/{index}` for this scheme
    pub fn default_path(&self, index: u32) -> Result<DerivationPath> {
        DerivationPath::bip44(self.coin_type(), 0, 0, index)
    }
}

impl FromStr for AddressScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "evm" | "ethereum" | "eth" => Ok(AddressScheme::Evm),
            "bitcoin" | "btc" | "p2pkh" => Ok(AddressScheme::BitcoinP2pkh(Network::Mainnet)),
            "bitcoin-testnet" | "btc-testnet" | "testnet" => {
                Ok(AddressScheme::BitcoinP2pkh(Network::Testnet))
            }
            _ => Err(Error::UnsupportedScheme(s.to_string())),
        }
    }
}

impl fmt::Display for AddressScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressScheme::Evm => f.write_str("evm"),
            AddressScheme::BitcoinP2pkh(Network::Mainnet) => f.write_str("bitcoin"),
            AddressScheme::BitcoinP2pkh(Network::Testnet) => f.write_str("bitcoin-testnet"),
        }
    }
}

/// Derive the address of a 33-byte compressed public key under `scheme`
pub fn address_from_public_key(public_key: &[u8], scheme: AddressScheme) -> Result<String> {
    let public_key = PublicKey::from_bytes(public_key)?;
    match scheme {
        AddressScheme::Evm => evm_address(&public_key),
        AddressScheme::BitcoinP2pkh(network) => Ok(p2pkh_address(&public_key, network)),
    }
}

fn evm_address(public_key: &PublicKey) -> Result<String> {
    let uncompressed = public_key.uncompressed()?;

    // Skip the 0x04 prefix and hash the 64-byte point
    let hash = keccak256(&uncompressed[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);

    Ok(to_checksum_address(&address))
}

/// Format 20 address bytes as EIP-55 mixed-case hex with `0x` prefix
pub fn to_checksum_address(address: &[u8; 20]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Check that a mixed-case EVM address carries a correct EIP-55 checksum
pub fn is_valid_evm_checksum(address: &str) -> bool {
    let Some(body) = address.strip_prefix("0x") else {
        return false;
    };
    let Ok(bytes) = hex::decode(body) else {
        return false;
    };
    let Ok(bytes) = <[u8; 20]>::try_from(bytes.as_slice()) else {
        return false;
    };
    to_checksum_address(&bytes) == address
}

fn p2pkh_address(public_key: &PublicKey, network: Network) -> String {
    let mut payload = Vec::with_capacity(21);
    payload.push(network.p2pkh_version());
    payload.extend_from_slice(&hash160(public_key.as_bytes()));
    base58check_encode(&payload)
}

/// Validate an address for a specific scheme
pub fn validate_address(address: &str, scheme: AddressScheme) -> bool {
    match scheme {
        AddressScheme::Evm => {
            let Some(body) = address.strip_prefix("0x") else {
                return false;
            };
            if body.len() != 40 || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
                return false;
            }
            let single_case = body == body.to_ascii_lowercase() || body == body.to_ascii_uppercase();
            single_case || is_valid_evm_checksum(address)
        }
        AddressScheme::BitcoinP2pkh(network) => match base58check_decode(address) {
            Some(payload) => payload.len() == 21 && payload[0] == network.p2pkh_version(),
            None => false,
        },
    }
}
