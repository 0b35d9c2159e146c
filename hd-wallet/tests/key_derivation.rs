//! Tests for key derivation

use hd_wallet::account::*;
use hd_wallet::crypto::keys::*;
use hd_wallet::crypto::mnemonic::Mnemonic;
use hex_literal::hex;

const ABANDON_ABOUT: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

const VECTOR1_SEED: [u8; 16] = hex!("000102030405060708090a0b0c0d0e0f");

const VECTOR1: &[(&str, &str, &str)] = &[
    (
        "m",
        "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi",
        "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8",
    ),
    (
        "m/0'",
        "xprv9uHRZZhk6KAJC1avXpDAp4MDc3sQKNxDiPvvkX8Br5ngLNv1TxvUxt4cV1rGL5hj6KCesnDYUhd7oWgT11eZG7XnxHrnYeSvkzY7d2bhkJ7",
        "xpub68Gmy5EdvgibQVfPdqkBBCHxA5htiqg55crXYuXoQRKfDBFA1WEjWgP6LHhwBZeNK1VTsfTFUHCdrfp1bgwQ9xv5ski8PX9rL2dZXvgGDnw",
    ),
    (
        "m/0'/1",
        "xprv9wTYmMFdV23N2TdNG573QoEsfRrWKQgWeibmLntzniatZvR9BmLnvSxqu53Kw1UmYPxLgboyZQaXwTCg8MSY3H2EU4pWcQDnRnrVA1xe8fs",
        "xpub6ASuArnXKPbfEwhqN6e3mwBcDTgzisQN1wXN9BJcM47sSikHjJf3UFHKkNAWbWMiGj7Wf5uMash7SyYq527Hqck2AxYysAA7xmALppuCkwQ",
    ),
    (
        "m/0'/1/2'",
        "xprv9z4pot5VBttmtdRTWfWQmoH1taj2axGVzFqSb8C9xaxKymcFzXBDptWmT7FwuEzG3ryjH4ktypQSAewRiNMjANTtpgP4mLTj34bhnZX7UiM",
        "xpub6D4BDPcP2GT577Vvch3R8wDkScZWzQzMMUm3PWbmWvVJrZwQY4VUNgqFJPMM3No2dFDFGTsxxpG5uJh7n7epu4trkrX7x7DogT5Uv6fcLW5",
    ),
];

#[test]
fn test_bip32_vector1_serialization() {
    let master = master_from_seed(&VECTOR1_SEED).unwrap();

    for (path, xprv, xpub) in VECTOR1 {
        let path = DerivationPath::parse(path).unwrap();
        let key = derive_path(&master, &path).unwrap();

        assert_eq!(key.to_base58().as_str(), *xprv, "xprv at {}", path);
        assert_eq!(key.neuter().to_base58().as_str(), *xpub, "xpub at {}", path);
        assert_eq!(usize::from(key.depth()), path.len());
    }
}

#[test]
fn test_extended_key_parsing() {
    for (_, xprv, xpub) in VECTOR1 {
        let private = ExtendedKey::from_base58(xprv).unwrap();
        assert!(private.is_private());
        assert_eq!(private.to_base58().as_str(), *xprv);

        let public = ExtendedKey::from_base58(xpub).unwrap();
        assert!(!public.is_private());
        assert_eq!(private.neuter(), public);
    }

    // Last character altered breaks the checksum
    let mut corrupted = VECTOR1[0].1.to_string();
    corrupted.pop();
    corrupted.push('j');
    assert!(ExtendedKey::from_base58(&corrupted).is_err());
}

#[test]
fn test_public_derivation_matches_private() {
    let parent = ExtendedKey::from_base58(VECTOR1[1].2).unwrap();
    let child = parent.derive_child_public(1).unwrap();
    assert_eq!(child.to_base58().as_str(), VECTOR1[2].2);

    assert!(matches!(
        child.derive(ChildNumber::hardened(2).unwrap()),
        Err(hd_wallet::Error::HardenedFromPublic(_))
    ));
}

#[test]
fn test_ethereum_key_derivation() {
    let account = derive_account(ABANDON_ABOUT, "", "m/44'/60'/0'/0/0", AddressScheme::Evm).unwrap();
    assert_eq!(account.address(), "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
    assert!(is_valid_evm_checksum(account.address()));
}

#[test]
fn test_bitcoin_key_derivation() {
    let account = derive_account(
        ABANDON_ABOUT,
        "",
        "m/44'/0'/0'/0/0",
        AddressScheme::BitcoinP2pkh(Network::Mainnet),
    )
    .unwrap();
    assert_eq!(account.address(), "1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA");
    assert!(validate_address(account.address(), AddressScheme::BitcoinP2pkh(Network::Mainnet)));
}

#[test]
fn test_passphrase_changes_keys() {
    let plain = derive_account(ABANDON_ABOUT, "", "m/44'/60'/0'/0/0", AddressScheme::Evm).unwrap();
    let salted = derive_account(ABANDON_ABOUT, "TREZOR", "m/44'/60'/0'/0/0", AddressScheme::Evm).unwrap();
    assert_ne!(plain.address(), salted.address());
}

#[test]
fn test_whitespace_and_uppercase_root() {
    let messy = format!("  {}  ", ABANDON_ABOUT.replace(' ', "   "));
    let a = derive_account(&messy, "", "M/44'/60'/0'/0/0", AddressScheme::Evm).unwrap();
    assert_eq!(a.address(), "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
    assert_eq!(a.path().to_string(), "m/44'/60'/0'/0/0");
}

#[test]
fn test_mnemonic_seed_and_master_agree() {
    let mnemonic: Mnemonic = ABANDON_ABOUT.parse().unwrap();
    let seed = mnemonic.to_seed("");
    let key_pair = derive_key_pair(&seed, &DerivationPath::parse("m/44'/60'/0'/0/0").unwrap()).unwrap();
    let account = derive_account(ABANDON_ABOUT, "", "m/44'/60'/0'/0/0", AddressScheme::Evm).unwrap();
    assert_eq!(key_pair.public_key().to_hex(), account.public_key_hex());
}
