//! Wallet accounts and the session that owns them

use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::account::address::{address_from_public_key, AddressScheme};
use crate::crypto::keys::{DerivationPath, ExtendedKey, KeyPair, PublicKey};
use crate::crypto::mnemonic::{Mnemonic, MnemonicStrength};
use crate::crypto::seed::Seed;
use crate::error::{Error, Result};

/// One derived key pair, its address and the path it came from
///
/// The private key is only handed out through [`WalletAccount::private_key_hex`]
/// while the account is revealed. Revealing or hiding never touches the keys.
#[derive(Clone)]
pub struct WalletAccount {
    path: DerivationPath,
    scheme: AddressScheme,
    key_pair: KeyPair,
    address: String,
    revealed: bool,
}

impl WalletAccount {
    /// Build an account from a private extended key derived along `path`
    pub fn from_extended(key: &ExtendedKey, path: DerivationPath, scheme: AddressScheme) -> Result<Self> {
        let key_pair = KeyPair::from_extended(key)?;
        let address = address_from_public_key(key_pair.public_key().as_bytes(), scheme)?;

        Ok(Self {
            path,
            scheme,
            key_pair,
            address,
            revealed: false,
        })
    }

    /// The derivation path of this account
    pub fn path(&self) -> &DerivationPath {
        &self.path
    }

    /// The address scheme used for this account
    pub fn scheme(&self) -> AddressScheme {
        self.scheme
    }

    /// The account address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The compressed public key
    pub fn public_key(&self) -> &PublicKey {
        self.key_pair.public_key()
    }

    /// The compressed public key as lowercase hex
    pub fn public_key_hex(&self) -> String {
        self.key_pair.public_key().to_hex()
    }

    /// The private key as lowercase hex, or `None` while hidden
    pub fn private_key_hex(&self) -> Option<Zeroizing<String>> {
        self.revealed.then(|| self.key_pair.private_key().to_hex())
    }

    /// The private key as lowercase hex regardless of visibility
    pub fn expose_private_key_hex(&self) -> Zeroizing<String> {
        self.key_pair.private_key().to_hex()
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn reveal(&mut self) {
        self.revealed = true;
    }

    pub fn hide(&mut self) {
        self.revealed = false;
    }

    /// Flip visibility, returning the new state
    pub fn toggle(&mut self) -> bool {
        self.revealed = !self.revealed;
        self.revealed
    }
}

impl std::fmt::Debug for WalletAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletAccount")
            .field("path", &self.path.to_string())
            .field("scheme", &self.scheme)
            .field("address", &self.address)
            .field("revealed", &self.revealed)
            .finish_non_exhaustive()
    }
}

/// Derive a single account from a mnemonic phrase
///
/// The phrase is fully validated before any key material is produced.
pub fn derive_account(
    mnemonic: &str,
    passphrase: &str,
    path: &str,
    scheme: AddressScheme,
) -> Result<WalletAccount> {
    let mnemonic = Mnemonic::parse(mnemonic)?;
    let path = DerivationPath::parse(path)?;
    let seed = mnemonic.to_seed(passphrase);

    let master = ExtendedKey::master_from_seed(seed.as_bytes())?;
    let leaf = master.derive_path(&path)?;
    debug!(depth = leaf.depth(), scheme = %scheme, "derived account key");

    WalletAccount::from_extended(&leaf, path, scheme)
}

/// A mnemonic together with the accounts derived from it so far
///
/// Accounts are appended at `m/44'/coin'/0'/0/{n}`. Call [`WalletSession::clear`]
/// to end the session; dropping it wipes the same material.
pub struct WalletSession {
    mnemonic: Mnemonic,
    seed: Seed,
    scheme: AddressScheme,
    accounts: Vec<WalletAccount>,
}

impl WalletSession {
    /// Start a session over a freshly generated mnemonic
    pub fn generate(strength: MnemonicStrength, scheme: AddressScheme) -> Result<Self> {
        let mnemonic = Mnemonic::generate(strength)?;
        info!(words = mnemonic.word_count(), "generated new wallet session");
        Ok(Self::from_mnemonic(mnemonic, "", scheme))
    }

    /// Start a session over an existing mnemonic phrase
    pub fn import(phrase: &str, passphrase: &str, scheme: AddressScheme) -> Result<Self> {
        let mnemonic = Mnemonic::parse(phrase)?;
        Ok(Self::from_mnemonic(mnemonic, passphrase, scheme))
    }

    pub fn from_mnemonic(mnemonic: Mnemonic, passphrase: &str, scheme: AddressScheme) -> Self {
        let seed = mnemonic.to_seed(passphrase);
        Self {
            mnemonic,
            seed,
            scheme,
            accounts: Vec::new(),
        }
    }

    pub fn mnemonic(&self) -> &Mnemonic {
        &self.mnemonic
    }

    pub fn scheme(&self) -> AddressScheme {
        self.scheme
    }

    /// Derive the next account and append it to the session
    pub fn add_account(&mut self) -> Result<&WalletAccount> {
        let index = u32::try_from(self.accounts.len())
            .map_err(|_| Error::InvalidIndex(u32::MAX))?;
        let path = self.scheme.default_path(index)?;

        let master = ExtendedKey::master_from_seed(self.seed.as_bytes())?;
        let leaf = master.derive_path(&path)?;
        let account = WalletAccount::from_extended(&leaf, path, self.scheme)?;
        debug!(index, address = account.address(), "added account");

        self.accounts.push(account);
        Ok(&self.accounts[self.accounts.len() - 1])
    }

    pub fn accounts(&self) -> &[WalletAccount] {
        &self.accounts
    }

    pub fn account(&self, n: usize) -> Option<&WalletAccount> {
        self.accounts.get(n)
    }

    /// Reveal account `n`. Returns `false` if there is no such account.
    pub fn reveal(&mut self, n: usize) -> bool {
        self.accounts.get_mut(n).map(WalletAccount::reveal).is_some()
    }

    /// Hide account `n`. Returns `false` if there is no such account.
    pub fn hide(&mut self, n: usize) -> bool {
        self.accounts.get_mut(n).map(WalletAccount::hide).is_some()
    }

    /// Flip visibility of account `n`, returning its new state
    pub fn toggle(&mut self, n: usize) -> Option<bool> {
        self.accounts.get_mut(n).map(WalletAccount::toggle)
    }

    /// End the session, wiping the mnemonic, seed and every private key
    pub fn clear(mut self) {
        self.accounts.clear();
        info!("wallet session cleared");
    }
}

impl std::fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSession")
            .field("mnemonic", &self.mnemonic)
            .field("scheme", &self.scheme)
            .field("accounts", &self.accounts.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::address::Network;

    const ABANDON_ABOUT: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_derive_account() {
        let account = derive_account(ABANDON_ABOUT, "", "m/44'/60'/0'/0/0", AddressScheme::Evm).unwrap();

        assert_eq!(account.address(), "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
        assert_eq!(account.path().to_string(), "m/44'/60'/0'/0/0");
        assert_eq!(account.public_key_hex().len(), 66);
        assert!(!account.is_revealed());
        assert!(account.private_key_hex().is_none());
        assert_eq!(
            account.expose_private_key_hex().as_str(),
            "1ab42cc412b618bdea3a599e3c9bae199ebf030895b039e9db1e30dafb12b727"
        );
    }

    #[test]
    fn test_reveal_hide() {
        let mut account =
            derive_account(ABANDON_ABOUT, "", "m/44'/60'/0'/0/0", AddressScheme::Evm).unwrap();
        let public = account.public_key_hex();

        account.reveal();
        assert_eq!(
            account.private_key_hex().as_deref().map(String::as_str),
            Some("1ab42cc412b618bdea3a599e3c9bae199ebf030895b039e9db1e30dafb12b727")
        );
        assert!(!account.toggle());
        assert!(account.private_key_hex().is_none());
        assert_eq!(account.public_key_hex(), public);
    }

    #[test]
    fn test_derive_account_rejects_bad_input() {
        let bad_checksum = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";
        assert_eq!(
            derive_account(bad_checksum, "", "m/0", AddressScheme::Evm).unwrap_err(),
            Error::InvalidChecksum
        );
        assert!(matches!(
            derive_account(ABANDON_ABOUT, "", "m/x", AddressScheme::Evm).unwrap_err(),
            Error::MalformedPath { .. }
        ));
    }

    #[test]
    fn test_debug_is_redacted() {
        let account = derive_account(ABANDON_ABOUT, "", "m/44'/60'/0'/0/0", AddressScheme::Evm).unwrap();
        let debug = format!("{:?}", account);
        assert!(!debug.contains("1ab42cc4"));

        let session = WalletSession::import(ABANDON_ABOUT, "", AddressScheme::Evm).unwrap();
        assert!(!format!("{:?}", session).contains("abandon"));
    }

    #[test]
    fn test_session_accounts() {
        let mut session = WalletSession::import(ABANDON_ABOUT, "", AddressScheme::Evm).unwrap();
        assert!(session.accounts().is_empty());

        let first = session.add_account().unwrap().address().to_string();
        let second = session.add_account().unwrap().path().to_string();
        assert_eq!(first, "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
        assert_eq!(second, "m/44'/60'/0'/0/1");
        assert_eq!(session.accounts().len(), 2);

        assert!(session.reveal(1));
        assert!(session.account(1).unwrap().is_revealed());
        assert!(!session.account(0).unwrap().is_revealed());
        assert_eq!(session.toggle(1), Some(false));
        assert!(!session.reveal(5));
        assert_eq!(session.toggle(5), None);

        session.clear();
    }

    #[test]
    fn test_bitcoin_session() {
        let mut session =
            WalletSession::import(ABANDON_ABOUT, "", AddressScheme::BitcoinP2pkh(Network::Mainnet))
                .unwrap();
        let account = session.add_account().unwrap();
        assert_eq!(account.path().to_string(), "m/44'/0'/0'/0/0");
        assert_eq!(account.address(), "1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA");
    }

    #[test]
    fn test_generated_session() {
        let mut session = WalletSession::generate(MnemonicStrength::Words24, AddressScheme::Evm).unwrap();
        assert_eq!(session.mnemonic().word_count(), 24);
        let address = session.add_account().unwrap().address().to_string();
        assert!(address.starts_with("0x"));
        assert_eq!(address.len(), 42);
    }
}
