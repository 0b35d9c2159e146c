//! Server configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use hd_wallet::{AddressScheme, DerivationPath, MnemonicStrength};
use tracing::warn;

/// Default listening port
pub const DEFAULT_PORT: u16 = 5000;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Scheme used when a request names none
    pub default_scheme: AddressScheme,
    /// Path used when a request names none and uses the default scheme.
    /// `None` means the scheme's own `m/44'/coin'/0'/0/0`.
    pub default_path: Option<DerivationPath>,
    pub mnemonic_strength: MnemonicStrength,
}

impl ServerConfig {
    /// Build a configuration from a key lookup, falling back to defaults
    /// for missing or invalid values
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mnemonic_strength = setting(&lookup, "HD_WALLET_MNEMONIC_STRENGTH", 128u32);
        let mnemonic_strength = MnemonicStrength::from_bits(mnemonic_strength).unwrap_or_else(|_| {
            warn!(
                key = "HD_WALLET_MNEMONIC_STRENGTH",
                value = mnemonic_strength,
                "unsupported mnemonic strength, using 128"
            );
            MnemonicStrength::Words12
        });

        Self {
            host: setting(&lookup, "HD_WALLET_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST)),
            port: setting(&lookup, "HD_WALLET_PORT", DEFAULT_PORT),
            default_scheme: setting(&lookup, "HD_WALLET_DEFAULT_SCHEME", AddressScheme::Evm),
            default_path: lookup("HD_WALLET_DEFAULT_PATH").and_then(|raw| {
                DerivationPath::parse(&raw)
                    .map_err(|e| warn!(key = "HD_WALLET_DEFAULT_PATH", "ignoring invalid value: {}", e))
                    .ok()
            }),
            mnemonic_strength,
        }
    }

    /// The socket address to listen on
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

fn setting<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "invalid configuration value, using default");
            default
        }),
        None => default,
    }
}
