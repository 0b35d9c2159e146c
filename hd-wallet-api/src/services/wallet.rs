//! Seed and wallet endpoints
//!
//! Derivation is CPU-bound (2048 PBKDF2 rounds per request), so every call
//! into the core runs on the blocking pool.

use std::sync::Arc;

use axum::extract::{Json, Query, State};
use serde::{Deserialize, Serialize};
use tracing::info;

use hd_wallet::{derive_account, validate_mnemonic, AddressScheme, Mnemonic, MnemonicStrength};

use crate::config::ServerConfig;
use crate::error::Result;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateSeedQuery {
    /// Entropy size in bits
    pub strength: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSeedResponse {
    pub seed_phrase: String,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateWalletRequest {
    #[serde(default)]
    pub seed_phrase: String,
    #[serde(default)]
    pub passphrase: String,
    pub path: Option<String>,
    pub scheme: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateWalletResponse {
    pub address: String,
    pub public_key: String,
    pub private_key: String,
    pub path: String,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateSeedRequest {
    #[serde(default)]
    pub seed_phrase: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateSeedResponse {
    pub valid: bool,
}

/// `GET /generate-seed`
pub async fn generate_seed(
    State(config): State<Arc<ServerConfig>>,
    Query(query): Query<GenerateSeedQuery>,
) -> Result<Json<GenerateSeedResponse>> {
    let strength = match query.strength {
        Some(bits) => MnemonicStrength::from_bits(bits)?,
        None => config.mnemonic_strength,
    };

    let mnemonic = tokio::task::spawn_blocking(move || Mnemonic::generate(strength)).await??;
    info!(words = mnemonic.word_count(), "generated seed phrase");

    Ok(Json(GenerateSeedResponse {
        seed_phrase: mnemonic.phrase().to_string(),
    }))
}

/// `POST /generate-wallet`
pub async fn generate_wallet(
    State(config): State<Arc<ServerConfig>>,
    Json(request): Json<GenerateWalletRequest>,
) -> Result<Json<GenerateWalletResponse>> {
    let GenerateWalletRequest {
        seed_phrase,
        passphrase,
        path,
        scheme,
    } = request;

    let scheme = match scheme.as_deref() {
        Some(name) => name.parse::<AddressScheme>()?,
        None => config.default_scheme,
    };
    let path = match (path, &config.default_path) {
        (Some(path), _) => path,
        (None, Some(path)) if scheme == config.default_scheme => path.to_string(),
        (None, _) => scheme.default_path(0)?.to_string(),
    };

    let account = tokio::task::spawn_blocking(move || {
        derive_account(&seed_phrase, &passphrase, &path, scheme)
    })
    .await??;
    info!(path = %account.path(), scheme = %scheme, address = account.address(), "derived wallet");

    Ok(Json(GenerateWalletResponse {
        address: account.address().to_string(),
        public_key: account.public_key_hex(),
        private_key: account.expose_private_key_hex().to_string(),
        path: account.path().to_string(),
    }))
}

/// `POST /validate-seed`
pub async fn validate_seed(Json(request): Json<ValidateSeedRequest>) -> Json<ValidateSeedResponse> {
    Json(ValidateSeedResponse {
        valid: validate_mnemonic(&request.seed_phrase),
    })
}
