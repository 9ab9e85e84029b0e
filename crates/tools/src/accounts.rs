//! Signing identities for a network.
//!
//! Addresses are derived locally from private keys or a mnemonic, or fetched
//! from the node with `eth_accounts` when the network uses remote accounts.

use crate::config::{AccountsConfig, HdAccounts, NetworkProfile, Secret, MAX_ACCOUNT_COUNT};
use bip32::{DerivationPath, XPrv};
use once_cell::sync::Lazy;
use secp256k1::{PublicKey, Secp256k1, SecretKey, SignOnly};
use serde::Deserialize;
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

static SECP256K1_CONTEXT: Lazy<Secp256k1<SignOnly>> = Lazy::new(Secp256k1::signing_only);

/// Account provider error types
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Invalid mnemonic: {0}")]
    Mnemonic(String),

    #[error("Key derivation failed: {0}")]
    Derivation(String),

    #[error("Network '{0}' has no RPC url")]
    MissingUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),
}

/// A 20-byte account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Last 20 bytes of the Keccak-256 hash of the uncompressed public key.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let uncompressed = public_key.serialize_uncompressed();
        let hash = keccak256(&uncompressed[1..]);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[12..]);
        Address(bytes)
    }

    pub fn from_secret_key(secret_key: &SecretKey) -> Self {
        let public_key = PublicKey::from_secret_key(&SECP256K1_CONTEXT, secret_key);
        Self::from_public_key(&public_key)
    }

    /// EIP-55 mixed-case hex encoding with `0x` prefix.
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = keccak256(lower.as_bytes());

        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl FromStr for Address {
    type Err = ProviderError;

    /// Accepts `0x`-prefixed hex in any case. The checksum is not enforced.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| ProviderError::InvalidResponse(format!("address without 0x: {}", s)))?;
        let bytes = hex::decode(hex_part)
            .map_err(|e| ProviderError::InvalidResponse(format!("invalid address {}: {}", s, e)))?;
        let bytes: [u8; 20] = bytes.try_into().map_err(|_| {
            ProviderError::InvalidResponse(format!("address must be 20 bytes: {}", s))
        })?;
        Ok(Address(bytes))
    }
}

fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Parse a hex private key, with or without `0x`.
pub fn parse_private_key(key: &Secret) -> Result<SecretKey, ProviderError> {
    let raw = key.expose();
    let hex_part = raw.strip_prefix("0x").unwrap_or(raw);
    let bytes = hex::decode(hex_part).map_err(|e| ProviderError::InvalidKey(e.to_string()))?;
    SecretKey::from_slice(&bytes).map_err(|e| ProviderError::InvalidKey(e.to_string()))
}

/// Derive `count` keys starting at `initial_index` below the configured path.
pub fn derive_hd_keys(hd: &HdAccounts) -> Result<Vec<SecretKey>, ProviderError> {
    if hd.count > MAX_ACCOUNT_COUNT {
        return Err(ProviderError::Derivation(format!(
            "at most {} accounts per mnemonic, got {}",
            MAX_ACCOUNT_COUNT, hd.count
        )));
    }
    let mnemonic = bip39::Mnemonic::parse_normalized(hd.mnemonic.expose().trim())
        .map_err(|e| ProviderError::Mnemonic(e.to_string()))?;
    let seed = mnemonic.to_seed_normalized(hd.passphrase.expose());

    let base = hd.path.trim_end_matches('/');
    let mut keys = Vec::with_capacity(hd.count as usize);
    for offset in 0..hd.count {
        let index = hd
            .initial_index
            .checked_add(offset)
            .ok_or_else(|| ProviderError::Derivation("account index overflow".to_string()))?;
        let path: DerivationPath = format!("{}/{}", base, index)
            .parse()
            .map_err(|e: bip32::Error| ProviderError::Derivation(e.to_string()))?;
        let child = XPrv::derive_from_path(seed, &path)
            .map_err(|e| ProviderError::Derivation(e.to_string()))?;
        let key = SecretKey::from_slice(&child.to_bytes())
            .map_err(|e| ProviderError::Derivation(e.to_string()))?;
        keys.push(key);
    }
    Ok(keys)
}

/// Source of the addresses a task can act as.
#[allow(async_fn_in_trait)]
pub trait AccountProvider {
    /// Available addresses in provider order.
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError>;
}

/// Accounts whose keys are known locally.
#[derive(Debug, Clone)]
pub struct LocalAccounts {
    keys: Vec<SecretKey>,
}

impl LocalAccounts {
    pub fn new(keys: Vec<SecretKey>) -> Self {
        LocalAccounts { keys }
    }

    pub fn from_keys(keys: &[Secret]) -> Result<Self, ProviderError> {
        let keys = keys
            .iter()
            .map(parse_private_key)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(keys))
    }

    pub fn from_mnemonic(hd: &HdAccounts) -> Result<Self, ProviderError> {
        Ok(Self::new(derive_hd_keys(hd)?))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.keys.iter().map(Address::from_secret_key).collect()
    }
}

impl AccountProvider for LocalAccounts {
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        Ok(self.addresses())
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Vec<String>>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Accounts unlocked on a JSON-RPC node.
#[derive(Debug, Clone)]
pub struct RpcAccounts {
    client: reqwest::Client,
    url: String,
}

impl RpcAccounts {
    pub fn new(url: impl Into<String>) -> Self {
        RpcAccounts {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl AccountProvider for RpcAccounts {
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_accounts",
            "params": [],
        });
        debug!(url = %self.url, "requesting eth_accounts");
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        let body: serde_json::Value = response.json().await?;
        parse_accounts_response(body)
    }
}

/// Decode an `eth_accounts` JSON-RPC response body.
pub fn parse_accounts_response(body: serde_json::Value) -> Result<Vec<Address>, ProviderError> {
    let response: RpcResponse = serde_json::from_value(body)
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
    if let Some(error) = response.error {
        return Err(ProviderError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    response
        .result
        .ok_or_else(|| ProviderError::InvalidResponse("missing result".to_string()))?
        .iter()
        .map(|s| s.parse())
        .collect()
}

/// The provider matching a network's accounts setting.
#[derive(Debug, Clone)]
pub enum NetworkAccounts {
    Local(LocalAccounts),
    Rpc(RpcAccounts),
}

impl NetworkAccounts {
    pub fn for_network(profile: &NetworkProfile) -> Result<Self, ProviderError> {
        match profile.accounts {
            AccountsConfig::Keys(ref keys) => Ok(NetworkAccounts::Local(LocalAccounts::from_keys(keys)?)),
            AccountsConfig::Mnemonic(ref hd) => {
                Ok(NetworkAccounts::Local(LocalAccounts::from_mnemonic(hd)?))
            }
            AccountsConfig::Remote => {
                let url = profile
                    .url
                    .as_deref()
                    .ok_or_else(|| ProviderError::MissingUrl(profile.name.clone()))?;
                Ok(NetworkAccounts::Rpc(RpcAccounts::new(url)))
            }
        }
    }
}

impl AccountProvider for NetworkAccounts {
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        match self {
            NetworkAccounts::Local(local) => local.accounts().await,
            NetworkAccounts::Rpc(rpc) => rpc.accounts().await,
        }
    }
}
