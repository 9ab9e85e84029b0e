//! Project configuration: network profiles, compiler pin and build paths
//!
//! This module provides typed, validated configuration for a smart-contract
//! project. Configuration is resolved in priority order:
//!
//! 1. Command line (`--config`, `--network`)
//! 2. Environment variables (`DEVKIT_CONFIG`, `DEVKIT_NETWORK`)
//! 3. devkit.toml declarations
//! 4. Built-in defaults (the in-process `hardhat` network)
//!
//! Only the selected network has to be complete. Problems in the other
//! profiles are logged and otherwise ignored.
//!
//! # Examples
//!
//! ```rust,no_run
//! use devkit_tools::config::{Config, LoadOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load(&LoadOptions::default())?;
//! println!("Network: {}", config.selected_network);
//! println!("Compiler: {}", config.compiler);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "devkit.toml";

/// Name of the in-process development network.
pub const DEV_NETWORK: &str = "hardhat";

/// Chain ID of the in-process network when the profile does not set one.
pub const DEV_CHAIN_ID: u64 = 31337;

/// Mnemonic backing the in-process network's default accounts.
pub const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// BIP-32 prefix for Ethereum accounts; the account index is appended.
pub const DEFAULT_HD_PATH: &str = "m/44'/60'/0'/0";

pub const DEFAULT_ACCOUNT_COUNT: u32 = 20;

/// Upper bound on accounts derived from one mnemonic.
pub const MAX_ACCOUNT_COUNT: u32 = 10_000;

pub const ENV_CONFIG: &str = "DEVKIT_CONFIG";
pub const ENV_NETWORK: &str = "DEVKIT_NETWORK";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("Invalid configuration for network '{network}': {reason}")]
    NetworkValidation { network: String, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// A secret value from the config file, already expanded from the environment.
///
/// The value never shows up in `Debug` output or in the configuration summary.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Secret(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// HD wallet parameters for a network's accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HdAccounts {
    pub mnemonic: Secret,
    pub path: String,
    pub initial_index: u32,
    pub count: u32,
    pub passphrase: Secret,
}

impl HdAccounts {
    /// Accounts of the in-process development network.
    pub fn dev() -> Self {
        HdAccounts {
            mnemonic: Secret::new(DEV_MNEMONIC),
            path: DEFAULT_HD_PATH.to_string(),
            initial_index: 0,
            count: DEFAULT_ACCOUNT_COUNT,
            passphrase: Secret::new(""),
        }
    }
}

/// Where a network's signing identities come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountsConfig {
    /// Ordered list of private keys.
    Keys(Vec<Secret>),
    /// Keys derived from a mnemonic.
    Mnemonic(HdAccounts),
    /// Accounts unlocked on the node, fetched over RPC.
    Remote,
}

impl AccountsConfig {
    fn describe(&self) -> String {
        match self {
            AccountsConfig::Keys(keys) => format!("{} private key(s)", keys.len()),
            AccountsConfig::Mnemonic(hd) => format!(
                "mnemonic, {} account(s) from {}/{}",
                hd.count, hd.path, hd.initial_index
            ),
            AccountsConfig::Remote => "remote".to_string(),
        }
    }
}

/// Connection and execution parameters for one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    pub name: String,
    pub chain_id: Option<u64>,
    /// Gas limit per transaction; `None` lets the node estimate.
    pub gas_limit: Option<u64>,
    /// Gas price in wei; `None` lets the node decide.
    pub gas_price: Option<u64>,
    pub url: Option<String>,
    pub accounts: AccountsConfig,
}

impl NetworkProfile {
    /// Profile of the in-process network when devkit.toml does not declare one.
    pub fn dev() -> Self {
        NetworkProfile {
            name: DEV_NETWORK.to_string(),
            chain_id: Some(DEV_CHAIN_ID),
            gas_limit: None,
            gas_price: None,
            url: None,
            accounts: AccountsConfig::Mnemonic(HdAccounts::dev()),
        }
    }

    /// Whether this network is reached over RPC rather than run in-process.
    pub fn is_remote(&self) -> bool {
        self.name != DEV_NETWORK
    }
}

/// Pinned compiler version, `MAJOR.MINOR.PATCH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerSetting(String);

impl CompilerSetting {
    pub fn parse(version: &str) -> Result<Self, ConfigError> {
        let version = version.trim();
        let parts: Vec<&str> = version.split('.').collect();
        let valid = parts.len() == 3
            && parts
                .iter()
                .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));
        if !valid {
            return Err(ConfigError::ValidationError(format!(
                "compiler version must be MAJOR.MINOR.PATCH, got '{}'",
                version
            )));
        }
        Ok(CompilerSetting(version.to_string()))
    }

    pub fn version(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompilerSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Project directories, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPaths {
    pub root: PathBuf,
    pub sources: PathBuf,
    pub tests: PathBuf,
    pub cache: PathBuf,
    pub artifacts: PathBuf,
}

impl BuildPaths {
    fn from_toml(root: &Path, paths: &PathsToml) -> Result<Self, ConfigError> {
        let build = BuildPaths {
            root: root.to_path_buf(),
            sources: PathBuf::from(&paths.sources),
            tests: PathBuf::from(&paths.tests),
            cache: PathBuf::from(&paths.cache),
            artifacts: PathBuf::from(&paths.artifacts),
        };
        for (name, path) in [
            ("sources", &build.sources),
            ("tests", &build.tests),
            ("cache", &build.cache),
            ("artifacts", &build.artifacts),
        ] {
            build.check_inside_root(name, path)?;
        }
        Ok(build)
    }

    fn check_inside_root(&self, name: &str, path: &Path) -> Result<(), ConfigError> {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField(format!("paths.{}", name)));
        }
        if path
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(ConfigError::ValidationError(format!(
                "paths.{} must not leave the project root: {}",
                name,
                path.display()
            )));
        }
        if path.is_absolute() && !path.starts_with(&self.root) {
            return Err(ConfigError::ValidationError(format!(
                "paths.{} is outside the project root: {}",
                name,
                path.display()
            )));
        }
        Ok(())
    }

    /// Resolve a declared path against the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        path.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .fold(self.root.clone(), |acc, c| acc.join(c.as_os_str()))
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.resolve(&self.artifacts)
    }

    pub fn sources_dir(&self) -> PathBuf {
        self.resolve(&self.sources)
    }

    pub fn tests_dir(&self) -> PathBuf {
        self.resolve(&self.tests)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.resolve(&self.cache)
    }
}

/// devkit.toml as written on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DevkitToml {
    #[serde(default)]
    pub default_network: Option<String>,
    #[serde(default)]
    pub solidity: Option<String>,
    #[serde(default)]
    pub paths: PathsToml,
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkToml>,
}

/// `[paths]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsToml {
    #[serde(default = "default_sources")]
    pub sources: String,
    #[serde(default = "default_tests")]
    pub tests: String,
    #[serde(default = "default_cache")]
    pub cache: String,
    #[serde(default = "default_artifacts")]
    pub artifacts: String,
}

impl Default for PathsToml {
    fn default() -> Self {
        PathsToml {
            sources: default_sources(),
            tests: default_tests(),
            cache: default_cache(),
            artifacts: default_artifacts(),
        }
    }
}

fn default_sources() -> String {
    "contracts".to_string()
}

fn default_tests() -> String {
    "test".to_string()
}

fn default_cache() -> String {
    "cache".to_string()
}

fn default_artifacts() -> String {
    "artifacts".to_string()
}

/// `[networks.<name>]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkToml {
    #[serde(default)]
    pub chain_id: Option<u64>,
    #[serde(default)]
    pub gas: Option<u64>,
    #[serde(default)]
    pub gas_price: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub accounts: Option<AccountsToml>,
}

/// `accounts = [...]`, `accounts = "remote"` or `accounts = { mnemonic = ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountsToml {
    Keys(Vec<String>),
    Named(String),
    Hd(HdToml),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HdToml {
    pub mnemonic: String,
    #[serde(default = "default_hd_path")]
    pub path: String,
    #[serde(default)]
    pub initial_index: u32,
    #[serde(default = "default_account_count")]
    pub count: u32,
    #[serde(default)]
    pub passphrase: String,
}

fn default_hd_path() -> String {
    DEFAULT_HD_PATH.to_string()
}

fn default_account_count() -> u32 {
    DEFAULT_ACCOUNT_COUNT
}

/// Where to load the configuration from and which network to select.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub network: Option<String>,
}

/// Resolved runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub default_network: String,
    /// Network the current process runs against.
    pub selected_network: String,
    pub compiler: CompilerSetting,
    pub paths: BuildPaths,
    pub networks: BTreeMap<String, NetworkProfile>,
}

impl Config {
    /// Load configuration from the environment and devkit.toml
    ///
    /// # Resolution Order
    ///
    /// 1. Load `.env` if present
    /// 2. Config path from options, then `DEVKIT_CONFIG`, then `./devkit.toml`
    /// 3. Network from options, then `DEVKIT_NETWORK`, then `default_network`
    /// 4. Expand `${VAR}` secrets from the process environment
    /// 5. Validate the selected network
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file is missing or malformed
    /// - The selected network is unknown
    /// - A required field of the selected network is missing
    pub fn load(options: &LoadOptions) -> Result<Self, ConfigError> {
        // Load .env file if it exists (non-fatal)
        let _ = dotenvy::dotenv();

        let path = options
            .config_path
            .clone()
            .or_else(|| std::env::var(ENV_CONFIG).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let network = options
            .network
            .clone()
            .or_else(|| std::env::var(ENV_NETWORK).ok());

        Self::load_from(&path, network.as_deref())
    }

    /// Load a specific config file, expanding secrets from the process environment.
    pub fn load_from(path: &Path, network: Option<&str>) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        // Project root is always absolute.
        let root = match path.parent() {
            Some(parent) if parent.is_absolute() => parent.to_path_buf(),
            Some(parent) if !parent.as_os_str().is_empty() => std::env::current_dir()?.join(parent),
            _ => std::env::current_dir()?,
        };
        debug!(path = %path.display(), "loading configuration");
        Self::from_toml_str(&content, &root, network, |name| std::env::var(name).ok())
    }

    /// Build the configuration from TOML text.
    ///
    /// `vars` resolves `${NAME}` references in secret values.
    pub fn from_toml_str<F>(
        content: &str,
        root: &Path,
        network: Option<&str>,
        vars: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw: DevkitToml = toml::from_str(content)?;

        let solidity = raw
            .solidity
            .as_deref()
            .ok_or_else(|| ConfigError::MissingField("solidity".to_string()))?;
        let compiler = CompilerSetting::parse(solidity)?;
        let paths = BuildPaths::from_toml(root, &raw.paths)?;

        let default_network = raw
            .default_network
            .clone()
            .unwrap_or_else(|| DEV_NETWORK.to_string());
        let selected_network = network
            .map(str::to_string)
            .unwrap_or_else(|| default_network.clone());

        let mut networks = BTreeMap::new();
        if !raw.networks.contains_key(DEV_NETWORK) {
            networks.insert(DEV_NETWORK.to_string(), NetworkProfile::dev());
        }
        for (name, declared) in &raw.networks {
            let (profile, issues) = resolve_network(name, declared, &vars);
            if let Some(reason) = issues.first() {
                if *name == selected_network {
                    return Err(ConfigError::NetworkValidation {
                        network: name.clone(),
                        reason: reason.clone(),
                    });
                }
                for reason in &issues {
                    warn!(network = %name, "{}", reason);
                }
            }
            networks.insert(name.clone(), profile);
        }

        if !networks.contains_key(&default_network) {
            return Err(ConfigError::UnknownNetwork(default_network));
        }
        if !networks.contains_key(&selected_network) {
            return Err(ConfigError::UnknownNetwork(selected_network));
        }

        debug!(
            network = %selected_network,
            compiler = %compiler,
            profiles = networks.len(),
            "configuration loaded"
        );

        Ok(Config {
            default_network,
            selected_network,
            compiler,
            paths,
            networks,
        })
    }

    /// Look up a network profile by name
    pub fn network(&self, name: &str) -> Result<&NetworkProfile, ConfigError> {
        self.networks
            .get(name)
            .ok_or_else(|| ConfigError::UnknownNetwork(name.to_string()))
    }

    /// Profile of the network selected at load time
    pub fn selected(&self) -> Result<&NetworkProfile, ConfigError> {
        self.network(&self.selected_network)
    }

    /// Print the resolved configuration
    pub fn write_summary(&self, out: &mut impl Write) -> std::io::Result<()> {
        writeln!(out, "Default network:   {}", self.default_network)?;
        writeln!(out, "Selected network:  {}", self.selected_network)?;
        writeln!(out, "Solidity:          {}", self.compiler)?;
        writeln!(out, "Project root:      {}", self.paths.root.display())?;
        writeln!(out, "Artifacts:         {}", self.paths.artifacts_dir().display())?;
        writeln!(out, "Sources:           {}", self.paths.sources_dir().display())?;
        writeln!(out, "Tests:             {}", self.paths.tests_dir().display())?;
        writeln!(out, "Cache:             {}", self.paths.cache_dir().display())?;

        for profile in self.networks.values() {
            writeln!(out)?;
            writeln!(out, "[{}]", profile.name)?;
            writeln!(out, "  Chain ID:        {}", display_or_auto(profile.chain_id))?;
            writeln!(out, "  Gas:             {}", display_or_auto(profile.gas_limit))?;
            writeln!(out, "  Gas price:       {}", display_or_auto(profile.gas_price))?;
            match profile.url {
                Some(ref url) => writeln!(out, "  URL:             {}", url)?,
                None => writeln!(out, "  URL:             (in-process)")?,
            }
            writeln!(out, "  Accounts:        {}", profile.accounts.describe())?;
        }
        Ok(())
    }

    /// Get configuration as JSON, secrets excluded
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn display_or_auto(value: Option<u64>) -> String {
    value.map_or_else(|| "auto".to_string(), |v| v.to_string())
}

/// Resolve one declared network. Problems are returned rather than raised so
/// the caller can decide whether this network matters.
fn resolve_network<F>(
    name: &str,
    declared: &NetworkToml,
    vars: &F,
) -> (NetworkProfile, Vec<String>)
where
    F: Fn(&str) -> Option<String>,
{
    let mut issues = Vec::new();
    let in_process = name == DEV_NETWORK;

    if in_process && declared.url.is_some() {
        issues.push(format!("'{}' runs in-process and cannot have a url", DEV_NETWORK));
    }
    if let Some(ref url) = declared.url {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            issues.push(format!("url must start with http:// or https://: {}", url));
        }
    } else if !in_process {
        issues.push("missing required field: url".to_string());
    }

    let accounts = match declared.accounts {
        None if in_process => AccountsConfig::Mnemonic(HdAccounts::dev()),
        None => {
            issues.push("missing required field: accounts".to_string());
            AccountsConfig::Keys(Vec::new())
        }
        Some(AccountsToml::Named(ref named)) if named == "remote" => {
            if in_process {
                issues.push(format!("'{}' has no node to fetch remote accounts from", DEV_NETWORK));
            }
            AccountsConfig::Remote
        }
        Some(AccountsToml::Named(ref named)) => {
            issues.push(format!(
                "accounts must be a list of keys, \"remote\" or a mnemonic table, got \"{}\"",
                named
            ));
            AccountsConfig::Keys(Vec::new())
        }
        Some(AccountsToml::Keys(ref keys)) => {
            let mut resolved = Vec::with_capacity(keys.len());
            for (i, key) in keys.iter().enumerate() {
                match expand_secret(key, vars) {
                    Ok(value) => match check_private_key(&value) {
                        Ok(()) => resolved.push(Secret::new(value)),
                        Err(reason) => issues.push(format!("accounts[{}]: {}", i, reason)),
                    },
                    Err(var) => issues.push(format!(
                        "accounts[{}]: environment variable {} is not set",
                        i, var
                    )),
                }
            }
            AccountsConfig::Keys(resolved)
        }
        Some(AccountsToml::Hd(ref hd)) if hd.count > MAX_ACCOUNT_COUNT => {
            issues.push(format!(
                "accounts.count must be at most {}, got {}",
                MAX_ACCOUNT_COUNT, hd.count
            ));
            AccountsConfig::Keys(Vec::new())
        }
        Some(AccountsToml::Hd(ref hd)) => match expand_secret(&hd.mnemonic, vars) {
            Ok(mnemonic) => AccountsConfig::Mnemonic(HdAccounts {
                mnemonic: Secret::new(mnemonic),
                path: hd.path.clone(),
                initial_index: hd.initial_index,
                count: hd.count,
                passphrase: Secret::new(hd.passphrase.clone()),
            }),
            Err(var) => {
                issues.push(format!(
                    "accounts.mnemonic: environment variable {} is not set",
                    var
                ));
                AccountsConfig::Keys(Vec::new())
            }
        },
    };

    let chain_id = match declared.chain_id {
        Some(id) => Some(id),
        None if in_process => Some(DEV_CHAIN_ID),
        None => None,
    };

    let profile = NetworkProfile {
        name: name.to_string(),
        chain_id,
        gas_limit: declared.gas,
        gas_price: declared.gas_price,
        url: declared.url.clone(),
        accounts,
    };
    (profile, issues)
}

/// Replace every `${NAME}` in `value`; the error carries the first unset name.
fn expand_secret<F>(value: &str, vars: &F) -> Result<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return Ok(out);
        };
        let name = &after[..end];
        match vars(name) {
            Some(v) if !v.is_empty() => out.push_str(&v),
            _ => return Err(name.to_string()),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn check_private_key(key: &str) -> Result<(), String> {
    let hex_part = key.strip_prefix("0x").unwrap_or(key);
    if hex_part.len() != 64 || hex::decode(hex_part).is_err() {
        return Err("private key must be 32 bytes of hex".to_string());
    }
    Ok(())
}

// Manual Serialize impl for Config so secrets never reach the output
impl Serialize for Config {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let networks: BTreeMap<&str, serde_json::Value> = self
            .networks
            .values()
            .map(|p| {
                let value = serde_json::json!({
                    "chain_id": p.chain_id,
                    "gas": p.gas_limit,
                    "gas_price": p.gas_price,
                    "url": p.url,
                    "accounts": p.accounts.describe(),
                });
                (p.name.as_str(), value)
            })
            .collect();

        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry("default_network", &self.default_network)?;
        map.serialize_entry("selected_network", &self.selected_network)?;
        map.serialize_entry("solidity", self.compiler.version())?;
        map.serialize_entry(
            "artifacts",
            &self.paths.artifacts_dir().display().to_string(),
        )?;
        map.serialize_entry("networks", &networks)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE: &str = r#"
default_network = "hardhat"
solidity = "0.8.4"

[paths]
artifacts = "./src/artifacts"

[networks.hardhat]
chain_id = 1337
gas = 2100000
gas_price = 8000000000

[networks.ropsten]
url = "https://ropsten.infura.io/v3/projectid"
accounts = ["${ACCOUNT_PRIVATE_KEY}"]
"#;

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn load(network: Option<&str>, pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        Config::from_toml_str(SAMPLE, Path::new("/project"), network, vars(pairs))
    }

    #[test]
    fn test_declared_dev_network_values() {
        let config = load(None, &[]).unwrap();
        let hardhat = config.network("hardhat").unwrap();
        assert_eq!(hardhat.chain_id, Some(1337));
        assert_eq!(hardhat.gas_limit, Some(2_100_000));
        assert_eq!(hardhat.gas_price, Some(8_000_000_000));
        assert_eq!(hardhat.url, None);
        assert!(!hardhat.is_remote());
        assert_eq!(hardhat.accounts, AccountsConfig::Mnemonic(HdAccounts::dev()));
        assert_eq!(config.selected_network, "hardhat");
        assert_eq!(config.compiler.version(), "0.8.4");
    }

    #[test]
    fn test_unknown_network_lookup() {
        let config = load(None, &[]).unwrap();
        assert!(matches!(
            config.network("mainnet"),
            Err(ConfigError::UnknownNetwork(name)) if name == "mainnet"
        ));
    }

    #[test]
    fn test_selected_remote_without_secret_fails() {
        let result = load(Some("ropsten"), &[]);
        match result {
            Err(ConfigError::NetworkValidation { network, reason }) => {
                assert_eq!(network, "ropsten");
                assert!(reason.contains("ACCOUNT_PRIVATE_KEY"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_unselected_remote_without_secret_loads() {
        let config = load(None, &[]).unwrap();
        let ropsten = config.network("ropsten").unwrap();
        assert!(ropsten.is_remote());
        assert_eq!(ropsten.accounts, AccountsConfig::Keys(Vec::new()));
    }

    #[test]
    fn test_selected_remote_with_secret() {
        let config = load(Some("ropsten"), &[("ACCOUNT_PRIVATE_KEY", KEY)]).unwrap();
        let ropsten = config.selected().unwrap();
        assert_eq!(ropsten.name, "ropsten");
        assert_eq!(ropsten.chain_id, None);
        assert_eq!(
            ropsten.accounts,
            AccountsConfig::Keys(vec![Secret::new(KEY)])
        );
    }

    #[test]
    fn test_load_is_idempotent() {
        let first = load(Some("ropsten"), &[("ACCOUNT_PRIVATE_KEY", KEY)]).unwrap();
        let second = load(Some("ropsten"), &[("ACCOUNT_PRIVATE_KEY", KEY)]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_selecting_undeclared_network() {
        assert!(matches!(
            load(Some("goerli"), &[]),
            Err(ConfigError::UnknownNetwork(name)) if name == "goerli"
        ));
    }

    #[test]
    fn test_dev_network_added_when_missing() {
        let content = r#"
solidity = "0.8.4"
"#;
        let config =
            Config::from_toml_str(content, Path::new("/project"), None, vars(&[])).unwrap();
        assert_eq!(config.default_network, DEV_NETWORK);
        assert_eq!(config.selected().unwrap(), &NetworkProfile::dev());
        assert_eq!(config.paths.artifacts_dir(), PathBuf::from("/project/artifacts"));
    }

    #[test]
    fn test_default_network_must_exist() {
        let content = r#"
default_network = "sepolia"
solidity = "0.8.4"
"#;
        let result = Config::from_toml_str(content, Path::new("/project"), None, vars(&[]));
        assert!(matches!(result, Err(ConfigError::UnknownNetwork(_))));
    }

    #[test]
    fn test_missing_compiler_version() {
        let result = Config::from_toml_str("", Path::new("/project"), None, vars(&[]));
        assert!(matches!(result, Err(ConfigError::MissingField(f)) if f == "solidity"));
    }

    #[test]
    fn test_compiler_version_format() {
        assert!(CompilerSetting::parse("0.8.4").is_ok());
        assert!(CompilerSetting::parse("0.8").is_err());
        assert!(CompilerSetting::parse("^0.8.4").is_err());
        assert!(CompilerSetting::parse("0.8.x").is_err());
    }

    #[test]
    fn test_artifacts_resolved_against_root() {
        let config = load(None, &[]).unwrap();
        assert_eq!(
            config.paths.artifacts_dir(),
            PathBuf::from("/project/src/artifacts")
        );
        assert_eq!(config.paths.sources_dir(), PathBuf::from("/project/contracts"));
    }

    #[test]
    fn test_artifacts_outside_root_rejected() {
        let content = r#"
solidity = "0.8.4"
[paths]
artifacts = "../elsewhere"
"#;
        let result = Config::from_toml_str(content, Path::new("/project"), None, vars(&[]));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));

        let content = r#"
solidity = "0.8.4"
[paths]
artifacts = "/tmp/artifacts"
"#;
        let result = Config::from_toml_str(content, Path::new("/project"), None, vars(&[]));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_remote_network_requires_url() {
        let content = r#"
solidity = "0.8.4"
[networks.sepolia]
accounts = "remote"
"#;
        let result =
            Config::from_toml_str(content, Path::new("/project"), Some("sepolia"), vars(&[]));
        assert!(matches!(
            result,
            Err(ConfigError::NetworkValidation { ref reason, .. }) if reason.contains("url")
        ));
    }

    #[test]
    fn test_remote_network_requires_accounts() {
        let content = r#"
solidity = "0.8.4"
[networks.sepolia]
url = "https://rpc.sepolia.org"
"#;
        let result =
            Config::from_toml_str(content, Path::new("/project"), Some("sepolia"), vars(&[]));
        assert!(matches!(
            result,
            Err(ConfigError::NetworkValidation { ref reason, .. }) if reason.contains("accounts")
        ));
    }

    #[test]
    fn test_urlless_custom_network_is_remote() {
        let content = r#"
solidity = "0.8.4"
[networks.localdev]
chain_id = 5
"#;
        let config =
            Config::from_toml_str(content, Path::new("/project"), None, vars(&[])).unwrap();
        assert!(config.network("localdev").unwrap().is_remote());

        let result =
            Config::from_toml_str(content, Path::new("/project"), Some("localdev"), vars(&[]));
        assert!(matches!(
            result,
            Err(ConfigError::NetworkValidation { ref network, ref reason })
                if network == "localdev" && reason.contains("url")
        ));
    }

    #[test]
    fn test_mnemonic_count_bounded() {
        let content = r#"
solidity = "0.8.4"
[networks.local]
url = "http://127.0.0.1:8545"
accounts = { mnemonic = "test test test test test test test test test test test junk", count = 4294967295 }
"#;
        let result =
            Config::from_toml_str(content, Path::new("/project"), Some("local"), vars(&[]));
        assert!(matches!(
            result,
            Err(ConfigError::NetworkValidation { ref reason, .. }) if reason.contains("accounts.count")
        ));

        let config =
            Config::from_toml_str(content, Path::new("/project"), None, vars(&[])).unwrap();
        assert_eq!(
            config.network("local").unwrap().accounts,
            AccountsConfig::Keys(Vec::new())
        );
    }

    #[test]
    fn test_invalid_url_scheme() {
        let content = r#"
solidity = "0.8.4"
[networks.local]
url = "ws://127.0.0.1:8545"
accounts = "remote"
"#;
        let result =
            Config::from_toml_str(content, Path::new("/project"), Some("local"), vars(&[]));
        assert!(matches!(result, Err(ConfigError::NetworkValidation { .. })));
    }

    #[test]
    fn test_malformed_private_key() {
        let content = r#"
solidity = "0.8.4"
[networks.local]
url = "http://127.0.0.1:8545"
accounts = ["0x1234"]
"#;
        let result =
            Config::from_toml_str(content, Path::new("/project"), Some("local"), vars(&[]));
        assert!(matches!(result, Err(ConfigError::NetworkValidation { .. })));
    }

    #[test]
    fn test_mnemonic_accounts() {
        let content = r#"
solidity = "0.8.4"
[networks.local]
url = "http://127.0.0.1:8545"
accounts = { mnemonic = "${MNEMONIC}", count = 3 }
"#;
        let config = Config::from_toml_str(
            content,
            Path::new("/project"),
            Some("local"),
            vars(&[("MNEMONIC", DEV_MNEMONIC)]),
        )
        .unwrap();
        match &config.selected().unwrap().accounts {
            AccountsConfig::Mnemonic(hd) => {
                assert_eq!(hd.mnemonic.expose(), DEV_MNEMONIC);
                assert_eq!(hd.path, DEFAULT_HD_PATH);
                assert_eq!(hd.initial_index, 0);
                assert_eq!(hd.count, 3);
            }
            other => panic!("expected mnemonic accounts, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_accounts_keyword() {
        let content = r#"
solidity = "0.8.4"
[networks.local]
url = "http://127.0.0.1:8545"
accounts = "everything"
"#;
        let result =
            Config::from_toml_str(content, Path::new("/project"), Some("local"), vars(&[]));
        assert!(matches!(result, Err(ConfigError::NetworkValidation { .. })));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let content = r#"
solidity = "0.8.4"
[networks.hardhat]
chainId = 1337
"#;
        let result = Config::from_toml_str(content, Path::new("/project"), None, vars(&[]));
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_expand_secret() {
        let lookup = vars(&[("A", "1"), ("B", "2")]);
        assert_eq!(expand_secret("plain", &lookup).unwrap(), "plain");
        assert_eq!(expand_secret("${A}", &lookup).unwrap(), "1");
        assert_eq!(expand_secret("x${A}y${B}z", &lookup).unwrap(), "x1y2z");
        assert_eq!(expand_secret("${C}", &lookup).unwrap_err(), "C");
        assert_eq!(expand_secret("${A", &lookup).unwrap(), "${A");
    }

    #[test]
    fn test_secrets_redacted() {
        let config = load(Some("ropsten"), &[("ACCOUNT_PRIVATE_KEY", KEY)]).unwrap();
        let hex_part = KEY.trim_start_matches("0x");

        assert!(!format!("{:?}", config).contains(hex_part));
        assert!(!config.to_json().unwrap().contains(hex_part));

        let mut summary = Vec::new();
        config.write_summary(&mut summary).unwrap();
        let summary = String::from_utf8(summary).unwrap();
        assert!(!summary.contains(hex_part));
        assert!(summary.contains("1 private key(s)"));
        assert!(summary.contains("[ropsten]"));
    }

    #[test]
    fn test_json_summary_fields() {
        let config = load(None, &[]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(value["solidity"], "0.8.4");
        assert_eq!(value["networks"]["hardhat"]["chain_id"], 1337);
        assert_eq!(value["networks"]["hardhat"]["gas"], 2_100_000);
        assert_eq!(value["networks"]["ropsten"]["url"], "https://ropsten.infura.io/v3/projectid");
    }
}
