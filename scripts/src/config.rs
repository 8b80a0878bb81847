//! Network profiles, accounts, and project paths.
//!
//! All configuration is resolved once into a [`Settings`] value from the CLI
//! flags (which themselves fall back to environment variables) and passed to
//! each command. Missing configuration is reported before any network call.

use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::signers::local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};
use clap::ValueEnum;

use crate::{
    cli::GlobalArgs,
    constants::{
        DEFAULT_MNEMONIC, ETHERSCAN_API_KEY_ENV_VAR, ETHERSCAN_V2_API_URL, INFURA_KEY_ENV_VAR,
        INFURA_KEY_PLACEHOLDER, JSON_EXTENSION,
    },
    errors::ScriptError,
    retry::RetryPolicy,
};

/// A network the scripts can deploy to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkProfile {
    /// The network name
    pub name: String,
    /// The chain id the RPC node must report
    pub chain_id: u64,
    /// The RPC URL, possibly templated with the Infura key
    pub rpc_url: String,
    /// The block explorer API, when it differs from the Etherscan V2 endpoint
    pub explorer_api_url: Option<String>,
    /// The deployment tags enabled on the network
    pub tags: Vec<String>,
    /// Whether the network is a zkSync Era chain
    pub zksync: bool,
}

impl NetworkProfile {
    /// A profile on the Etherscan V2 endpoint
    fn new(name: &str, chain_id: u64, rpc_url: &str, tags: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            chain_id,
            rpc_url: rpc_url.to_string(),
            explorer_api_url: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            zksync: false,
        }
    }

    /// Marks the profile as a zkSync Era chain
    fn zksync(mut self) -> Self {
        self.zksync = true;
        self
    }

    /// Whether the RPC URL needs an Infura key
    pub fn needs_infura_key(&self) -> bool {
        self.rpc_url.contains(INFURA_KEY_PLACEHOLDER)
    }
}

/// The networks known to the scripts
pub fn builtin_networks() -> Vec<NetworkProfile> {
    vec![
        NetworkProfile::new("hardhat", 31337, "http://127.0.0.1:8545", &["moduleProxy"]),
        NetworkProfile::new(
            "mainnet",
            1,
            "https://mainnet.infura.io/v3/{INFURA_KEY}",
            &[],
        ),
        NetworkProfile::new("goerli", 5, "https://goerli.infura.io/v3/{INFURA_KEY}", &[]),
        NetworkProfile::new(
            "sepolia",
            11155111,
            "https://sepolia.infura.io/v3/{INFURA_KEY}",
            &["moduleMastercopy"],
        ),
        NetworkProfile::new("gnosis", 100, "https://rpc.gnosischain.com", &[]),
        NetworkProfile::new("matic", 137, "https://rpc-mainnet.maticvigil.com", &[]),
        NetworkProfile::new("zksync", 324, "https://mainnet.era.zksync.io", &[]).zksync(),
        NetworkProfile::new(
            "zksync-sepolia",
            300,
            "https://sepolia.era.zksync.dev",
            &[],
        )
        .zksync(),
    ]
}

/// Looks up a built-in network by name
pub fn network_profile(name: &str) -> Result<NetworkProfile, ScriptError> {
    builtin_networks()
        .into_iter()
        .find(|n| n.name == name)
        .ok_or_else(|| {
            let known = builtin_networks()
                .into_iter()
                .map(|n| n.name)
                .collect::<Vec<_>>()
                .join(", ");
            ScriptError::Configuration(format!("unknown network {name} (known: {known})"))
        })
}

/// The named accounts, mapped to indices of the configured mnemonic
#[derive(ValueEnum, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum NamedAccount {
    /// Deploys the mastercopies and proxies
    #[default]
    Deployer,
    /// Deploys test dependencies
    DependenciesDeployer,
    /// Drives tests
    Tester,
}

impl NamedAccount {
    /// The mnemonic derivation index of the account
    pub fn index(&self) -> u32 {
        match self {
            NamedAccount::Deployer => 0,
            NamedAccount::DependenciesDeployer => 1,
            NamedAccount::Tester => 2,
        }
    }
}

impl Display for NamedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamedAccount::Deployer => write!(f, "deployer"),
            NamedAccount::DependenciesDeployer => write!(f, "dependencies-deployer"),
            NamedAccount::Tester => write!(f, "tester"),
        }
    }
}

/// Where the signing keys come from
#[derive(Clone, PartialEq, Eq)]
pub enum AccountSource {
    /// A single private key, used for every named account
    PrivateKey(String),
    /// A BIP-39 mnemonic, from which named accounts are derived
    Mnemonic(String),
}

impl fmt::Debug for AccountSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountSource::PrivateKey(_) => write!(f, "PrivateKey(..)"),
            AccountSource::Mnemonic(_) => write!(f, "Mnemonic(..)"),
        }
    }
}

impl AccountSource {
    /// A private key takes precedence over a mnemonic, and the development
    /// mnemonic is used when neither is set
    pub fn resolve(private_key: Option<&str>, mnemonic: Option<&str>) -> Self {
        match (private_key, mnemonic) {
            (Some(key), _) if !key.is_empty() => AccountSource::PrivateKey(key.to_string()),
            (_, Some(phrase)) if !phrase.is_empty() => AccountSource::Mnemonic(phrase.to_string()),
            _ => AccountSource::Mnemonic(DEFAULT_MNEMONIC.to_string()),
        }
    }

    /// The signer for the given named account
    pub fn signer(&self, account: NamedAccount) -> Result<PrivateKeySigner, ScriptError> {
        match self {
            AccountSource::PrivateKey(key) => PrivateKeySigner::from_str(key)
                .map_err(|e| ScriptError::Configuration(format!("invalid private key: {e}"))),
            AccountSource::Mnemonic(phrase) => MnemonicBuilder::<English>::default()
                .phrase(phrase.as_str())
                .index(account.index())
                .map_err(|e| ScriptError::Configuration(e.to_string()))?
                .build()
                .map_err(|e| ScriptError::Configuration(format!("invalid mnemonic: {e}"))),
        }
    }
}

/// The filesystem locations the scripts read from and write to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectPaths {
    /// The project root, holding `package.json`
    pub root: PathBuf,
    /// The Hardhat artifacts directory
    pub artifacts: PathBuf,
    /// The zksolc artifacts directory
    pub zksync_artifacts: PathBuf,
    /// The mastercopy artifacts file
    pub mastercopies: PathBuf,
    /// The directory holding one deployment ledger per network
    pub deployments: PathBuf,
}

impl ProjectPaths {
    /// The deployment ledger of `network`
    pub fn ledger_path(&self, network: &str) -> PathBuf {
        self.deployments
            .join(network)
            .with_extension(JSON_EXTENSION)
    }

    /// Resolves `path` against the project root unless it is absolute
    fn resolve(root: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }
}

/// The resolved configuration of a script run
#[derive(Clone, Debug)]
pub struct Settings {
    /// The networks to run against
    pub networks: Vec<NetworkProfile>,
    /// An RPC URL overriding the profile's
    pub rpc_url_override: Option<String>,
    /// The Infura project key
    pub infura_key: Option<String>,
    /// The signing keys
    pub accounts: AccountSource,
    /// The named account sending transactions
    pub account: NamedAccount,
    /// The block explorer API key
    pub etherscan_api_key: Option<String>,
    /// The block explorer API URL overriding the profile's
    pub explorer_api_url_override: Option<String>,
    /// The filesystem locations
    pub paths: ProjectPaths,
    /// How network operations are retried
    pub retry: RetryPolicy,
}

impl Settings {
    /// Resolves the settings from the global CLI arguments
    pub fn from_args(args: &GlobalArgs) -> Result<Self, ScriptError> {
        if args.network.is_empty() {
            return Err(ScriptError::Configuration("no network selected".to_string()));
        }
        let networks = args
            .network
            .iter()
            .map(|name| network_profile(name.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        let root = args.root.clone();
        let paths = ProjectPaths {
            artifacts: ProjectPaths::resolve(&root, &args.artifacts),
            zksync_artifacts: ProjectPaths::resolve(&root, &args.zksync_artifacts),
            mastercopies: ProjectPaths::resolve(&root, &args.mastercopies),
            deployments: ProjectPaths::resolve(&root, &args.deployments),
            root,
        };

        let retry = RetryPolicy {
            max_attempts: args.max_attempts.max(1),
            attempt_timeout: std::time::Duration::from_secs(args.timeout_secs),
            ..Default::default()
        };

        Ok(Self {
            networks,
            rpc_url_override: args.rpc_url.clone(),
            infura_key: args.infura_key.clone().filter(|k| !k.is_empty()),
            accounts: AccountSource::resolve(args.private_key.as_deref(), args.mnemonic.as_deref()),
            account: args.account,
            etherscan_api_key: args.etherscan_api_key.clone().filter(|k| !k.is_empty()),
            explorer_api_url_override: args.explorer_api_url.clone(),
            paths,
            retry,
        })
    }

    /// The RPC URL of `network`, with the Infura key substituted
    pub fn rpc_url(&self, network: &NetworkProfile) -> Result<String, ScriptError> {
        if let Some(url) = &self.rpc_url_override {
            return Ok(url.clone());
        }

        if !network.needs_infura_key() {
            return Ok(network.rpc_url.clone());
        }

        let key = self.infura_key.as_deref().ok_or_else(|| {
            ScriptError::Configuration(format!(
                "network {} requires {INFURA_KEY_ENV_VAR} to be set",
                network.name
            ))
        })?;
        Ok(network.rpc_url.replace(INFURA_KEY_PLACEHOLDER, key))
    }

    /// The block explorer API URL of `network`
    pub fn explorer_api_url(&self, network: &NetworkProfile) -> String {
        self.explorer_api_url_override
            .clone()
            .or_else(|| network.explorer_api_url.clone())
            .unwrap_or_else(|| ETHERSCAN_V2_API_URL.to_string())
    }

    /// The block explorer API key, required for verification
    pub fn require_etherscan_api_key(&self) -> Result<&str, ScriptError> {
        self.etherscan_api_key.as_deref().ok_or_else(|| {
            ScriptError::Configuration(format!("{ETHERSCAN_API_KEY_ENV_VAR} is not set"))
        })
    }

    /// The signer of the selected named account
    pub fn signer(&self) -> Result<PrivateKeySigner, ScriptError> {
        self.accounts.signer(self.account)
    }
}
