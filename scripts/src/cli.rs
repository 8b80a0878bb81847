//! Definitions of CLI arguments and commands for deploy scripts

use std::path::PathBuf;

use alloy::primitives::{Address, B256, U256};
use clap::{ArgGroup, Args, Parser, Subcommand};
use governor_common::constants::{DEFAULT_MASTERCOPY_SALT, MODULE_PROXY_FACTORY_ADDRESS};

use crate::{
    commands::{
        deploy_mastercopies, deploy_mastercopy, deploy_proxy, deploy_zksync,
        extract_mastercopies, extract_mastercopy, predict_proxy, run_on_networks,
        verify_mastercopies, verify_mastercopy,
    },
    config::{NamedAccount, Settings},
    context::NetworkContext,
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_DEPLOYMENTS_DIR, DEFAULT_MASTERCOPIES_FILE,
        DEFAULT_ZKSYNC_ARTIFACTS_DIR, ETHERSCAN_API_KEY_ENV_VAR, INFURA_KEY_ENV_VAR,
        MNEMONIC_ENV_VAR, PRIVATE_KEY_ENV_VAR,
    },
    errors::ScriptError,
    types::GovernorContract,
};

/// Deployment and verification scripts for the governor module mastercopies and proxies
#[derive(Parser)]
#[command(name = "governor-scripts")]
pub struct Cli {
    /// Arguments shared by every command
    #[command(flatten)]
    pub global: GlobalArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Network and account arguments shared by every command
#[derive(Args, Clone, Debug)]
pub struct GlobalArgs {
    /// The networks to run against, comma separated
    #[arg(long, env = "NETWORK", value_delimiter = ',', default_value = "hardhat")]
    pub network: Vec<String>,

    /// An RPC URL overriding the network's
    #[arg(short, long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// The named account sending transactions
    #[arg(long, default_value = "deployer")]
    pub account: NamedAccount,

    /// The private key of the deployer, takes precedence over the mnemonic
    #[arg(long, env = PRIVATE_KEY_ENV_VAR, hide_env_values = true)]
    pub private_key: Option<String>,

    /// The mnemonic the named accounts are derived from
    #[arg(long, env = MNEMONIC_ENV_VAR, hide_env_values = true)]
    pub mnemonic: Option<String>,

    /// The Infura project key substituted into Infura RPC URLs
    #[arg(long, env = INFURA_KEY_ENV_VAR, hide_env_values = true)]
    pub infura_key: Option<String>,

    /// The block explorer API key
    #[arg(long, env = ETHERSCAN_API_KEY_ENV_VAR, hide_env_values = true)]
    pub etherscan_api_key: Option<String>,

    /// A block explorer API URL overriding the network's
    #[arg(long, env = "EXPLORER_API_URL")]
    pub explorer_api_url: Option<String>,

    /// The project root, against which the relative paths below are resolved
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// The Hardhat artifacts directory
    #[arg(long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts: PathBuf,

    /// The zksolc artifacts directory
    #[arg(long, default_value = DEFAULT_ZKSYNC_ARTIFACTS_DIR)]
    pub zksync_artifacts: PathBuf,

    /// The mastercopy artifacts file
    #[arg(long, default_value = DEFAULT_MASTERCOPIES_FILE)]
    pub mastercopies: PathBuf,

    /// The directory holding the per-network deployment ledgers
    #[arg(long, default_value = DEFAULT_DEPLOYMENTS_DIR)]
    pub deployments: PathBuf,

    /// The number of attempts for transient network failures
    #[arg(long, default_value_t = 5)]
    pub max_attempts: usize,

    /// The timeout, in seconds, of a single network attempt
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,
}

/// The available commands
#[derive(Subcommand, Clone)]
pub enum Command {
    /// Extract the mastercopy artifact of one contract
    ExtractMastercopy(ExtractMastercopyArgs),
    /// Extract the mastercopy artifacts of every contract
    ExtractMastercopies(ExtractMastercopiesArgs),
    /// Deploy the mastercopy of one contract through the singleton factory
    DeployMastercopy(MastercopyArgs),
    /// Deploy the mastercopies of every contract, in dependency order
    DeployMastercopies(MastercopiesArgs),
    /// Deploy a minimal proxy of a mastercopy through the module proxy factory
    DeployProxy(DeployProxyArgs),
    /// Predict the address of a proxy without sending a transaction
    PredictProxy(ProxyArgs),
    /// Verify the source of one deployed mastercopy on the block explorer
    VerifyMastercopy(MastercopyArgs),
    /// Verify the sources of every deployed mastercopy
    VerifyMastercopies(MastercopiesArgs),
    /// Deploy the contracts to a zkSync Era network with plain CREATE
    #[command(name = "deploy-zksync", alias = "deploy:zksync")]
    DeployZksync,
}

impl Command {
    /// Runs the command. Commands that touch a network run against each
    /// selected network concurrently.
    pub async fn run(self, settings: Settings) -> Result<(), ScriptError> {
        match self {
            Command::ExtractMastercopy(args) => extract_mastercopy(&args, &settings).map(|_| ()),
            Command::ExtractMastercopies(args) => {
                extract_mastercopies(&args, &settings).map(|_| ())
            }
            Command::PredictProxy(args) => predict_proxy(&args, &settings).map(|_| ()),
            command => run_on_networks(command, settings).await,
        }
    }

    /// Runs a network command against a single, connected network
    pub(crate) async fn run_on_network(
        &self,
        ctx: &mut NetworkContext,
    ) -> Result<(), ScriptError> {
        match self {
            Command::DeployMastercopy(args) => deploy_mastercopy(args, ctx).await.map(|_| ()),
            Command::DeployMastercopies(args) => deploy_mastercopies(args, ctx).await.map(|_| ()),
            Command::DeployProxy(args) => deploy_proxy(args, ctx).await.map(|_| ()),
            Command::VerifyMastercopy(args) => verify_mastercopy(args, ctx).await,
            Command::VerifyMastercopies(args) => verify_mastercopies(args, ctx).await,
            Command::DeployZksync => deploy_zksync(ctx).await.map(|_| ()),
            Command::ExtractMastercopy(_)
            | Command::ExtractMastercopies(_)
            | Command::PredictProxy(_) => Err(ScriptError::Configuration(
                "command does not run against a network".to_string(),
            )),
        }
    }
}

/// Extract the mastercopy artifact of one contract
#[derive(Args, Clone, Debug)]
pub struct ExtractMastercopyArgs {
    /// The contract to extract
    #[arg(short, long)]
    pub contract: GovernorContract,

    /// The version and deployment parameters of the artifact
    #[command(flatten)]
    pub common: ExtractMastercopiesArgs,
}

/// Extract the mastercopy artifacts of every contract
#[derive(Args, Clone, Debug)]
pub struct ExtractMastercopiesArgs {
    /// The version the artifacts are recorded under, defaults to the
    /// version in `package.json`
    #[arg(long)]
    pub contract_version: Option<String>,

    /// The CREATE2 salt of the mastercopy deployment
    #[arg(long, default_value_t = DEFAULT_MASTERCOPY_SALT)]
    pub salt: B256,

    /// The factory the mastercopies are deployed through
    #[arg(long)]
    pub factory: Option<Address>,
}

/// Select one recorded mastercopy
#[derive(Args, Clone, Debug)]
pub struct MastercopyArgs {
    /// The contract whose mastercopy to use
    #[arg(short, long)]
    pub contract: GovernorContract,

    /// The mastercopy version
    #[command(flatten)]
    pub common: MastercopiesArgs,
}

/// Select the recorded mastercopies of one version
#[derive(Args, Clone, Debug)]
pub struct MastercopiesArgs {
    /// The mastercopy version, defaults to the latest recorded one
    #[arg(long)]
    pub contract_version: Option<String>,
}

/// Describe a proxy of a mastercopy
#[derive(Args, Clone, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["mastercopy", "contract"])))]
#[command(group(ArgGroup::new("setup").required(true).args(["setup_args", "setup_file"])))]
pub struct ProxyArgs {
    /// The address of the mastercopy
    #[arg(long)]
    pub mastercopy: Option<Address>,

    /// A contract whose recorded mastercopy to use instead of an address
    #[arg(short, long)]
    pub contract: Option<GovernorContract>,

    /// The version of the recorded mastercopy, defaults to the latest
    #[arg(long, requires = "contract")]
    pub contract_version: Option<String>,

    /// The `setUp` arguments as JSON, e.g.
    /// `{"types":["address","string"],"values":["0x..","Token"]}`
    #[arg(long)]
    pub setup_args: Option<String>,

    /// A JSON file holding the `setUp` arguments
    #[arg(long)]
    pub setup_file: Option<PathBuf>,

    /// The salt nonce, defaults to the current unix time in milliseconds
    #[arg(long)]
    pub salt_nonce: Option<U256>,

    /// The module proxy factory
    #[arg(long, default_value_t = MODULE_PROXY_FACTORY_ADDRESS)]
    pub factory: Address,
}

/// Deploy a minimal proxy of a mastercopy
#[derive(Args, Clone, Debug)]
pub struct DeployProxyArgs {
    /// The label the proxy is recorded under in the deployment ledger
    #[arg(short, long)]
    pub label: String,

    /// How the proxy is created
    #[command(flatten)]
    pub proxy: ProxyArgs,

    /// An avatar on which to enable the proxy as a module once deployed
    #[arg(long)]
    pub avatar: Option<Address>,
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, U256};
    use clap::Parser;

    use crate::types::GovernorContract;

    use super::{Cli, Command};

    #[test]
    fn test_zksync_alias() {
        let cli = Cli::try_parse_from(["governor-scripts", "deploy:zksync"]).unwrap();
        assert!(matches!(cli.command, Command::DeployZksync));
    }

    #[test]
    fn test_proxy_requires_a_target_and_setup() {
        assert!(Cli::try_parse_from(["governor-scripts", "predict-proxy"]).is_err());
        assert!(Cli::try_parse_from([
            "governor-scripts",
            "predict-proxy",
            "--mastercopy",
            "0x0000000000000000000000000000000000000001",
        ])
        .is_err());

        let cli = Cli::try_parse_from([
            "governor-scripts",
            "predict-proxy",
            "--mastercopy",
            "0x0000000000000000000000000000000000000001",
            "--setup-args",
            r#"{"types":["uint256"],"values":[1]}"#,
            "--salt-nonce",
            "250",
        ])
        .unwrap();

        let Command::PredictProxy(args) = cli.command else {
            panic!("expected predict-proxy");
        };
        assert_eq!(
            args.mastercopy,
            Some(address!("0000000000000000000000000000000000000001"))
        );
        assert_eq!(args.salt_nonce, Some(U256::from(250)));
    }

    #[test]
    fn test_contract_names() {
        let cli = Cli::try_parse_from([
            "governor-scripts",
            "--network",
            "sepolia",
            "deploy-mastercopy",
            "--contract",
            "OZGovernorModule",
        ])
        .unwrap();

        let Command::DeployMastercopy(args) = cli.command else {
            panic!("expected deploy-mastercopy");
        };
        assert_eq!(args.contract, GovernorContract::OzGovernorModule);
        assert_eq!(cli.global.network, vec!["sepolia"]);
    }
}
