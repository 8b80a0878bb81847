//! Definition of the CLI arguments for integration tests

use std::path::PathBuf;

use clap::Parser;

use crate::constants::{DEFAULT_ARTIFACTS_DIR, DEFAULT_PKEY, DEFAULT_RPC_URL};

/// CLI tool for running integration tests against a running development node.
///
/// Every test deploys the contracts it exercises from the build artifacts.
#[derive(Parser)]
pub(crate) struct Cli {
    /// The test to run, all tests are run when omitted
    #[arg(short, long)]
    pub(crate) test: Option<String>,

    /// The directory holding the Hardhat build artifacts
    #[arg(short, long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub(crate) artifacts: PathBuf,

    /// Devnet private key, defaults to the first development account
    #[arg(short, long, env = "PRIVATE_KEY", default_value = DEFAULT_PKEY, hide_env_values = true)]
    pub(crate) priv_key: String,

    /// Devnet RPC URL
    #[arg(short, long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub(crate) rpc_url: String,
}
