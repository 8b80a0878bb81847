//! Integration tests for the governor contracts. These assume that a
//! development node is already running locally and that the contracts have
//! been compiled.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(unsafe_code)]

mod abis;
mod cli;
mod constants;
mod test_inventory;
mod tests;
mod util;

use clap::Parser;
use cli::Cli;
use eyre::{bail, Result};
use governor_common::artifacts::ArtifactStore;
use test_inventory::{IntegrationTest, TestArgs};
use tracing::{error, info};
use util::setup_client;

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        test,
        artifacts,
        priv_key,
        rpc_url,
    } = Cli::parse();
    tracing_subscriber::fmt().pretty().init();

    let (client, wallet) = setup_client(&priv_key, &rpc_url)?;
    let args = TestArgs {
        client,
        wallet,
        artifacts: ArtifactStore::new(artifacts),
    };

    let selected = inventory::iter::<IntegrationTest>
        .into_iter()
        .filter(|t| test.as_deref().map_or(true, |name| t.name == name))
        .collect::<Vec<_>>();
    if selected.is_empty() {
        bail!("no integration test named {}", test.unwrap_or_default());
    }

    let mut failed = Vec::new();
    for IntegrationTest { name, test_fn } in selected {
        match test_fn(args.clone()).await {
            Ok(()) => info!("{name}: passed"),
            Err(e) => {
                error!("{name}: failed, {e:?}");
                failed.push(*name);
            }
        }
    }

    if !failed.is_empty() {
        bail!("{} test(s) failed: {}", failed.len(), failed.join(", "));
    }
    info!("all tests passed");
    Ok(())
}
