//! Utilities for integration tests

use std::collections::BTreeMap;

use alloy::{
    contract::{CallBuilder, CallDecoder, Error as ContractError},
    network::{Ethereum, EthereumWallet, TransactionBuilder},
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use eyre::{ensure, eyre, Result};
use governor_common::abi_args::AbiArgs;
use governor_scripts::{errors::ScriptError, transactions::map_contract_error};
use serde_json::Value;

use crate::TestArgs;

/// The call builder type for the tests
pub type TestCallBuilder<'a, C> = CallBuilder<(), &'a DynProvider, C, Ethereum>;

// ----------
// | Client |
// ----------

/// Sets up a signing client, returning it with the sender address
pub fn setup_client(priv_key: &str, rpc_url: &str) -> Result<(DynProvider, Address)> {
    let signer: PrivateKeySigner = priv_key.parse()?;
    let wallet = signer.address();
    let url: Url = rpc_url.parse()?;

    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .on_http(url);
    Ok((DynProvider::new(provider), wallet))
}

/// Mines `blocks` empty blocks
pub async fn mine_blocks(client: &DynProvider, blocks: usize) -> Result<()> {
    for _ in 0..blocks {
        client
            .raw_request::<_, Value>("evm_mine".into(), ())
            .await?;
    }
    Ok(())
}

// ----------------
// | Deployments |
// ----------------

/// Deploys `contract_name` from the build artifacts, linked against
/// `libraries` and constructed with `constructor_args`
pub async fn deploy_contract(
    args: &TestArgs,
    contract_name: &str,
    libraries: &BTreeMap<String, Address>,
    constructor_args: &AbiArgs,
) -> Result<Address> {
    let artifact = args.artifacts.read_artifact(contract_name, None)?;
    let mut init_code = artifact.link(libraries)?;
    init_code.extend(constructor_args.encode()?);

    let tx = TransactionRequest::default()
        .with_from(args.wallet)
        .with_deploy_code(init_code);
    let receipt = args
        .client
        .send_transaction(tx)
        .await?
        .get_receipt()
        .await?;
    ensure!(receipt.status(), "deployment of {contract_name} reverted");

    receipt
        .contract_address
        .ok_or_else(|| eyre!("no contract address in the deployment receipt of {contract_name}"))
}

// ----------------
// | Transactions |
// ----------------

/// Send a transaction and wait for it to succeed
pub async fn send_tx<C: CallDecoder>(tx: TestCallBuilder<'_, C>) -> Result<TransactionReceipt> {
    let pending_tx = tx.send().await.map_err(|e| eyre!(map_contract_error(e)))?;
    let receipt = pending_tx.get_receipt().await?;
    ensure!(
        receipt.status(),
        "transaction {:#x} reverted",
        receipt.transaction_hash
    );
    Ok(receipt)
}

/// Send a transaction that must revert with a reason containing `expected`
pub async fn assert_tx_reverts<C: CallDecoder>(
    tx: TestCallBuilder<'_, C>,
    expected: &str,
) -> Result<()> {
    match tx.send().await {
        Ok(pending_tx) => {
            let receipt = pending_tx.get_receipt().await?;
            ensure!(
                !receipt.status(),
                "expected a revert with {expected}, but {:#x} succeeded",
                receipt.transaction_hash
            );
            Ok(())
        }
        Err(e) => assert_revert_reason(e, expected),
    }
}

/// Make a call that must revert with a reason containing `expected`
pub async fn assert_call_reverts<C: CallDecoder + Unpin>(
    call: TestCallBuilder<'_, C>,
    expected: &str,
) -> Result<()> {
    match call.call().await {
        Ok(_) => Err(eyre!("expected a revert with {expected}, but the call succeeded")),
        Err(e) => assert_revert_reason(e, expected),
    }
}

/// Checks that a contract error is a revert whose reason contains `expected`
fn assert_revert_reason(err: ContractError, expected: &str) -> Result<()> {
    match map_contract_error(err) {
        ScriptError::Revert(reason) => {
            ensure!(
                reason.contains(expected),
                "expected a revert with {expected}, got {reason}"
            );
            Ok(())
        }
        other => Err(eyre!("expected a revert with {expected}, got {other}")),
    }
}
