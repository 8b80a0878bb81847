//! Sequential deployment of the contracts to zkSync Era from the zksolc build
//! output. Contracts are created directly by the deployer rather than through
//! a CREATE2 factory.

use std::collections::BTreeMap;

use alloy::{
    network::TransactionBuilder,
    primitives::{keccak256, utils::format_ether, Address, B256},
    rpc::types::TransactionRequest,
};
use governor_common::{
    artifacts::ArtifactStore,
    ledger::DeploymentRecord,
};
use tracing::{info, warn};

use crate::{
    context::NetworkContext,
    deployments::LedgerSection,
    errors::ScriptError,
    transactions::{estimate_fee, resume_pending_tx, submit_tx, wait_for_receipt},
    types::GovernorContract,
    utils::has_code,
};

/// Deploys every contract in dependency order, skipping those the ledger
/// records as deployed. Returns the address of each contract.
pub async fn deploy_zksync(
    ctx: &mut NetworkContext,
) -> Result<BTreeMap<GovernorContract, Address>, ScriptError> {
    if !ctx.network.zksync {
        warn!(
            "{} is not a zkSync network, deploying the zksolc output with plain transactions",
            ctx.network.name
        );
    }

    let store = ArtifactStore::new(&ctx.settings.paths.zksync_artifacts);
    let mut deployed = BTreeMap::new();
    let mut erc20 = Address::ZERO;

    for contract in GovernorContract::ALL {
        let libraries: BTreeMap<String, Address> = deployed
            .iter()
            .map(|(c, a): (&GovernorContract, &Address)| (c.contract_name().to_string(), *a))
            .collect();
        let init_code = zksync_init_code(&store, contract, erc20, &libraries)?;

        let address = deploy_contract(ctx, contract, init_code).await?;
        if contract == GovernorContract::Erc20Votes {
            erc20 = address;
        }
        deployed.insert(contract, address);
    }

    Ok(deployed)
}

/// The creation bytecode of `contract`, linked against the deployed libraries
/// and followed by its encoded constructor arguments
pub fn zksync_init_code(
    store: &ArtifactStore,
    contract: GovernorContract,
    erc20: Address,
    libraries: &BTreeMap<String, Address>,
) -> Result<Vec<u8>, ScriptError> {
    let artifact = store.read_artifact(contract.contract_name(), None)?;
    let mut init_code = artifact.link(libraries)?;
    init_code.extend(contract.zksync_constructor_args(erc20).encode()?);
    Ok(init_code)
}

/// Deploys a single contract, resuming a submission recorded in the ledger
async fn deploy_contract(
    ctx: &mut NetworkContext,
    contract: GovernorContract,
    init_code: Vec<u8>,
) -> Result<Address, ScriptError> {
    let key = contract.contract_name();
    let stage = format!("deploy {key}");
    let settings = ctx.settings.clone();
    let fingerprint: B256 = keccak256(&init_code);

    let record = ctx
        .ledger
        .begin(LedgerSection::Contracts, key, Address::ZERO, fingerprint)?;
    if record.status.is_deployed() && has_code(&ctx.client, &settings, record.address).await? {
        info!("{stage}: already deployed at {:#x}", record.address);
        return Ok(record.address);
    }
    if record.status.is_deployed() {
        warn!("{stage}: recorded at {:#x} but no code there, redeploying", record.address);
        ctx.ledger.update(LedgerSection::Contracts, key, |r| {
            *r = DeploymentRecord::new(Address::ZERO, fingerprint);
            Ok(())
        })?;
    }

    let tx_hash = match resume_pending_tx(ctx, &stage, &record).await? {
        Some(tx_hash) => tx_hash,
        None => {
            let tx = TransactionRequest::default()
                .with_from(ctx.sender)
                .with_deploy_code(init_code);

            let fee = estimate_fee(&ctx.client, &settings, &tx).await?;
            info!("{stage}: estimated fee {} ETH", format_ether(fee));

            let tx_hash = submit_tx(ctx, &stage, &tx).await?;
            ctx.ledger
                .update(LedgerSection::Contracts, key, |r| r.mark_pending(key, tx_hash))?;
            tx_hash
        }
    };

    let receipt = wait_for_receipt(&ctx.client, &settings, &stage, tx_hash).await?;
    let address = receipt.contract_address.ok_or_else(|| {
        ScriptError::ContractDeployment(format!(
            "{stage}: receipt of {tx_hash:#x} has no contract address"
        ))
    })?;
    ctx.ledger
        .update(LedgerSection::Contracts, key, |r| r.mark_deployed(key, address))?;

    info!("{stage}: deployed at {address:#x}");
    Ok(address)
}
