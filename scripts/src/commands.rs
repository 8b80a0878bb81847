//! Implementations of the various deploy scripts

use std::{collections::BTreeMap, fs, path::Path, sync::Arc};

use alloy::primitives::Address;
use governor_common::{
    abi_args::AbiArgs,
    artifacts::ArtifactStore,
    constants::SINGLETON_FACTORY_ADDRESS,
    mastercopy::{MastercopiesFile, MastercopyArtifact},
};
use itertools::Itertools;
use tokio::task::JoinSet;
use tracing::{error, info, info_span, Instrument};

use crate::{
    cli::{
        Command, DeployProxyArgs, ExtractMastercopiesArgs, ExtractMastercopyArgs,
        MastercopiesArgs, MastercopyArgs, ProxyArgs,
    },
    config::Settings,
    context::NetworkContext,
    errors::ScriptError,
    mastercopy::{deploy_mastercopy_artifact, extract_mastercopy_artifact},
    proxy::{deploy_proxy_with_label, enable_module, ProxyDeployment},
    types::GovernorContract,
    utils::{package_version, unix_millis, write_atomic},
    verify::{explorer_client, verify_mastercopy_artifact},
    zksync,
};

// --- Extraction --- //

/// Extracts the mastercopy artifact of a single contract and records it in the
/// mastercopies file
pub fn extract_mastercopy(
    args: &ExtractMastercopyArgs,
    settings: &Settings,
) -> Result<MastercopyArtifact, ScriptError> {
    let mut file = MastercopiesFile::load(&settings.paths.mastercopies)?;
    let artifact = extract_into(&mut file, args.contract, &args.common, settings)?;
    save_mastercopies(&file, &settings.paths.mastercopies)?;

    Ok(artifact)
}

/// Extracts the mastercopy artifacts of every contract, libraries first so
/// that the contracts linking them see their addresses
pub fn extract_mastercopies(
    args: &ExtractMastercopiesArgs,
    settings: &Settings,
) -> Result<Vec<MastercopyArtifact>, ScriptError> {
    let mut file = MastercopiesFile::load(&settings.paths.mastercopies)?;
    let artifacts = GovernorContract::ALL
        .into_iter()
        .map(|contract| extract_into(&mut file, contract, args, settings))
        .collect::<Result<Vec<_>, _>>()?;
    save_mastercopies(&file, &settings.paths.mastercopies)?;

    Ok(artifacts)
}

/// Extracts one artifact and inserts it into `file`
fn extract_into(
    file: &mut MastercopiesFile,
    contract: GovernorContract,
    args: &ExtractMastercopiesArgs,
    settings: &Settings,
) -> Result<MastercopyArtifact, ScriptError> {
    let contract_version = match &args.contract_version {
        Some(version) => version.clone(),
        None => package_version(&settings.paths.root)?,
    };

    let artifact = extract_mastercopy_artifact(
        &ArtifactStore::new(&settings.paths.artifacts),
        contract,
        &contract_version,
        args.salt,
        args.factory.unwrap_or(SINGLETON_FACTORY_ADDRESS),
        file,
    )?;
    file.insert(artifact.clone());

    Ok(artifact)
}

/// Writes the mastercopies file
fn save_mastercopies(file: &MastercopiesFile, path: &Path) -> Result<(), ScriptError> {
    write_atomic(path, &file.to_json()?)?;
    info!("Wrote mastercopy artifacts to {}", path.display());
    Ok(())
}

/// Reads the recorded mastercopy of `contract`
fn recorded_mastercopy(
    settings: &Settings,
    contract: GovernorContract,
    contract_version: Option<&str>,
) -> Result<MastercopyArtifact, ScriptError> {
    let file = MastercopiesFile::load(&settings.paths.mastercopies)?;
    let artifact = file.get(contract.contract_name(), contract_version)?;
    Ok(artifact.clone())
}

// --- Mastercopies --- //

/// Deploys the recorded mastercopy of a single contract
pub async fn deploy_mastercopy(
    args: &MastercopyArgs,
    ctx: &mut NetworkContext,
) -> Result<Address, ScriptError> {
    let artifact = recorded_mastercopy(
        &ctx.settings,
        args.contract,
        args.common.contract_version.as_deref(),
    )?;
    deploy_mastercopy_artifact(ctx, &artifact).await
}

/// Deploys the recorded mastercopies of every contract in dependency order
pub async fn deploy_mastercopies(
    args: &MastercopiesArgs,
    ctx: &mut NetworkContext,
) -> Result<BTreeMap<GovernorContract, Address>, ScriptError> {
    let mut addresses = BTreeMap::new();
    for contract in GovernorContract::ALL {
        let artifact =
            recorded_mastercopy(&ctx.settings, contract, args.contract_version.as_deref())?;
        let address = deploy_mastercopy_artifact(ctx, &artifact).await?;
        addresses.insert(contract, address);
    }

    Ok(addresses)
}

// --- Proxies --- //

/// Resolves the inputs of a proxy deployment from the CLI arguments
pub fn proxy_deployment(
    args: &ProxyArgs,
    settings: &Settings,
) -> Result<ProxyDeployment, ScriptError> {
    let mastercopy = match (args.mastercopy, args.contract) {
        (Some(address), _) => address,
        (None, Some(contract)) => {
            recorded_mastercopy(settings, contract, args.contract_version.as_deref())?.address
        }
        (None, None) => {
            return Err(ScriptError::Configuration(
                "either a mastercopy address or a contract is required".to_string(),
            ))
        }
    };

    let setup_args = setup_args(args)?;
    let salt_nonce = match args.salt_nonce {
        Some(nonce) => nonce,
        None => unix_millis()?,
    };

    Ok(ProxyDeployment {
        factory: args.factory,
        mastercopy,
        initializer: setup_args.setup_calldata()?,
        salt_nonce,
    })
}

/// Parses the `setUp` arguments from the inline JSON or the JSON file
fn setup_args(args: &ProxyArgs) -> Result<AbiArgs, ScriptError> {
    let json = match (&args.setup_args, &args.setup_file) {
        (Some(json), _) => json.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .map_err(|e| ScriptError::ReadFile(format!("{}: {e}", path.display())))?,
        (None, None) => {
            return Err(ScriptError::Configuration(
                "setUp arguments are required".to_string(),
            ))
        }
    };

    serde_json::from_str(&json).map_err(|e| ScriptError::CalldataConstruction(e.to_string()))
}

/// Predicts the address of a proxy without touching a network
pub fn predict_proxy(args: &ProxyArgs, settings: &Settings) -> Result<Address, ScriptError> {
    let deployment = proxy_deployment(args, settings)?;
    let address = deployment.predicted_address();

    info!(
        "Proxy of {:#x} with salt nonce {} through {:#x} is deployed at {address:#x}",
        deployment.mastercopy, deployment.salt_nonce, deployment.factory
    );
    Ok(address)
}

/// Deploys a proxy and optionally enables it as a module on an avatar
pub async fn deploy_proxy(
    args: &DeployProxyArgs,
    ctx: &mut NetworkContext,
) -> Result<Address, ScriptError> {
    let deployment = proxy_deployment(&args.proxy, &ctx.settings)?;
    let address = deploy_proxy_with_label(ctx, &args.label, &deployment).await?;

    if let Some(avatar) = args.avatar {
        enable_module(ctx, avatar, address).await?;
    }

    Ok(address)
}

// --- Verification --- //

/// Verifies the source of a single deployed mastercopy
pub async fn verify_mastercopy(
    args: &MastercopyArgs,
    ctx: &mut NetworkContext,
) -> Result<(), ScriptError> {
    let artifact = recorded_mastercopy(
        &ctx.settings,
        args.contract,
        args.common.contract_version.as_deref(),
    )?;
    let explorer = explorer_client(ctx)?;
    verify_mastercopy_artifact(ctx, &explorer, &artifact).await?;

    Ok(())
}

/// Verifies the sources of every deployed mastercopy
pub async fn verify_mastercopies(
    args: &MastercopiesArgs,
    ctx: &mut NetworkContext,
) -> Result<(), ScriptError> {
    let explorer = explorer_client(ctx)?;
    for contract in GovernorContract::ALL {
        let artifact =
            recorded_mastercopy(&ctx.settings, contract, args.contract_version.as_deref())?;
        verify_mastercopy_artifact(ctx, &explorer, &artifact).await?;
    }

    Ok(())
}

// --- zkSync --- //

/// Deploys the zksolc build output with plain transactions
pub async fn deploy_zksync(
    ctx: &mut NetworkContext,
) -> Result<BTreeMap<GovernorContract, Address>, ScriptError> {
    let addresses = zksync::deploy_zksync(ctx).await?;
    info!(
        "Deployed {}",
        addresses
            .iter()
            .map(|(contract, address)| format!("{contract} at {address:#x}"))
            .join(", ")
    );

    Ok(addresses)
}

// --- Networks --- //

/// Runs `command` against every selected network, each on its own task.
/// Returns the first failure once every network is done.
pub async fn run_on_networks(command: Command, settings: Settings) -> Result<(), ScriptError> {
    let settings = Arc::new(settings);
    let mut tasks = JoinSet::new();

    for network in settings.networks.iter().cloned() {
        let command = command.clone();
        let settings = settings.clone();
        let name = network.name.clone();
        let span = info_span!("network", name = %network.name);

        tasks.spawn(
            async move {
                let res = async {
                    let mut ctx = NetworkContext::connect(network, settings).await?;
                    command.run_on_network(&mut ctx).await
                }
                .await;
                (name, res)
            }
            .instrument(span),
        );
    }

    let mut first_error = None;
    while let Some(joined) = tasks.join_next().await {
        let (name, res) = match joined {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => return Err(ScriptError::Aborted),
        };

        match res {
            Ok(()) => info!("{name}: done"),
            Err(e) => {
                error!("{name}: {e}");
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
