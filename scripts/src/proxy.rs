//! Deployment of minimal proxies through the Zodiac module proxy factory

use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use governor_common::{
    create2::{predict_proxy_address, proxy_salt},
    events::parse_proxy_creation,
};
use tracing::info;

use crate::{
    context::NetworkContext,
    deployments::LedgerSection,
    errors::ScriptError,
    retry::with_retries,
    solidity::{IAvatar, IModuleProxyFactory},
    transactions::{map_contract_error, resume_pending_tx, send_tx, submit_tx, wait_for_receipt},
    utils::has_code,
};

/// The inputs of a proxy deployment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyDeployment {
    /// The module proxy factory
    pub factory: Address,
    /// The mastercopy the proxy delegates to
    pub mastercopy: Address,
    /// The `setUp` calldata the proxy is initialized with
    pub initializer: Bytes,
    /// The nonce mixed into the CREATE2 salt
    pub salt_nonce: U256,
}

impl ProxyDeployment {
    /// The address the factory deploys the proxy at
    pub fn predicted_address(&self) -> Address {
        predict_proxy_address(self.factory, self.mastercopy, &self.initializer, self.salt_nonce)
    }

    /// Identifies the deployment inputs: the factory, the mastercopy, and the
    /// salt derived from the initializer and salt nonce
    pub fn fingerprint(&self) -> B256 {
        let mut preimage = self.factory.to_vec();
        preimage.extend_from_slice(self.mastercopy.as_slice());
        preimage.extend_from_slice(proxy_salt(&self.initializer, self.salt_nonce).as_slice());
        keccak256(preimage)
    }
}

/// Deploys a proxy recorded under `label` in the ledger, returning its address.
///
/// A proxy already at the predicted address is returned as is, since the same
/// inputs can only ever produce that proxy.
pub async fn deploy_proxy_with_label(
    ctx: &mut NetworkContext,
    label: &str,
    deployment: &ProxyDeployment,
) -> Result<Address, ScriptError> {
    let stage = format!("deploy proxy {label}");
    let settings = ctx.settings.clone();
    let address = deployment.predicted_address();

    if !has_code(&ctx.client, &settings, deployment.factory).await? {
        return Err(ScriptError::MissingFactory(format!(
            "no module proxy factory at {:#x} on {}",
            deployment.factory, ctx.network.name
        )));
    }
    if !has_code(&ctx.client, &settings, deployment.mastercopy).await? {
        return Err(ScriptError::NotDeployed(format!(
            "no mastercopy at {:#x} on {}",
            deployment.mastercopy, ctx.network.name
        )));
    }

    let record = ctx
        .ledger
        .begin(LedgerSection::Proxies, label, address, deployment.fingerprint())?;

    if has_code(&ctx.client, &settings, address).await? {
        info!("{stage}: proxy already at {address:#x}");
        if !record.status.is_deployed() {
            ctx.ledger
                .update(LedgerSection::Proxies, label, |r| r.mark_deployed(label, address))?;
        }
        return Ok(address);
    }

    let tx_hash = match resume_pending_tx(ctx, &stage, &record).await? {
        Some(tx_hash) => tx_hash,
        None => {
            info!(
                "{stage}: deploying proxy of {:#x} (salt nonce {}), expected at {address:#x}",
                deployment.mastercopy, deployment.salt_nonce
            );
            let factory = IModuleProxyFactory::new(deployment.factory, ctx.client.clone());
            let tx = factory
                .deployModule(
                    deployment.mastercopy,
                    deployment.initializer.clone(),
                    deployment.salt_nonce,
                )
                .into_transaction_request();

            let tx_hash = submit_tx(ctx, &stage, &tx).await?;
            ctx.ledger
                .update(LedgerSection::Proxies, label, |r| r.mark_pending(label, tx_hash))?;
            tx_hash
        }
    };
    let receipt = wait_for_receipt(&ctx.client, &settings, &stage, tx_hash).await?;

    let logs = receipt.inner.logs().iter().map(|log| &log.inner);
    let creation = parse_proxy_creation(logs, deployment.factory).ok_or_else(|| {
        ScriptError::ContractDeployment(format!(
            "{stage}: no ModuleProxyCreation event in {tx_hash:#x}"
        ))
    })?;
    if creation.proxy != address || creation.mastercopy != deployment.mastercopy {
        return Err(ScriptError::ContractDeployment(format!(
            "{stage}: factory created {:#x} for {:#x}, expected {address:#x} for {:#x}",
            creation.proxy, creation.mastercopy, deployment.mastercopy
        )));
    }

    ctx.ledger
        .update(LedgerSection::Proxies, label, |r| r.mark_deployed(label, address))?;
    info!("{stage}: deployed at {address:#x}");
    Ok(address)
}

/// Enables `module` on `avatar` unless it is enabled already
pub async fn enable_module(
    ctx: &NetworkContext,
    avatar: Address,
    module: Address,
) -> Result<(), ScriptError> {
    let stage = format!("enable module {module:#x}");
    let avatar_contract = &IAvatar::new(avatar, ctx.client.clone());

    let enabled = with_retries(&ctx.settings.retry, &stage, || async move {
        avatar_contract
            .isModuleEnabled(module)
            .call()
            .await
            .map(|res| res._0)
            .map_err(map_contract_error)
    })
    .await?;
    if enabled {
        info!("{stage}: already enabled on {avatar:#x}");
        return Ok(());
    }

    let tx = avatar_contract.enableModule(module).into_transaction_request();
    send_tx(ctx, &stage, &tx).await?;
    info!("{stage}: enabled on {avatar:#x}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, Bytes, U256};
    use governor_common::{
        abi_args::AbiArgs, constants::MODULE_PROXY_FACTORY_ADDRESS, create2::predict_proxy_address,
    };
    use serde_json::json;

    use super::ProxyDeployment;

    fn deployment(salt_nonce: u64) -> ProxyDeployment {
        let initializer = AbiArgs::new(
            ["address", "string", "string"],
            vec![
                json!("0x0000000000000000000000000000000000000002"),
                json!("Token"),
                json!("TKN"),
            ],
        )
        .setup_calldata()
        .unwrap();

        ProxyDeployment {
            factory: MODULE_PROXY_FACTORY_ADDRESS,
            mastercopy: address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
            initializer,
            salt_nonce: U256::from(salt_nonce),
        }
    }

    #[test]
    fn test_prediction_matches_factory_derivation() {
        let d = deployment(0xfa);
        assert_eq!(
            d.predicted_address(),
            predict_proxy_address(d.factory, d.mastercopy, &d.initializer, d.salt_nonce)
        );
    }

    #[test]
    fn test_identical_inputs_share_address_and_fingerprint() {
        let (a, b) = (deployment(0xfa), deployment(0xfa));
        assert_eq!(a.predicted_address(), b.predicted_address());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_tracks_every_input() {
        let base = deployment(0xfa);

        let other_nonce = deployment(0xfb);
        assert_ne!(base.fingerprint(), other_nonce.fingerprint());
        assert_ne!(base.predicted_address(), other_nonce.predicted_address());

        let other_initializer = ProxyDeployment {
            initializer: Bytes::from_static(&[0xba, 0x0c, 0xb2, 0x9e]),
            ..base.clone()
        };
        assert_ne!(base.fingerprint(), other_initializer.fingerprint());

        let other_mastercopy = ProxyDeployment {
            mastercopy: address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512"),
            ..base.clone()
        };
        assert_ne!(base.fingerprint(), other_mastercopy.fingerprint());
        assert_ne!(base.predicted_address(), other_mastercopy.predicted_address());
    }
}
