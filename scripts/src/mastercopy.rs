//! Extraction and deterministic deployment of mastercopies

use std::collections::BTreeMap;

use alloy::primitives::{Address, B256};
use governor_common::{
    artifacts::ArtifactStore,
    ledger::DeploymentRecord,
    mastercopy::{ExtractionParams, MastercopiesFile, MastercopyArtifact},
};
use tracing::{info, warn};

use crate::{
    context::NetworkContext,
    deployments::LedgerSection,
    errors::ScriptError,
    solidity::ISingletonFactory,
    transactions::{resume_pending_tx, submit_tx, wait_for_receipt},
    types::GovernorContract,
    utils::has_code,
};

/// Packages the compiled `contract` into a mastercopy artifact.
///
/// Libraries are bound to the addresses of their own mastercopies, which must
/// have been extracted first.
pub fn extract_mastercopy_artifact(
    store: &ArtifactStore,
    contract: GovernorContract,
    contract_version: &str,
    salt: B256,
    factory: Address,
    extracted: &MastercopiesFile,
) -> Result<MastercopyArtifact, ScriptError> {
    let name = contract.contract_name();
    let build = store.read_artifact(name, None)?;
    let build_info = store.read_build_info(name, None)?;

    let mut libraries = BTreeMap::new();
    for (source, names) in &build.link_references {
        for library in names.keys() {
            let mastercopy = extracted
                .get(library, Some(contract_version))
                .or_else(|_| extracted.get(library, None))
                .map_err(|_| {
                    ScriptError::MissingLibrary(format!(
                        "{library} must be extracted before {name}"
                    ))
                })?;
            libraries.insert(format!("{source}:{library}"), mastercopy.address);
        }
    }

    let artifact = MastercopyArtifact::from_build(
        &build,
        &build_info,
        ExtractionParams {
            contract_version: contract_version.to_string(),
            constructor_args: contract.mastercopy_constructor_args(),
            salt,
            factory,
            libraries,
        },
    )?;

    info!(
        "Extracted {} ({}), predicted at {:#x}",
        artifact.ledger_key(),
        artifact.compiler_version,
        artifact.address
    );
    Ok(artifact)
}

/// Deploys a mastercopy through its CREATE2 factory.
///
/// The deployment is a no-op when the predicted address already holds code.
/// Returns the mastercopy address.
pub async fn deploy_mastercopy_artifact(
    ctx: &mut NetworkContext,
    artifact: &MastercopyArtifact,
) -> Result<Address, ScriptError> {
    let key = artifact.ledger_key();
    let stage = format!("deploy mastercopy {key}");
    let settings = ctx.settings.clone();

    let init_code = artifact.init_code()?;
    let address = artifact.predicted_address()?;
    if address != artifact.address {
        return Err(ScriptError::ArtifactParsing(format!(
            "{key} records address {:#x} but its init code deploys to {address:#x}",
            artifact.address
        )));
    }

    if !has_code(&ctx.client, &settings, artifact.factory).await? {
        return Err(ScriptError::MissingFactory(format!(
            "no code at {:#x} on {}",
            artifact.factory, ctx.network.name
        )));
    }
    for (library, library_address) in &artifact.libraries {
        if !has_code(&ctx.client, &settings, *library_address).await? {
            return Err(ScriptError::MissingLibrary(format!(
                "{library} has no code at {library_address:#x}, deploy its mastercopy first"
            )));
        }
    }

    let fingerprint = artifact.fingerprint()?;
    let record = ctx
        .ledger
        .begin(LedgerSection::Mastercopies, &key, address, fingerprint)?;

    if has_code(&ctx.client, &settings, address).await? {
        info!("{stage}: already deployed at {address:#x}");
        if !record.status.is_deployed() {
            ctx.ledger
                .update(LedgerSection::Mastercopies, &key, |r| r.mark_deployed(&key, address))?;
        }
        return Ok(address);
    }

    if record.status.is_deployed() {
        // A restarted development node loses its state but not the ledger
        warn!(
            "{stage}: recorded as {} but no code at {address:#x}, redeploying",
            record.status
        );
        ctx.ledger.update(LedgerSection::Mastercopies, &key, |r| {
            *r = DeploymentRecord::new(address, fingerprint);
            Ok(())
        })?;
    }

    let tx_hash = match resume_pending_tx(ctx, &stage, &record).await? {
        Some(tx_hash) => tx_hash,
        None => {
            info!("{stage}: deploying through {:#x}", artifact.factory);
            let factory = ISingletonFactory::new(artifact.factory, ctx.client.clone());
            let tx = factory
                .deploy(init_code.into(), artifact.salt)
                .into_transaction_request();

            let tx_hash = submit_tx(ctx, &stage, &tx).await?;
            ctx.ledger
                .update(LedgerSection::Mastercopies, &key, |r| r.mark_pending(&key, tx_hash))?;
            tx_hash
        }
    };
    wait_for_receipt(&ctx.client, &settings, &stage, tx_hash).await?;

    if !has_code(&ctx.client, &settings, address).await? {
        return Err(ScriptError::ContractDeployment(format!(
            "{stage}: transaction {tx_hash:#x} left no code at {address:#x}"
        )));
    }
    ctx.ledger
        .update(LedgerSection::Mastercopies, &key, |r| r.mark_deployed(&key, address))?;

    info!("{stage}: deployed at {address:#x}");
    Ok(address)
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, fs, path::Path};

    use alloy::primitives::{Address, B256};
    use governor_common::{
        artifacts::ArtifactStore, constants::SINGLETON_FACTORY_ADDRESS,
        mastercopy::MastercopiesFile,
    };
    use serde_json::json;
    use tempfile::tempdir;

    use crate::{errors::ScriptError, types::GovernorContract};

    use super::extract_mastercopy_artifact;

    const LIBRARY_SOURCE: &str = "contracts/MultisendEncoder.sol";
    const GOVERNOR_SOURCE: &str = "contracts/OZGovernorModule.sol";

    /// Writes a Hardhat artifact and its debug file
    fn write_artifact(
        root: &Path,
        source: &str,
        name: &str,
        bytecode: &str,
        links: serde_json::Value,
    ) {
        let dir = root.join(source);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(format!("{name}.json")),
            json!({
                "contractName": name,
                "sourceName": source,
                "abi": [],
                "bytecode": bytecode,
                "linkReferences": links,
            })
            .to_string(),
        )
        .unwrap();
        fs::write(
            dir.join(format!("{name}.dbg.json")),
            json!({ "buildInfo": "../../build-info/build.json" }).to_string(),
        )
        .unwrap();
    }

    fn write_build_info(root: &Path) {
        let dir = root.join("build-info");
        fs::create_dir_all(&dir).unwrap();
        let import = json!({ "nodeType": "ImportDirective", "absolutePath": LIBRARY_SOURCE });
        fs::write(
            dir.join("build.json"),
            json!({
                "solcLongVersion": "0.8.20+commit.a1b79de6",
                "input": {
                    "language": "Solidity",
                    "sources": {
                        LIBRARY_SOURCE: { "content": "library MultisendEncoder {}" },
                        GOVERNOR_SOURCE: { "content": "import \"./MultisendEncoder.sol\";" },
                    },
                    "settings": { "optimizer": { "enabled": true, "runs": 200 } },
                },
                "output": {
                    "sources": {
                        LIBRARY_SOURCE: { "ast": { "nodes": [] } },
                        GOVERNOR_SOURCE: { "ast": { "nodes": [import] } },
                    },
                },
            })
            .to_string(),
        )
        .unwrap();
    }

    fn store() -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_build_info(root);
        write_artifact(root, LIBRARY_SOURCE, "MultisendEncoder", "0x6080", json!({}));
        write_artifact(
            root,
            GOVERNOR_SOURCE,
            "OZGovernorModule",
            &format!("0x60{}00", "__$0123456789abcdef0123456789abcdef01$__"),
            json!({ LIBRARY_SOURCE: { "MultisendEncoder": [{ "start": 1, "length": 20 }] } }),
        );
        let store = ArtifactStore::new(root);
        (dir, store)
    }

    #[test]
    fn test_governor_requires_extracted_library() {
        let (_dir, store) = store();
        let res = extract_mastercopy_artifact(
            &store,
            GovernorContract::OzGovernorModule,
            "1.0.0",
            B256::ZERO,
            SINGLETON_FACTORY_ADDRESS,
            &MastercopiesFile::default(),
        );

        assert!(matches!(res, Err(ScriptError::MissingLibrary(_))));
    }

    #[test]
    fn test_governor_links_library_mastercopy() {
        let (_dir, store) = store();
        let mut extracted = MastercopiesFile::default();

        let library = extract_mastercopy_artifact(
            &store,
            GovernorContract::MultisendEncoder,
            "1.0.0",
            B256::ZERO,
            SINGLETON_FACTORY_ADDRESS,
            &extracted,
        )
        .unwrap();
        let library_address = library.address;
        extracted.insert(library);

        let governor = extract_mastercopy_artifact(
            &store,
            GovernorContract::OzGovernorModule,
            "1.0.0",
            B256::ZERO,
            SINGLETON_FACTORY_ADDRESS,
            &extracted,
        )
        .unwrap();

        assert_eq!(&governor.bytecode[1..21], library_address.as_slice());
        assert_eq!(
            governor.libraries,
            BTreeMap::from([(
                format!("{LIBRARY_SOURCE}:MultisendEncoder"),
                library_address
            )])
        );
        assert_eq!(
            governor.compiler_input.sources.keys().collect::<Vec<_>>(),
            vec![LIBRARY_SOURCE, GOVERNOR_SOURCE]
        );
        assert_ne!(governor.address, Address::ZERO);
    }
}
