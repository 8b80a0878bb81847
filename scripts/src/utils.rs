//! Utilities for the deploy scripts.

use std::{
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use alloy::{
    network::EthereumWallet,
    primitives::{Address, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    transports::http::reqwest::Url,
};
use serde_json::Value;
use tracing::info;

use crate::{
    config::{NetworkProfile, Settings},
    constants::{PACKAGE_JSON_FILE, TMP_FILE_SUFFIX},
    errors::ScriptError,
    retry::with_retries,
    transactions::map_rpc_error,
};

/// Sets up a signing client for `network`, checking that the node serves the
/// expected chain. Returns the client, its wallet and the sender address.
pub async fn setup_client(
    settings: &Settings,
    network: &NetworkProfile,
) -> Result<(DynProvider, EthereumWallet, Address), ScriptError> {
    let rpc_url = settings.rpc_url(network)?;
    let url = Url::parse(&rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    let signer = settings.signer()?;
    let sender = signer.address();

    let wallet = EthereumWallet::from(signer);
    let provider = ProviderBuilder::new().wallet(wallet.clone()).on_http(url);
    let client = DynProvider::new(provider);

    let client_ref = &client;
    let chain_id = with_retries(&settings.retry, "get chain id", || async move {
        client_ref.get_chain_id().await.map_err(map_rpc_error)
    })
    .await?;

    if chain_id != network.chain_id {
        return Err(ScriptError::Configuration(format!(
            "{} expects chain id {}, node reports {chain_id}",
            network.name, network.chain_id
        )));
    }

    info!(
        "Connected to {} (chain id {chain_id}) as {} ({sender:#x})",
        network.name, settings.account
    );
    Ok((client, wallet, sender))
}

/// Whether `address` holds code
pub async fn has_code(
    client: &DynProvider,
    settings: &Settings,
    address: Address,
) -> Result<bool, ScriptError> {
    let code = with_retries(&settings.retry, "get code", || async move {
        client.get_code_at(address).await.map_err(map_rpc_error)
    })
    .await?;

    Ok(!code.is_empty())
}

/// The current unix time in milliseconds, used as the default proxy salt nonce
pub fn unix_millis() -> Result<U256, ScriptError> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| ScriptError::Configuration(e.to_string()))?
        .as_millis();
    Ok(U256::from(millis))
}

/// Reads the `version` field of the project's `package.json`
pub fn package_version(root: &Path) -> Result<String, ScriptError> {
    let path = root.join(PACKAGE_JSON_FILE);
    let contents = fs::read_to_string(&path)
        .map_err(|e| ScriptError::ReadFile(format!("{}: {e}", path.display())))?;
    let manifest: Value =
        serde_json::from_str(&contents).map_err(|e| ScriptError::ReadFile(e.to_string()))?;

    manifest["version"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ScriptError::ReadFile(format!("no version in {}", path.display())))
}

/// Writes `contents` to a temporary sibling of `path`, then renames it over `path`
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), ScriptError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ScriptError::WriteFile(e.to_string()))?;
    }

    let mut tmp = PathBuf::from(path);
    tmp.as_mut_os_string().push(format!(".{TMP_FILE_SUFFIX}"));

    fs::write(&tmp, contents)
        .map_err(|e| ScriptError::WriteFile(format!("{}: {e}", tmp.display())))?;
    fs::rename(&tmp, path).map_err(|e| ScriptError::WriteFile(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use crate::errors::ScriptError;

    use super::{package_version, write_atomic};

    #[test]
    fn test_package_version() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"name": "@gnosis.pm/zodiac-module-oz-governor", "version": "1.2.0"}"#,
        )
        .unwrap();

        assert_eq!(package_version(dir.path()).unwrap(), "1.2.0");
    }

    #[test]
    fn test_missing_package_json() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            package_version(dir.path()),
            Err(ScriptError::ReadFile(_))
        ));
    }

    #[test]
    fn test_write_atomic_replaces_and_cleans_up() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deployments").join("hardhat.json");

        write_atomic(&path, "{}").unwrap();
        write_atomic(&path, "{\"chainId\": 31337}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"chainId\": 31337}");
        assert!(!dir.path().join("deployments").join("hardhat.json.tmp").exists());
    }
}
