//! The per-network deployments ledger.
//!
//! Every deployment step is recorded under a key in one of three sections
//! before and after it touches the chain, and the ledger is persisted after
//! every change. A rerun of a command reads the ledger back and resumes
//! from the recorded status rather than repeating completed steps.

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
    fs,
    path::{Path, PathBuf},
};

use alloy::primitives::{Address, B256};
use governor_common::{errors::LedgerError, ledger::DeploymentRecord};
use serde::{Deserialize, Serialize};

use crate::{errors::ScriptError, utils::write_atomic};

/// The sections of a ledger
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerSection {
    /// Mastercopies deployed through the singleton factory, keyed by `Name@version`
    Mastercopies,
    /// Proxies deployed through the module proxy factory, keyed by label
    Proxies,
    /// Contracts deployed with plain CREATE, keyed by contract name
    Contracts,
}

impl Display for LedgerSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerSection::Mastercopies => write!(f, "mastercopies"),
            LedgerSection::Proxies => write!(f, "proxies"),
            LedgerSection::Contracts => write!(f, "contracts"),
        }
    }
}

/// The serialized form of a ledger
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentsFile {
    /// The chain the ledger belongs to
    pub chain_id: u64,
    /// Mastercopy deployments
    #[serde(default)]
    pub mastercopies: BTreeMap<String, DeploymentRecord>,
    /// Proxy deployments
    #[serde(default)]
    pub proxies: BTreeMap<String, DeploymentRecord>,
    /// Plain CREATE deployments
    #[serde(default)]
    pub contracts: BTreeMap<String, DeploymentRecord>,
}

impl DeploymentsFile {
    /// The records of `section`
    fn section(&self, section: LedgerSection) -> &BTreeMap<String, DeploymentRecord> {
        match section {
            LedgerSection::Mastercopies => &self.mastercopies,
            LedgerSection::Proxies => &self.proxies,
            LedgerSection::Contracts => &self.contracts,
        }
    }

    /// The records of `section`, mutably
    fn section_mut(&mut self, section: LedgerSection) -> &mut BTreeMap<String, DeploymentRecord> {
        match section {
            LedgerSection::Mastercopies => &mut self.mastercopies,
            LedgerSection::Proxies => &mut self.proxies,
            LedgerSection::Contracts => &mut self.contracts,
        }
    }
}

/// A ledger bound to its file
#[derive(Debug)]
pub struct Ledger {
    /// The file the ledger is persisted to
    path: PathBuf,
    /// The records
    file: DeploymentsFile,
}

impl Ledger {
    /// Opens the ledger at `path`, starting an empty one if the file does
    /// not exist. A ledger recorded for another chain is rejected.
    pub fn open(path: &Path, chain_id: u64) -> Result<Self, ScriptError> {
        let file = if path.exists() {
            let contents = fs::read_to_string(path)
                .map_err(|e| ScriptError::ReadFile(format!("{}: {e}", path.display())))?;
            let file: DeploymentsFile = serde_json::from_str(&contents)
                .map_err(|e| ScriptError::ReadFile(format!("{}: {e}", path.display())))?;

            if file.chain_id != chain_id {
                return Err(ScriptError::Configuration(format!(
                    "{} records chain id {}, expected {chain_id}",
                    path.display(),
                    file.chain_id
                )));
            }
            file
        } else {
            DeploymentsFile {
                chain_id,
                ..Default::default()
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// The record of `key` in `section`, if any
    pub fn get(&self, section: LedgerSection, key: &str) -> Option<&DeploymentRecord> {
        self.file.section(section).get(key)
    }

    /// Returns the record of `key`, creating it if absent. An existing record
    /// created for other deployment inputs is a conflict.
    pub fn begin(
        &mut self,
        section: LedgerSection,
        key: &str,
        address: Address,
        fingerprint: B256,
    ) -> Result<DeploymentRecord, ScriptError> {
        if let Some(record) = self.get(section, key) {
            record.check_fingerprint(key, fingerprint)?;
            return Ok(record.clone());
        }

        let record = DeploymentRecord::new(address, fingerprint);
        self.file
            .section_mut(section)
            .insert(key.to_string(), record.clone());
        self.save()?;
        Ok(record)
    }

    /// Applies `update` to the record of `key` and persists the ledger
    pub fn update<F>(
        &mut self,
        section: LedgerSection,
        key: &str,
        update: F,
    ) -> Result<DeploymentRecord, ScriptError>
    where
        F: FnOnce(&mut DeploymentRecord) -> Result<(), LedgerError>,
    {
        let record = self
            .file
            .section_mut(section)
            .get_mut(key)
            .ok_or_else(|| ScriptError::NotDeployed(format!("{section}.{key} is not recorded")))?;
        update(record)?;
        let record = record.clone();

        self.save()?;
        Ok(record)
    }

    /// Writes the ledger to its file
    pub fn save(&self) -> Result<(), ScriptError> {
        let mut json = serde_json::to_string_pretty(&self.file)
            .map_err(|e| ScriptError::WriteFile(e.to_string()))?;
        json.push('\n');
        write_atomic(&self.path, &json)
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, B256};
    use governor_common::ledger::DeploymentStatus;
    use tempfile::tempdir;

    use crate::errors::ScriptError;

    use super::{Ledger, LedgerSection};

    const KEY: &str = "OZGovernorModule@1.0.0";

    #[test]
    fn test_records_survive_reopening() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sepolia.json");
        let address = Address::repeat_byte(0x11);
        let tx_hash = B256::repeat_byte(0x22);

        let mut ledger = Ledger::open(&path, 11155111).unwrap();
        ledger
            .begin(LedgerSection::Mastercopies, KEY, address, B256::ZERO)
            .unwrap();
        ledger
            .update(LedgerSection::Mastercopies, KEY, |r| r.mark_pending(KEY, tx_hash))
            .unwrap();

        let reopened = Ledger::open(&path, 11155111).unwrap();
        let record = reopened.get(LedgerSection::Mastercopies, KEY).unwrap();
        assert_eq!(record.status, DeploymentStatus::Pending);
        assert_eq!(record.pending_tx(), Some(tx_hash));
        assert_eq!(record.address, address);
        assert!(reopened.get(LedgerSection::Proxies, KEY).is_none());
    }

    #[test]
    fn test_conflicting_fingerprint() {
        let dir = tempdir().unwrap();
        let mut ledger = Ledger::open(&dir.path().join("hardhat.json"), 31337).unwrap();

        ledger
            .begin(LedgerSection::Proxies, "governor", Address::ZERO, B256::ZERO)
            .unwrap();
        let res = ledger.begin(
            LedgerSection::Proxies,
            "governor",
            Address::ZERO,
            B256::repeat_byte(1),
        );

        assert!(matches!(res, Err(ScriptError::Conflict(_))));
    }

    #[test]
    fn test_chain_id_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gnosis.json");
        Ledger::open(&path, 100).unwrap().save().unwrap();

        assert!(matches!(
            Ledger::open(&path, 137),
            Err(ScriptError::Configuration(_))
        ));
    }

    #[test]
    fn test_invalid_transition_is_rejected() {
        let dir = tempdir().unwrap();
        let mut ledger = Ledger::open(&dir.path().join("hardhat.json"), 31337).unwrap();
        ledger
            .begin(LedgerSection::Contracts, "ERC20Votes", Address::ZERO, B256::ZERO)
            .unwrap();

        let res = ledger.update(LedgerSection::Contracts, "ERC20Votes", |r| {
            r.mark_verified("ERC20Votes", None)
        });
        assert!(res.is_err());
        assert_eq!(
            ledger
                .get(LedgerSection::Contracts, "ERC20Votes")
                .unwrap()
                .status,
            DeploymentStatus::NotDeployed
        );
    }
}
