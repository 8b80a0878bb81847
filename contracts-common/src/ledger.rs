//! The deployment ledger state machine.
//!
//! Every deployment step (a mastercopy, a proxy, a zkSync contract) is tracked
//! by a record whose status only moves forward:
//!
//! ```text
//! NotDeployed -> Pending -> Deployed -> Verified
//!      \___________________^
//! ```
//!
//! Repeating a completed step is an idempotent no-op, and resubmitting a
//! pending step keeps it pending. Re-running a step with different inputs is a
//! conflict, detected through the record's fingerprint.

use std::fmt::{self, Display, Formatter};

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

/// The lifecycle status of a deployment step
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeploymentStatus {
    /// No transaction has been submitted
    #[default]
    NotDeployed,
    /// A transaction has been submitted but not confirmed
    Pending,
    /// The contract has code on chain
    Deployed,
    /// The contract source is verified on the block explorer
    Verified,
}

impl Display for DeploymentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentStatus::NotDeployed => write!(f, "not-deployed"),
            DeploymentStatus::Pending => write!(f, "pending"),
            DeploymentStatus::Deployed => write!(f, "deployed"),
            DeploymentStatus::Verified => write!(f, "verified"),
        }
    }
}

impl DeploymentStatus {
    /// Whether a record may move from `self` to `next`
    pub fn can_transition_to(self, next: DeploymentStatus) -> bool {
        use DeploymentStatus::*;
        matches!(
            (self, next),
            (NotDeployed, Pending)
                | (NotDeployed, Deployed)
                | (Pending, Pending)
                | (Pending, Deployed)
                | (Deployed, Deployed)
                | (Deployed, Verified)
                | (Verified, Verified)
        )
    }

    /// Whether the contract is known to have code on chain
    pub fn is_deployed(self) -> bool {
        self >= DeploymentStatus::Deployed
    }
}

/// The ledger record of a single deployment step
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// The (predicted or recovered) contract address
    pub address: Address,
    /// Identifies the inputs the contract was deployed with
    pub fingerprint: B256,
    /// The lifecycle status
    pub status: DeploymentStatus,
    /// The hash of the deployment transaction, once submitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<B256>,
    /// The block explorer verification id, once submitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_guid: Option<String>,
}

impl DeploymentRecord {
    /// A fresh record for a step that has not been run
    pub fn new(address: Address, fingerprint: B256) -> Self {
        Self {
            address,
            fingerprint,
            ..Default::default()
        }
    }

    /// Checks that the record was created for the same deployment inputs
    pub fn check_fingerprint(&self, key: &str, fingerprint: B256) -> Result<(), LedgerError> {
        if self.fingerprint != fingerprint {
            return Err(LedgerError::Conflict {
                key: key.to_string(),
                recorded: self.fingerprint.to_string(),
                requested: fingerprint.to_string(),
            });
        }

        Ok(())
    }

    /// Moves the record to `next`, rejecting transitions the lifecycle forbids
    pub fn transition(&mut self, key: &str, next: DeploymentStatus) -> Result<(), LedgerError> {
        if !self.status.can_transition_to(next) {
            return Err(LedgerError::InvalidTransition {
                key: key.to_string(),
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }

        self.status = next;
        Ok(())
    }

    /// Records a submitted deployment transaction
    pub fn mark_pending(&mut self, key: &str, tx_hash: B256) -> Result<(), LedgerError> {
        self.transition(key, DeploymentStatus::Pending)?;
        self.tx_hash = Some(tx_hash);
        Ok(())
    }

    /// The transaction of a step left pending by an interrupted run
    pub fn pending_tx(&self) -> Option<B256> {
        match (self.status, self.tx_hash) {
            (DeploymentStatus::Pending, Some(tx_hash)) => Some(tx_hash),
            _ => None,
        }
    }

    /// Records that the contract has code at `address`
    pub fn mark_deployed(&mut self, key: &str, address: Address) -> Result<(), LedgerError> {
        self.transition(key, DeploymentStatus::Deployed)?;
        self.address = address;
        Ok(())
    }

    /// Records a successful source verification
    pub fn mark_verified(&mut self, key: &str, guid: Option<String>) -> Result<(), LedgerError> {
        self.transition(key, DeploymentStatus::Verified)?;
        if guid.is_some() {
            self.verification_guid = guid;
        }
        Ok(())
    }

    /// Forgets a verification submission the explorer has settled without a match
    pub fn clear_verification(&mut self) {
        self.verification_guid = None;
    }
}
