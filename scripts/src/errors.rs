//! Definitions of errors that can occur during the execution of the deployment scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use governor_common::errors::{ArtifactError, EncodingError, LedgerError};

/// Errors that can occur during the execution of the deployment scripts
#[derive(Debug)]
pub enum ScriptError {
    /// Missing or invalid configuration, raised before any network call
    Configuration(String),
    /// Error reading a file
    ReadFile(String),
    /// Error writing a file
    WriteFile(String),
    /// Error parsing a compilation artifact
    ArtifactParsing(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error constructing calldata for a contract method
    CalldataConstruction(String),
    /// A linked library has no address bound or no code on chain
    MissingLibrary(String),
    /// The deployment factory has no code on chain
    MissingFactory(String),
    /// A transaction or call reverted, with the decoded revert reason
    Revert(String),
    /// Error communicating with the RPC node
    Transport(String),
    /// An operation did not complete in time
    Timeout(String),
    /// A remote service rejected the request for exceeding its rate limit
    RateLimited(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// A deployment step was already recorded with different inputs
    Conflict(String),
    /// The contract is not deployed on the network
    NotDeployed(String),
    /// Error submitting or checking a source verification
    Verification(String),
    /// The block explorer could not match the source to the deployed bytecode
    VerificationMismatch(String),
    /// The operator interrupted the run
    Aborted,
}

impl ScriptError {
    /// Whether the error is transient, such that the operation may be retried
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ScriptError::Transport(_) | ScriptError::Timeout(_) | ScriptError::RateLimited(_)
        )
    }
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Configuration(s) => write!(f, "invalid configuration: {}", s),
            ScriptError::ReadFile(s) => write!(f, "error reading file: {}", s),
            ScriptError::WriteFile(s) => write!(f, "error writing file: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::MissingLibrary(s) => write!(f, "missing library: {}", s),
            ScriptError::MissingFactory(s) => write!(f, "missing factory: {}", s),
            ScriptError::Revert(s) => write!(f, "execution reverted: {}", s),
            ScriptError::Transport(s) => write!(f, "rpc error: {}", s),
            ScriptError::Timeout(s) => write!(f, "timed out: {}", s),
            ScriptError::RateLimited(s) => write!(f, "rate limited: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::Conflict(s) => write!(f, "deployment conflict: {}", s),
            ScriptError::NotDeployed(s) => write!(f, "not deployed: {}", s),
            ScriptError::Verification(s) => write!(f, "error verifying contract: {}", s),
            ScriptError::VerificationMismatch(s) => {
                write!(f, "source does not match deployed bytecode: {}", s)
            }
            ScriptError::Aborted => write!(f, "aborted by operator"),
        }
    }
}

impl Error for ScriptError {}

impl From<ArtifactError> for ScriptError {
    fn from(e: ArtifactError) -> Self {
        match e {
            ArtifactError::ReadFile(s) => ScriptError::ReadFile(s),
            ArtifactError::MissingLibrary(s) => ScriptError::MissingLibrary(s),
            ArtifactError::Encoding(e) => ScriptError::CalldataConstruction(e.to_string()),
            e => ScriptError::ArtifactParsing(e.to_string()),
        }
    }
}

impl From<EncodingError> for ScriptError {
    fn from(e: EncodingError) -> Self {
        ScriptError::CalldataConstruction(e.to_string())
    }
}

impl From<LedgerError> for ScriptError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::Conflict { .. } => ScriptError::Conflict(e.to_string()),
            LedgerError::InvalidTransition { .. } => ScriptError::ContractDeployment(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use governor_common::errors::{ArtifactError, EncodingError, LedgerError};

    use super::ScriptError;

    #[test]
    fn test_retryable_classification() {
        assert!(ScriptError::Transport("connection reset".into()).is_retryable());
        assert!(ScriptError::Timeout("receipt".into()).is_retryable());
        assert!(ScriptError::RateLimited("max rate limit reached".into()).is_retryable());

        assert!(!ScriptError::Revert("TakenAddress".into()).is_retryable());
        assert!(!ScriptError::VerificationMismatch("Fail - Unable to verify".into()).is_retryable());
        assert!(!ScriptError::Configuration("missing key".into()).is_retryable());
        assert!(!ScriptError::Aborted.is_retryable());
    }

    #[test]
    fn test_artifact_error_conversion() {
        let missing: ScriptError = ArtifactError::MissingLibrary("MultisendEncoder".into()).into();
        assert!(matches!(missing, ScriptError::MissingLibrary(_)));

        let encoding: ScriptError = ArtifactError::Encoding(EncodingError::InvalidType("foo".into())).into();
        assert!(matches!(encoding, ScriptError::CalldataConstruction(_)));
    }

    #[test]
    fn test_ledger_conflict_conversion() {
        let err: ScriptError = LedgerError::Conflict {
            key: "governor".into(),
            recorded: "0x01".into(),
            requested: "0x02".into(),
        }
        .into();
        assert!(matches!(err, ScriptError::Conflict(_)));
    }
}
