//! Request and response types of the Etherscan-compatible verification API

use alloy::primitives::hex;
use governor_common::mastercopy::MastercopyArtifact;
use serde::{Deserialize, Serialize};

use crate::errors::ScriptError;

/// The API module a request is addressed to
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiModule {
    /// Contract source and ABI endpoints
    Contract,
}

/// The API action of a request
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiAction {
    /// Fetch the ABI of a verified contract
    GetAbi,
    /// Submit a source verification
    VerifySourceCode,
    /// Check the status of a submitted verification
    CheckVerifyStatus,
}

/// The query parameters common to every request
#[derive(Debug, Clone, Serialize)]
pub struct ApiRequest<'a> {
    /// The API key
    pub apikey: &'a str,
    /// The module
    pub module: ApiModule,
    /// The action
    pub action: ApiAction,
    /// The chain the request is about, selecting the explorer on the V2 API
    pub chainid: u64,
}

/// The envelope every API response is wrapped in
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponseRaw {
    /// `"1"` on success, `"0"` on failure
    pub status: String,
    /// A short status message
    pub message: String,
    /// The payload, or the error description
    pub result: String,
}

/// The format of the submitted source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CodeFormat {
    /// The solc standard JSON input
    #[serde(rename = "solidity-standard-json-input")]
    StandardJsonInput,
}

/// A source verification submission.
///
/// The field names follow the API, misspelling included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EtherscanVerificationRequest {
    /// The source code format
    #[serde(rename = "codeformat")]
    pub code_format: CodeFormat,
    /// The serialized compiler input
    #[serde(rename = "sourceCode")]
    pub source_code: String,
    /// The deployed address
    #[serde(rename = "contractaddress")]
    pub contract_address: String,
    /// The fully qualified contract name
    #[serde(rename = "contractname")]
    pub contract_name: String,
    /// The full compiler version, e.g. `v0.8.20+commit.a1b79de6`
    #[serde(rename = "compilerversion")]
    pub compiler_version: String,
    /// The encoded constructor arguments, hex without prefix
    #[serde(rename = "constructorArguements")]
    pub constructor_arguments: String,
}

impl EtherscanVerificationRequest {
    /// The submission verifying a deployed mastercopy
    pub fn for_mastercopy(artifact: &MastercopyArtifact) -> Result<Self, ScriptError> {
        let input = artifact.verification_input()?;
        let source_code =
            serde_json::to_string(&input).map_err(|e| ScriptError::Verification(e.to_string()))?;

        Ok(Self {
            code_format: CodeFormat::StandardJsonInput,
            source_code,
            contract_address: artifact.address.to_string(),
            contract_name: artifact.fully_qualified_name(),
            compiler_version: artifact.compiler_version.clone(),
            constructor_arguments: hex::encode(artifact.encoded_constructor_args()?),
        })
    }
}
