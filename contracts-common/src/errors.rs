//! Definitions of errors that can occur while building deployment payloads

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors encoding ABI arguments or calldata
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// The number of types and values differ
    ArityMismatch {
        /// The number of declared types
        types: usize,
        /// The number of provided values
        values: usize,
    },
    /// A Solidity type could not be parsed
    InvalidType(String),
    /// A value could not be coerced into its declared type
    InvalidValue {
        /// The declared type
        ty: String,
        /// A description of the offending value
        value: String,
    },
}

impl Display for EncodingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EncodingError::ArityMismatch { types, values } => {
                write!(f, "expected {types} values for {types} types, got {values}")
            }
            EncodingError::InvalidType(ty) => write!(f, "invalid solidity type: {ty}"),
            EncodingError::InvalidValue { ty, value } => {
                write!(f, "value {value} is not a valid {ty}")
            }
        }
    }
}

impl Error for EncodingError {}

/// Errors encoding a batch of transactions for the multisend contract.
///
/// The variants mirror the custom errors of the on-chain `MultisendEncoder` library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultisendError {
    /// No transactions were provided
    NoTransactions,
    /// The targets, values, and calldatas differ in length
    UnequalArraysLengths,
}

impl Display for MultisendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MultisendError::NoTransactions => write!(f, "NoTransactions()"),
            MultisendError::UnequalArraysLengths => write!(f, "UnequalArraysLengths()"),
        }
    }
}

impl Error for MultisendError {}

/// Errors reading or linking build artifacts
#[derive(Debug)]
pub enum ArtifactError {
    /// Error reading a file
    ReadFile(String),
    /// Error parsing an artifact
    Parsing(String),
    /// No artifact was found for the contract
    NotFound(String),
    /// Several artifacts match the contract name
    Ambiguous(String),
    /// The bytecode references a library which has no address bound
    MissingLibrary(String),
    /// No mastercopy artifact has been extracted for the contract
    MissingMastercopy(String),
    /// Error encoding constructor arguments
    Encoding(EncodingError),
}

impl Display for ArtifactError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactError::ReadFile(s) => write!(f, "error reading file: {}", s),
            ArtifactError::Parsing(s) => write!(f, "error parsing artifact: {}", s),
            ArtifactError::NotFound(s) => write!(f, "no artifact found for {}", s),
            ArtifactError::Ambiguous(s) => write!(f, "multiple artifacts found for {}", s),
            ArtifactError::MissingLibrary(s) => write!(f, "no address bound for library {}", s),
            ArtifactError::MissingMastercopy(s) => {
                write!(f, "no mastercopy artifact extracted for {}", s)
            }
            ArtifactError::Encoding(e) => write!(f, "error encoding constructor args: {}", e),
        }
    }
}

impl Error for ArtifactError {}

impl From<EncodingError> for ArtifactError {
    fn from(e: EncodingError) -> Self {
        ArtifactError::Encoding(e)
    }
}

/// Errors moving a deployment record through its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The record exists with different deployment inputs
    Conflict {
        /// The key of the record
        key: String,
        /// The fingerprint already recorded
        recorded: String,
        /// The fingerprint of the requested deployment
        requested: String,
    },
    /// The requested status change is not allowed
    InvalidTransition {
        /// The key of the record
        key: String,
        /// The current status
        from: String,
        /// The requested status
        to: String,
    },
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::Conflict {
                key,
                recorded,
                requested,
            } => write!(
                f,
                "{key} was already deployed with different inputs (recorded {recorded}, requested {requested})"
            ),
            LedgerError::InvalidTransition { key, from, to } => {
                write!(f, "{key} cannot move from {from} to {to}")
            }
        }
    }
}

impl Error for LedgerError {}
