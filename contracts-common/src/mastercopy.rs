//! The persisted mastercopy artifact.
//!
//! A mastercopy artifact captures everything needed to reproduce a
//! deterministic deployment and to verify it afterwards: the linked bytecode,
//! the constructor arguments, the salt, and the minimal compiler input. The
//! artifacts are kept in a single JSON file keyed by contract name then
//! version, serialized with ordered maps so that re-extracting the same
//! contract yields byte-identical output.

use std::{
    cmp::Ordering,
    collections::BTreeMap,
    fs,
    path::Path,
};

use alloy_primitives::{keccak256, Address, Bytes, B256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    abi_args::AbiArgs,
    artifacts::{BuildArtifact, BuildInfo, CompilerInput},
    create2::create2_address,
    errors::ArtifactError,
};

/// A mastercopy ready for deterministic deployment and verification
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MastercopyArtifact {
    /// The contract name
    pub contract_name: String,
    /// The version of the contracts package the mastercopy was built from
    pub contract_version: String,
    /// The source file defining the contract
    pub source_name: String,
    /// The CREATE2 factory the mastercopy is deployed through
    pub factory: Address,
    /// The predicted mastercopy address
    pub address: Address,
    /// The linked creation bytecode, without constructor arguments
    pub bytecode: Bytes,
    /// The constructor arguments
    pub constructor_args: AbiArgs,
    /// The CREATE2 salt
    pub salt: B256,
    /// The library addresses the bytecode is linked against
    #[serde(default)]
    pub libraries: BTreeMap<String, Address>,
    /// The full compiler version, prefixed with `v`
    pub compiler_version: String,
    /// The minimal compiler input reproducing the bytecode
    pub compiler_input: CompilerInput,
    /// The contract ABI
    pub abi: Value,
}

/// The inputs of a mastercopy extraction besides the build output itself
#[derive(Clone, Debug)]
pub struct ExtractionParams {
    /// The version to record the mastercopy under
    pub contract_version: String,
    /// The constructor arguments
    pub constructor_args: AbiArgs,
    /// The CREATE2 salt
    pub salt: B256,
    /// The CREATE2 factory
    pub factory: Address,
    /// The library addresses to link against
    pub libraries: BTreeMap<String, Address>,
}

impl MastercopyArtifact {
    /// Packages a compiled contract into a mastercopy artifact
    pub fn from_build(
        artifact: &BuildArtifact,
        build_info: &BuildInfo,
        params: ExtractionParams,
    ) -> Result<Self, ArtifactError> {
        let bytecode = artifact.link(&params.libraries)?;
        let compiler_input = build_info.minimal_compiler_input(&artifact.source_name)?;

        // Only keep the libraries the bytecode actually references
        let required = artifact.library_names();
        let libraries = params
            .libraries
            .into_iter()
            .filter(|(name, _)| {
                let short = name.rsplit(':').next().unwrap_or(name);
                required.contains(short)
            })
            .collect();

        let mut mastercopy = Self {
            contract_name: artifact.contract_name.clone(),
            contract_version: params.contract_version,
            source_name: artifact.source_name.clone(),
            factory: params.factory,
            address: Address::ZERO,
            bytecode: bytecode.into(),
            constructor_args: params.constructor_args,
            salt: params.salt,
            libraries,
            compiler_version: format!("v{}", build_info.solc_long_version),
            compiler_input,
            abi: artifact.abi.clone(),
        };
        mastercopy.address = mastercopy.predicted_address()?;

        Ok(mastercopy)
    }

    /// The ABI-encoded constructor arguments
    pub fn encoded_constructor_args(&self) -> Result<Vec<u8>, ArtifactError> {
        Ok(self.constructor_args.encode()?)
    }

    /// The creation bytecode followed by the encoded constructor arguments
    pub fn init_code(&self) -> Result<Vec<u8>, ArtifactError> {
        let mut init_code = self.bytecode.to_vec();
        init_code.extend(self.encoded_constructor_args()?);
        Ok(init_code)
    }

    /// The address the factory deploys the init code at
    pub fn predicted_address(&self) -> Result<Address, ArtifactError> {
        let init_code_hash = keccak256(self.init_code()?);
        Ok(create2_address(self.factory, self.salt, init_code_hash))
    }

    /// Identifies the deployment inputs: the factory, the salt, and the init code
    pub fn fingerprint(&self) -> Result<B256, ArtifactError> {
        let mut preimage = self.factory.to_vec();
        preimage.extend_from_slice(self.salt.as_slice());
        preimage.extend_from_slice(keccak256(self.init_code()?).as_slice());
        Ok(keccak256(preimage))
    }

    /// The `<sourceName>:<contractName>` identifier used by block explorers
    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }

    /// The key of the mastercopy in a deployments ledger
    pub fn ledger_key(&self) -> String {
        format!("{}@{}", self.contract_name, self.contract_version)
    }

    /// The compiler input with the linked library addresses set in
    /// `settings.libraries`, as block explorers expect them. Library keys
    /// must be fully qualified (`<sourceName>:<name>`).
    pub fn verification_input(&self) -> Result<CompilerInput, ArtifactError> {
        let mut input = self.compiler_input.clone();
        if self.libraries.is_empty() {
            return Ok(input);
        }

        let mut libraries = serde_json::Map::new();
        for (key, address) in &self.libraries {
            let (source, name) = key
                .rsplit_once(':')
                .ok_or_else(|| ArtifactError::MissingLibrary(format!("{key} is not fully qualified")))?;

            let entry = libraries
                .entry(source.to_string())
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            if let Value::Object(by_name) = entry {
                by_name.insert(name.to_string(), Value::String(address.to_string()));
            }
        }

        match &mut input.settings {
            Value::Object(settings) => {
                settings.insert("libraries".to_string(), Value::Object(libraries));
            }
            _ => {
                return Err(ArtifactError::Parsing(
                    "compiler settings are not an object".to_string(),
                ))
            }
        }

        Ok(input)
    }
}

/// Compares dotted version strings component-wise, numerically where possible
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut a_parts = a.split(['.', '-', '+']);
    let mut b_parts = b.split(['.', '-', '+']);

    loop {
        match (a_parts.next(), b_parts.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    _ => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

/// The mastercopy artifacts file, keyed by contract name then version
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MastercopiesFile {
    /// The artifacts
    pub mastercopies: BTreeMap<String, BTreeMap<String, MastercopyArtifact>>,
}

impl MastercopiesFile {
    /// Loads the artifacts file, treating a missing file as empty
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ArtifactError::ReadFile(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&contents)
            .map_err(|e| ArtifactError::Parsing(format!("{}: {e}", path.display())))
    }

    /// Serializes the artifacts as pretty JSON terminated by a newline
    pub fn to_json(&self) -> Result<String, ArtifactError> {
        let mut json = serde_json::to_string_pretty(self)
            .map_err(|e| ArtifactError::Parsing(e.to_string()))?;
        json.push('\n');
        Ok(json)
    }

    /// Records an artifact, replacing any previous artifact for the same
    /// contract and version
    pub fn insert(&mut self, artifact: MastercopyArtifact) {
        self.mastercopies
            .entry(artifact.contract_name.clone())
            .or_default()
            .insert(artifact.contract_version.clone(), artifact);
    }

    /// Gets the artifact of `contract_name` at `version`, or at the latest
    /// version when none is given
    pub fn get(
        &self,
        contract_name: &str,
        version: Option<&str>,
    ) -> Result<&MastercopyArtifact, ArtifactError> {
        let missing = || {
            ArtifactError::MissingMastercopy(match version {
                Some(v) => format!("{contract_name}@{v}"),
                None => contract_name.to_string(),
            })
        };

        let versions = self.mastercopies.get(contract_name).ok_or_else(missing)?;
        match version {
            Some(v) => versions.get(v).ok_or_else(missing),
            None => versions
                .iter()
                .max_by(|(a, _), (b, _)| compare_versions(a, b))
                .map(|(_, artifact)| artifact)
                .ok_or_else(missing),
        }
    }
}
