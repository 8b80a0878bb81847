//! Reading and linking Hardhat build output.
//!
//! A compiled contract is laid out as
//! - `<artifacts>/<sourceName>/<Contract>.json`: the ABI, unlinked bytecode and
//!   link references
//! - `<artifacts>/<sourceName>/<Contract>.dbg.json`: a pointer to the build info
//! - `<artifacts>/build-info/<id>.json`: the full compiler input and output

use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    fs,
    path::{Path, PathBuf},
};

use alloy_primitives::{hex, Address};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{
    constants::{
        BUILD_INFO_DIR, DEBUG_FILE_SUFFIX, IMPORT_DIRECTIVE_NODE_TYPE, LIBRARY_PLACEHOLDER_HEX_LEN,
        SOLIDITY_EXTENSION,
    },
    errors::ArtifactError,
};

/// The location of a library placeholder in unlinked bytecode, in bytes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReference {
    /// The byte offset of the placeholder
    pub start: usize,
    /// The byte length of the placeholder
    pub length: usize,
}

/// Library placeholders, keyed by library source file then library name
pub type LinkReferences = BTreeMap<String, BTreeMap<String, Vec<LinkReference>>>;

/// A contract artifact as emitted by Hardhat
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildArtifact {
    /// The contract name
    pub contract_name: String,
    /// The source file defining the contract
    pub source_name: String,
    /// The contract ABI
    pub abi: Value,
    /// The unlinked creation bytecode, hex encoded
    pub bytecode: String,
    /// The library placeholders in the bytecode
    #[serde(default)]
    pub link_references: LinkReferences,
}

impl BuildArtifact {
    /// The names of the libraries the bytecode must be linked against
    pub fn library_names(&self) -> BTreeSet<String> {
        self.link_references
            .values()
            .flat_map(|libs| libs.keys().cloned())
            .collect()
    }

    /// Links the bytecode against the given library addresses
    pub fn link(&self, libraries: &BTreeMap<String, Address>) -> Result<Vec<u8>, ArtifactError> {
        link_bytecode(&self.bytecode, &self.link_references, libraries)
    }
}

/// Replaces every library placeholder in `bytecode` with the bound library
/// address and decodes the result.
///
/// Libraries are looked up by name, or by `<source>:<name>`.
pub fn link_bytecode(
    bytecode: &str,
    link_references: &LinkReferences,
    libraries: &BTreeMap<String, Address>,
) -> Result<Vec<u8>, ArtifactError> {
    let mut code = bytecode
        .strip_prefix("0x")
        .unwrap_or(bytecode)
        .to_string();
    if !code.is_ascii() {
        return Err(ArtifactError::Parsing("bytecode is not hex".to_string()));
    }

    for (source, libs) in link_references {
        for (name, refs) in libs {
            let library = libraries
                .get(name)
                .or_else(|| libraries.get(&format!("{source}:{name}")))
                .ok_or_else(|| ArtifactError::MissingLibrary(format!("{source}:{name}")))?;
            let address_hex = hex::encode(library.as_slice());

            for LinkReference { start, length } in refs {
                let invalid = || {
                    ArtifactError::Parsing(format!(
                        "invalid link reference for {name} at offset {start}"
                    ))
                };
                let from = start.checked_mul(2).ok_or_else(invalid)?;
                let to = start
                    .checked_add(*length)
                    .and_then(|end| end.checked_mul(2))
                    .ok_or_else(invalid)?;
                if to - from != LIBRARY_PLACEHOLDER_HEX_LEN || to > code.len() {
                    return Err(invalid());
                }

                code.replace_range(from..to, &address_hex);
            }
        }
    }

    hex::decode(&code).map_err(|e| ArtifactError::Parsing(e.to_string()))
}

/// The Hardhat debug file sitting next to a contract artifact
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebugFile {
    /// The build info path, relative to the debug file's directory
    build_info: String,
}

/// A single source file in a compiler input
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceContent {
    /// The file contents
    pub content: String,
}

/// The solc standard JSON input
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompilerInput {
    /// The source language
    pub language: String,
    /// The source files, keyed by path
    pub sources: BTreeMap<String, SourceContent>,
    /// The compiler settings
    pub settings: Value,
}

/// The per-source section of the solc output
#[derive(Clone, Debug, Deserialize)]
pub struct OutputSource {
    /// The source unit AST
    pub ast: Value,
}

/// The parts of the solc standard JSON output used to resolve imports
#[derive(Clone, Debug, Deserialize)]
pub struct CompilerOutput {
    /// The per-source output, keyed by path
    pub sources: BTreeMap<String, OutputSource>,
}

/// A Hardhat build info file
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    /// The full compiler version, e.g. `0.8.20+commit.a1b79de6`
    pub solc_long_version: String,
    /// The compiler input
    pub input: CompilerInput,
    /// The compiler output
    pub output: CompilerOutput,
}

impl BuildInfo {
    /// The paths imported, directly or transitively, by `source_name`,
    /// including `source_name` itself
    pub fn import_closure(&self, source_name: &str) -> Result<BTreeSet<String>, ArtifactError> {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([source_name.to_string()]);

        while let Some(path) = queue.pop_front() {
            if !visited.insert(path.clone()) {
                continue;
            }

            let source = self.output.sources.get(&path).ok_or_else(|| {
                ArtifactError::Parsing(format!("no compiler output for source {path}"))
            })?;
            queue.extend(
                direct_imports(&source.ast)
                    .into_iter()
                    .filter(|import| !visited.contains(import)),
            );
        }

        Ok(visited)
    }

    /// The compiler input reduced to the sources needed to compile `source_name`.
    /// The settings are kept as is.
    pub fn minimal_compiler_input(&self, source_name: &str) -> Result<CompilerInput, ArtifactError> {
        let sources = self
            .import_closure(source_name)?
            .into_iter()
            .map(|path| {
                let content = self.input.sources.get(&path).cloned().ok_or_else(|| {
                    ArtifactError::Parsing(format!("no compiler input for source {path}"))
                })?;
                Ok((path, content))
            })
            .collect::<Result<_, ArtifactError>>()?;

        Ok(CompilerInput {
            language: self.input.language.clone(),
            sources,
            settings: self.input.settings.clone(),
        })
    }
}

/// The absolute paths of the import directives at the top level of a source unit AST
fn direct_imports(ast: &Value) -> Vec<String> {
    ast.get("nodes")
        .and_then(Value::as_array)
        .map(|nodes| {
            nodes
                .iter()
                .filter(|node| {
                    node.get("nodeType").and_then(Value::as_str) == Some(IMPORT_DIRECTIVE_NODE_TYPE)
                })
                .filter_map(|node| node.get("absolutePath").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// A Hardhat artifacts directory
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    /// The root of the artifacts directory
    pub root: PathBuf,
}

impl ArtifactStore {
    /// Opens the artifacts directory at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Locates the artifact of `contract_name`, optionally restricted to the
    /// source file `source_name`
    pub fn find(
        &self,
        contract_name: &str,
        source_name: Option<&str>,
    ) -> Result<PathBuf, ArtifactError> {
        if let Some(source_name) = source_name {
            let path = self.root.join(source_name).join(format!("{contract_name}.json"));
            if !path.is_file() {
                return Err(ArtifactError::NotFound(format!("{source_name}:{contract_name}")));
            }
            return Ok(path);
        }

        let mut matches = Vec::new();
        collect_artifacts(&self.root, contract_name, &mut matches)?;
        match matches.len() {
            0 => Err(ArtifactError::NotFound(contract_name.to_string())),
            1 => Ok(matches.remove(0)),
            _ => Err(ArtifactError::Ambiguous(format!(
                "{contract_name} ({})",
                matches
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }

    /// Reads the artifact of `contract_name`
    pub fn read_artifact(
        &self,
        contract_name: &str,
        source_name: Option<&str>,
    ) -> Result<BuildArtifact, ArtifactError> {
        let path = self.find(contract_name, source_name)?;
        read_json(&path)
    }

    /// Reads the build info the artifact of `contract_name` was produced by
    pub fn read_build_info(
        &self,
        contract_name: &str,
        source_name: Option<&str>,
    ) -> Result<BuildInfo, ArtifactError> {
        let artifact_path = self.find(contract_name, source_name)?;
        let dir = artifact_path
            .parent()
            .ok_or_else(|| ArtifactError::NotFound(artifact_path.display().to_string()))?;

        let debug_path = dir.join(format!("{contract_name}{DEBUG_FILE_SUFFIX}"));
        let debug: DebugFile = read_json(&debug_path)?;
        read_json(&dir.join(debug.build_info))
    }
}

/// Recursively collects `<contract_name>.json` files under `*.sol` directories
fn collect_artifacts(
    dir: &Path,
    contract_name: &str,
    matches: &mut Vec<PathBuf>,
) -> Result<(), ArtifactError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| ArtifactError::ReadFile(format!("{}: {e}", dir.display())))?;

    for entry in entries {
        let path = entry
            .map_err(|e| ArtifactError::ReadFile(e.to_string()))?
            .path();
        if !path.is_dir() || path.file_name().is_some_and(|n| n == BUILD_INFO_DIR) {
            continue;
        }

        if path.extension().is_some_and(|ext| ext == SOLIDITY_EXTENSION) {
            let candidate = path.join(format!("{contract_name}.json"));
            if candidate.is_file() {
                matches.push(candidate);
            }
        }
        collect_artifacts(&path, contract_name, matches)?;
    }

    Ok(())
}

/// Reads and deserializes a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ArtifactError::ReadFile(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&contents)
        .map_err(|e| ArtifactError::Parsing(format!("{}: {e}", path.display())))
}
