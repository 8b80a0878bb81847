//! Addresses, byte layouts, and default values shared by the deployment
//! scripts and the integration tests

use alloy_primitives::{address, b256, hex, Address, B256};

/// The ERC-2470 singleton factory through which mastercopies are deployed
/// deterministically.
///
/// See https://eips.ethereum.org/EIPS/eip-2470
pub const SINGLETON_FACTORY_ADDRESS: Address = address!("ce0042B868300000d44A59004Da54A005ffdcf9f");

/// The canonical Zodiac `ModuleProxyFactory`, deployed at the same address on
/// every supported chain
pub const MODULE_PROXY_FACTORY_ADDRESS: Address =
    address!("000000000000aDdB49795b0f9bA5BC298cDda236");

/// The placeholder address used for mastercopy constructor arguments, so that
/// mastercopies can never be used directly
pub const ADDRESS_ONE: Address = address!("0000000000000000000000000000000000000001");

/// The salt used for mastercopy deployments unless another one is requested
pub const DEFAULT_MASTERCOPY_SALT: B256 =
    b256!("0000000000000000000000000000000000000000000000000000000000000000");

/// The creation code of an EIP-1167 minimal proxy preceding the mastercopy address
pub const MINIMAL_PROXY_PREFIX: [u8; 19] = hex!("602d8060093d393df3363d3d373d3d3d363d73");

/// The creation code of an EIP-1167 minimal proxy following the mastercopy address
pub const MINIMAL_PROXY_SUFFIX: [u8; 15] = hex!("5af43d82803e903d91602b57fd5bf3");

/// The prefix byte of a CREATE2 address preimage
pub const CREATE2_PREFIX: u8 = 0xff;

/// The number of bytes it takes to represent an Ethereum address
pub const NUM_BYTES_ADDRESS: usize = 20;

/// The number of bytes it takes to represent an unsigned 256-bit integer
pub const NUM_BYTES_U256: usize = 32;

/// The number of hex characters in a library placeholder in unlinked bytecode
pub const LIBRARY_PLACEHOLDER_HEX_LEN: usize = NUM_BYTES_ADDRESS * 2;

/// The Solidity source file extension, used to locate Hardhat artifact directories
pub const SOLIDITY_EXTENSION: &str = "sol";

/// The suffix of the Hardhat debug file pointing at a contract's build info
pub const DEBUG_FILE_SUFFIX: &str = ".dbg.json";

/// The name of the Hardhat directory holding build info files
pub const BUILD_INFO_DIR: &str = "build-info";

/// The AST node type of a Solidity import directive
pub const IMPORT_DIRECTIVE_NODE_TYPE: &str = "ImportDirective";
