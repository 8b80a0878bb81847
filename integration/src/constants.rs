//! Constants used in the integration tests

/// The default private key for the tests, the first default account of an
/// Anvil or Hardhat node
pub(crate) const DEFAULT_PKEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// The default RPC URL of the development node
pub(crate) const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// The default directory holding the Hardhat build artifacts
pub(crate) const DEFAULT_ARTIFACTS_DIR: &str = "../build/artifacts";

/// The name the test tokens are deployed with
pub(crate) const TOKEN_NAME: &str = "Token";

/// The symbol the test tokens are deployed with
pub(crate) const TOKEN_SYMBOL: &str = "TKN";

/// The name the test governor is deployed with
pub(crate) const GOVERNOR_NAME: &str = "Test Governor";

/// The governor parameters (voting delay, voting period, proposal threshold,
/// quorum, late quorum vote extension) of the test governor
pub(crate) const GOVERNOR_PARAMS: [u64; 5] = [0, 60, 0, 1, 10];

/// The salt nonce of the proxies deployed in the tests
pub(crate) const SALT_NONCE: u64 = 0xfa;

/// The number of blocks mined to close a vote
pub(crate) const VOTING_BLOCKS: usize = 100;

/// The amount of governance tokens minted to the test wallet
pub(crate) const INITIAL_SUPPLY: u64 = 1_000_000;

/// The amount of tokens held by the avatar
pub(crate) const AVATAR_BALANCE: u64 = 100_000;

/// The amount of tokens held by the governor module
pub(crate) const MODULE_BALANCE: u64 = 5_000;

/// The amount transferred by each proposed transaction
pub(crate) const PROPOSAL_TRANSFER: u64 = 42;

/// The revert reason of a second `setUp` call
pub(crate) const ALREADY_INITIALIZED: &str = "Initializable: contract is already initialized";
