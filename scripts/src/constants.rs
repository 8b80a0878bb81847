//! Constants used in the deploy scripts

use std::time::Duration;

/// The development mnemonic used when neither a private key nor a mnemonic is configured
pub const DEFAULT_MNEMONIC: &str =
    "candy maple cake sugar pudding cream honey rich smooth crumble sweet treat";

/// The environment variable holding the deployer's private key
pub const PRIVATE_KEY_ENV_VAR: &str = "PRIVATE_KEY";

/// The environment variable holding the deployer's mnemonic
pub const MNEMONIC_ENV_VAR: &str = "MNEMONIC";

/// The environment variable holding the Infura project key
pub const INFURA_KEY_ENV_VAR: &str = "INFURA_KEY";

/// The environment variable holding the block explorer API key
pub const ETHERSCAN_API_KEY_ENV_VAR: &str = "ETHERSCAN_API_KEY";

/// The placeholder substituted with the Infura key in RPC URLs
pub const INFURA_KEY_PLACEHOLDER: &str = "{INFURA_KEY}";

/// The Etherscan V2 multichain API endpoint
pub const ETHERSCAN_V2_API_URL: &str = "https://api.etherscan.io/v2/api";

/// The default directory holding the Hardhat build artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "build/artifacts";

/// The default directory holding the zksolc build artifacts
pub const DEFAULT_ZKSYNC_ARTIFACTS_DIR: &str = "artifacts-zk";

/// The default path of the mastercopy artifacts file
pub const DEFAULT_MASTERCOPIES_FILE: &str = "mastercopies.json";

/// The default directory holding the per-network deployment ledgers
pub const DEFAULT_DEPLOYMENTS_DIR: &str = "deployments";

/// The package manifest from which the contract version is read
pub const PACKAGE_JSON_FILE: &str = "package.json";

/// The extension of JSON files
pub const JSON_EXTENSION: &str = "json";

/// The suffix of the temporary file a ledger is written to before being renamed
pub const TMP_FILE_SUFFIX: &str = "tmp";

// --- Transactions --- //

/// The number of times the receipt of a submitted transaction is polled for
pub const RECEIPT_POLL_ATTEMPTS: usize = 120;

/// The delay between two receipt polls
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// The HTTP status of a rate limited request
pub const HTTP_TOO_MANY_REQUESTS: u16 = 429;

/// The default number of attempts for a retried network operation
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// The default delay before the first retry
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// The default upper bound on the delay between retries
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(30);

/// The default timeout of a single attempt of a network operation
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(60);

// --- Verification --- //

/// The number of times a verification status is polled for
pub const VERIFICATION_POLL_ATTEMPTS: usize = 20;

/// The delay between two verification status polls
pub const VERIFICATION_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// The timeout for establishing a connection to the block explorer
pub const EXPLORER_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// The total timeout of a block explorer request
pub const EXPLORER_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// --- Mastercopy placeholders --- //

/// The name the governor mastercopy is constructed with
pub const GOVERNOR_MASTERCOPY_NAME: &str = "OZGovernorModule";

/// The governor parameters (voting delay, voting period, proposal threshold,
/// quorum, late quorum vote extension) the mastercopy is constructed with
pub const GOVERNOR_MASTERCOPY_PARAMS: [u64; 5] = [1, 1, 1, 1, 1];

/// The governor parameters the zkSync deployment is constructed with
pub const GOVERNOR_ZKSYNC_PARAMS: [u64; 5] = [0, 100, 0, 10, 0];
