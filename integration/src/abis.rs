//! Solidity ABI definitions for the contracts used in integration tests

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use alloy::{network::Ethereum, providers::DynProvider, sol};

sol! {
    #[sol(rpc)]
    interface IERC20Votes {
        function owner() external view returns (address);
        function name() external view returns (string);
        function symbol() external view returns (string);
        function balanceOf(address account) external view returns (uint256);
        function paused() external view returns (bool);

        function setUp(bytes initializeParams) external;
        function mint(address to, uint256 amount) external;
        function burn(uint256 amount) external;
        function transfer(address to, uint256 amount) external returns (bool);
        function delegate(address delegatee) external;
        function pause() external;
        function unpause() external;
        function transferOwnership(address newOwner) external;
    }
}

sol! {
    #[sol(rpc)]
    interface IERC721Votes {
        function owner() external view returns (address);
        function name() external view returns (string);
        function symbol() external view returns (string);
        function balanceOf(address owner) external view returns (uint256);
        function paused() external view returns (bool);
        function supportsInterface(bytes4 interfaceId) external view returns (bool);

        function setUp(bytes initializeParams) external;
        function safeMint(address to) external;
        function burn(uint256 tokenId) external;
        function pause() external;
        function unpause() external;
    }
}

sol! {
    #[sol(rpc)]
    interface IOZGovernorModule {
        function owner() external view returns (address);
        function target() external view returns (address);
        function multisend() external view returns (address);
        function token() external view returns (address);
        function name() external view returns (string);
        function votingDelay() external view returns (uint256);
        function votingPeriod() external view returns (uint256);
        function proposalThreshold() external view returns (uint256);
        function lateQuorumVoteExtension() external view returns (uint64);
        function quorum(uint256 blockNumber) external view returns (uint256);

        function setUp(bytes initializeParams) external;
        function propose(address[] targets, uint256[] values, bytes[] calldatas, string description) external returns (uint256);
        function castVote(uint256 proposalId, uint8 support) external returns (uint256);
        function execute(address[] targets, uint256[] values, bytes[] calldatas, bytes32 descriptionHash) external payable returns (uint256);
    }
}

sol! {
    #[sol(rpc)]
    interface ITestMultisendEncoder {
        function encodeMultisend(address multisend, address[] targets, uint256[] values, bytes[] calldatas)
            external
            view
            returns (address to, uint256 value, bytes data, uint8 operation);
    }
}

sol! {
    #[sol(rpc)]
    interface ITestAvatar {
        function module() external view returns (address);
        function enableModule(address module) external;
    }
}

pub use IERC20Votes::IERC20VotesInstance;
pub use IERC721Votes::IERC721VotesInstance;
pub use IOZGovernorModule::IOZGovernorModuleInstance;
pub use ITestMultisendEncoder::ITestMultisendEncoderInstance;

/// An ERC20 voting token bound to the test client
pub type Erc20Votes = IERC20VotesInstance<(), DynProvider, Ethereum>;
/// An ERC721 voting token bound to the test client
pub type Erc721Votes = IERC721VotesInstance<(), DynProvider, Ethereum>;
/// A governor module bound to the test client
pub type GovernorModule = IOZGovernorModuleInstance<(), DynProvider, Ethereum>;
/// The multisend encoder test harness bound to the test client
pub type TestMultisendEncoder = ITestMultisendEncoderInstance<(), DynProvider, Ethereum>;
