//! Type definitions used throughout the deploy scripts

use std::fmt::{self, Display};

use alloy::primitives::Address;
use clap::ValueEnum;
use governor_common::{abi_args::AbiArgs, constants::ADDRESS_ONE};
use serde_json::{json, Value};

use crate::constants::{
    GOVERNOR_MASTERCOPY_NAME, GOVERNOR_MASTERCOPY_PARAMS, GOVERNOR_ZKSYNC_PARAMS,
};

/// The contracts deployed by the scripts
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum GovernorContract {
    /// The library packing multisend transactions
    #[value(alias = "MultisendEncoder")]
    MultisendEncoder,
    /// The ERC20 voting token
    #[value(name = "erc20-votes", alias = "ERC20Votes")]
    Erc20Votes,
    /// The ERC721 voting token
    #[value(name = "erc721-votes", alias = "ERC721Votes")]
    Erc721Votes,
    /// The governor module
    #[value(name = "oz-governor-module", alias = "OZGovernorModule")]
    OzGovernorModule,
}

impl GovernorContract {
    /// Every contract, libraries before the contracts linking them
    pub const ALL: [GovernorContract; 4] = [
        GovernorContract::MultisendEncoder,
        GovernorContract::Erc20Votes,
        GovernorContract::Erc721Votes,
        GovernorContract::OzGovernorModule,
    ];

    /// The Solidity contract name
    pub fn contract_name(&self) -> &'static str {
        match self {
            GovernorContract::MultisendEncoder => "MultisendEncoder",
            GovernorContract::Erc20Votes => "ERC20Votes",
            GovernorContract::Erc721Votes => "ERC721Votes",
            GovernorContract::OzGovernorModule => "OZGovernorModule",
        }
    }

    /// The constructor arguments of the mastercopy. Every address is the
    /// placeholder `0x..01` so that the mastercopy itself is inert.
    pub fn mastercopy_constructor_args(&self) -> AbiArgs {
        match self {
            GovernorContract::MultisendEncoder => AbiArgs::default(),
            GovernorContract::Erc20Votes | GovernorContract::Erc721Votes => {
                token_args(ADDRESS_ONE, "", "")
            }
            GovernorContract::OzGovernorModule => governor_args(
                ADDRESS_ONE,
                ADDRESS_ONE,
                GOVERNOR_MASTERCOPY_NAME,
                GOVERNOR_MASTERCOPY_PARAMS,
            ),
        }
    }

    /// The constructor arguments of the zkSync deployment, where the governor
    /// votes with the freshly deployed ERC20 token
    pub fn zksync_constructor_args(&self, erc20: Address) -> AbiArgs {
        match self {
            GovernorContract::MultisendEncoder => AbiArgs::default(),
            GovernorContract::Erc20Votes | GovernorContract::Erc721Votes => {
                token_args(ADDRESS_ONE, "", "")
            }
            GovernorContract::OzGovernorModule => {
                governor_args(ADDRESS_ONE, erc20, "", GOVERNOR_ZKSYNC_PARAMS)
            }
        }
    }
}

impl Display for GovernorContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.contract_name())
    }
}

/// `(owner, name, symbol)` of a voting token
fn token_args(owner: Address, name: &str, symbol: &str) -> AbiArgs {
    AbiArgs::new(
        ["address", "string", "string"],
        vec![json!(owner.to_string()), json!(name), json!(symbol)],
    )
}

/// `(owner, target, multisend, token, name, votingDelay, votingPeriod,
/// proposalThreshold, quorum, lateQuorumVoteExtension)` of the governor
fn governor_args(owner: Address, token: Address, name: &str, params: [u64; 5]) -> AbiArgs {
    let [voting_delay, voting_period, threshold, quorum, extension] = params;
    AbiArgs::new(
        [
            "address", "address", "address", "address", "string", "uint256", "uint256",
            "uint256", "uint256", "uint64",
        ],
        vec![
            json!(owner.to_string()),
            json!(ADDRESS_ONE.to_string()),
            json!(ADDRESS_ONE.to_string()),
            json!(token.to_string()),
            json!(name),
            Value::from(voting_delay),
            Value::from(voting_period),
            Value::from(threshold),
            Value::from(quorum),
            Value::from(extension),
        ],
    )
}

#[cfg(test)]
mod tests {
    use alloy::primitives::Address;
    use governor_common::constants::ADDRESS_ONE;

    use super::GovernorContract;

    #[test]
    fn test_dependency_order() {
        assert_eq!(GovernorContract::ALL[0], GovernorContract::MultisendEncoder);
        assert_eq!(GovernorContract::ALL[3], GovernorContract::OzGovernorModule);
    }

    #[test]
    fn test_mastercopy_args_encode() {
        for contract in GovernorContract::ALL {
            contract.mastercopy_constructor_args().encode().unwrap();
        }
        assert!(GovernorContract::MultisendEncoder
            .mastercopy_constructor_args()
            .is_empty());
    }

    #[test]
    fn test_zksync_governor_votes_with_erc20() {
        let erc20 = Address::repeat_byte(0x20);
        let encoded = GovernorContract::OzGovernorModule
            .zksync_constructor_args(erc20)
            .encode()
            .unwrap();

        // owner is the first head word, the token the fourth
        assert_eq!(&encoded[12..32], ADDRESS_ONE.as_slice());
        assert_eq!(&encoded[3 * 32 + 12..4 * 32], erc20.as_slice());
    }
}
