//! Governor proposals as built off-chain

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::{sol_data, SolType};

use crate::{
    errors::MultisendError,
    multisend::{encode_multisend, MultisendTransaction},
};

/// The ABI layout hashed into a proposal id
type ProposalHashInput = (
    sol_data::Array<sol_data::Address>,
    sol_data::Array<sol_data::Uint<256>>,
    sol_data::Array<sol_data::Bytes>,
    sol_data::FixedBytes<32>,
);

/// A set of transactions submitted to the governor for a vote
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Proposal {
    /// The call targets
    pub targets: Vec<Address>,
    /// The values sent with each call
    pub values: Vec<U256>,
    /// The calldata of each call
    pub calldatas: Vec<Bytes>,
    /// The human readable description
    pub description: String,
}

impl Proposal {
    /// A proposal with a single call
    pub fn single(target: Address, value: U256, calldata: Bytes, description: &str) -> Self {
        Self {
            targets: vec![target],
            values: vec![value],
            calldatas: vec![calldata],
            description: description.to_string(),
        }
    }

    /// Appends a call to the proposal
    pub fn push(&mut self, target: Address, value: U256, calldata: Bytes) {
        self.targets.push(target);
        self.values.push(value);
        self.calldatas.push(calldata);
    }

    /// `keccak256(bytes(description))`
    pub fn description_hash(&self) -> B256 {
        keccak256(self.description.as_bytes())
    }

    /// The id the governor assigns the proposal,
    /// `uint256(keccak256(abi.encode(targets, values, calldatas, descriptionHash)))`
    pub fn id(&self) -> U256 {
        let encoded = ProposalHashInput::abi_encode_params(&(
            self.targets.clone(),
            self.values.clone(),
            self.calldatas.clone(),
            self.description_hash(),
        ));
        U256::from_be_bytes(keccak256(encoded).0)
    }

    /// The transaction the avatar executes once the proposal passes
    pub fn to_multisend(&self, multisend: Address) -> Result<MultisendTransaction, MultisendError> {
        encode_multisend(multisend, &self.targets, &self.values, &self.calldatas)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{keccak256, Address, Bytes, U256};

    use crate::multisend::Operation;

    use super::Proposal;

    #[test]
    fn test_description_hash() {
        let proposal = Proposal::single(Address::ZERO, U256::ZERO, Bytes::new(), "Send 42");
        assert_eq!(proposal.description_hash(), keccak256("Send 42"));
    }

    #[test]
    fn test_id_depends_on_every_field() {
        let target = Address::repeat_byte(0x11);
        let base = Proposal::single(target, U256::ZERO, Bytes::from_static(&[1]), "Send 42");

        let mut described = base.clone();
        described.description = "Send 43".to_string();
        let mut valued = base.clone();
        valued.values[0] = U256::from(1);
        let mut batched = base.clone();
        batched.push(target, U256::ZERO, Bytes::new());

        assert_eq!(base.id(), base.clone().id());
        assert_ne!(base.id(), described.id());
        assert_ne!(base.id(), valued.id());
        assert_ne!(base.id(), batched.id());
    }

    #[test]
    fn test_to_multisend() {
        let target = Address::repeat_byte(0x11);
        let multisend = Address::repeat_byte(0x99);
        let mut proposal = Proposal::single(target, U256::ZERO, Bytes::new(), "batch");

        assert_eq!(
            proposal.to_multisend(multisend).unwrap().operation,
            Operation::Call
        );

        proposal.push(target, U256::ZERO, Bytes::new());
        let tx = proposal.to_multisend(multisend).unwrap();
        assert_eq!(tx.to, multisend);
        assert_eq!(tx.operation, Operation::DelegateCall);
    }
}
