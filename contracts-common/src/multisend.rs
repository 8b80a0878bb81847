//! Off-chain encoding of governor proposal transactions.
//!
//! A single transaction is executed by the module as a plain call. Several
//! transactions are packed in the Gnosis `MultiSend` format and executed as one
//! delegatecall into the multisend contract.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{NUM_BYTES_ADDRESS, NUM_BYTES_U256},
    errors::MultisendError,
    solidity::multiSendCall,
};

/// The operation with which the avatar executes a transaction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Operation {
    /// A regular call
    #[default]
    Call = 0,
    /// A delegatecall
    DelegateCall = 1,
}

/// A transaction ready to be executed by the avatar
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisendTransaction {
    /// The call target
    pub to: Address,
    /// The value sent with the call
    pub value: U256,
    /// The calldata
    pub data: Bytes,
    /// How the call is executed
    pub operation: Operation,
}

/// Encodes the proposal transactions `(targets, values, calldatas)` into the
/// single transaction the avatar executes
pub fn encode_multisend(
    multisend: Address,
    targets: &[Address],
    values: &[U256],
    calldatas: &[Bytes],
) -> Result<MultisendTransaction, MultisendError> {
    if targets.is_empty() {
        return Err(MultisendError::NoTransactions);
    }
    if targets.len() != values.len() || targets.len() != calldatas.len() {
        return Err(MultisendError::UnequalArraysLengths);
    }

    if targets.len() == 1 {
        return Ok(MultisendTransaction {
            to: targets[0],
            value: values[0],
            data: calldatas[0].clone(),
            operation: Operation::Call,
        });
    }

    let packed = encode_packed_transactions(targets, values, calldatas);
    let data = multiSendCall {
        transactions: packed.into(),
    }
    .abi_encode();

    Ok(MultisendTransaction {
        to: multisend,
        value: U256::ZERO,
        data: data.into(),
        operation: Operation::DelegateCall,
    })
}

/// Packs transactions back to back, each as
/// `uint8 operation ++ address to ++ uint256 value ++ uint256 length ++ data`.
///
/// Every packed entry is a plain call.
pub fn encode_packed_transactions(
    targets: &[Address],
    values: &[U256],
    calldatas: &[Bytes],
) -> Vec<u8> {
    let capacity = calldatas
        .iter()
        .map(|data| 1 + NUM_BYTES_ADDRESS + 2 * NUM_BYTES_U256 + data.len())
        .sum();
    let mut packed = Vec::with_capacity(capacity);

    for ((to, value), data) in targets.iter().zip(values).zip(calldatas) {
        packed.push(Operation::Call as u8);
        packed.extend_from_slice(to.as_slice());
        packed.extend_from_slice(&value.to_be_bytes::<NUM_BYTES_U256>());
        packed.extend_from_slice(&U256::from(data.len()).to_be_bytes::<NUM_BYTES_U256>());
        packed.extend_from_slice(data);
    }

    packed
}
