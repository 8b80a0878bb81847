//! Data model and encodings shared by the governor deployment scripts and the
//! integration tests: address prediction, calldata construction, build
//! artifacts, and deployment records

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod abi_args;
pub mod artifacts;
pub mod constants;
pub mod create2;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod mastercopy;
pub mod multisend;
pub mod proposal;
pub mod revert;
pub mod solidity;
