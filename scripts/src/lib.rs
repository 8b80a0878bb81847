//! Scripts for extracting, deploying and verifying the governor module
//! mastercopies, and for deploying module proxies of them.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod cli;
mod commands;
pub mod config;
pub mod constants;
pub mod context;
pub mod deployments;
pub mod errors;
pub mod mastercopy;
pub mod proxy;
pub mod retry;
pub mod solidity;
pub mod transactions;
pub mod types;
pub mod utils;
pub mod verify;
pub mod zksync;
