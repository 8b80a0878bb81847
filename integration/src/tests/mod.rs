//! Integration tests for the governor contracts

mod erc20_votes;
mod erc721_votes;
mod multisend;

use std::collections::BTreeMap;

use alloy::primitives::Address;
use eyre::Result;
use governor_common::abi_args::AbiArgs;
use serde_json::json;

use crate::{
    constants::{TOKEN_NAME, TOKEN_SYMBOL},
    util::deploy_contract,
    TestArgs,
};

/// The `(owner, name, symbol)` constructor and `setUp` arguments of a token
pub(crate) fn token_args(owner: Address) -> AbiArgs {
    AbiArgs::new(
        ["address", "string", "string"],
        vec![json!(owner.to_string()), json!(TOKEN_NAME), json!(TOKEN_SYMBOL)],
    )
}

/// Deploys a voting token owned by the test wallet
pub(crate) async fn deploy_token(args: &TestArgs, contract_name: &str) -> Result<Address> {
    deploy_contract(args, contract_name, &BTreeMap::new(), &token_args(args.wallet)).await
}
