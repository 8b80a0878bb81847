//! Tests for the on-chain multisend encoding, checked against the off-chain
//! encoder used to build proposals

use std::collections::BTreeMap;

use alloy::primitives::{bytes, Address, Bytes, U256};
use eyre::{ensure, Result};
use governor_common::{
    abi_args::AbiArgs,
    constants::ADDRESS_ONE,
    multisend::{encode_multisend, Operation},
};

use crate::{
    abis::{ITestMultisendEncoder, TestMultisendEncoder},
    integration_test,
    util::{assert_call_reverts, deploy_contract},
    TestArgs,
};

/// The calldata of each encoded transaction
const CALLDATA: Bytes = bytes!("deadbeef");

/// Deploys the multisend contract and the encoder harness, returning the
/// multisend address and the harness
async fn setup(args: &TestArgs) -> Result<(Address, TestMultisendEncoder)> {
    let no_args = AbiArgs::default();
    let multisend = deploy_contract(args, "MultiSend", &BTreeMap::new(), &no_args).await?;
    let encoder = deploy_contract(args, "MultisendEncoder", &BTreeMap::new(), &no_args).await?;

    let libraries = BTreeMap::from([("MultisendEncoder".to_string(), encoder)]);
    let harness = deploy_contract(args, "TestMultisendEncoder", &libraries, &no_args).await?;
    Ok((multisend, ITestMultisendEncoder::new(harness, args.client.clone())))
}

/// Test that several transactions are packed into a multisend delegatecall
async fn test_multisend_batch(args: TestArgs) -> Result<()> {
    let (multisend, harness) = setup(&args).await?;
    let targets = vec![ADDRESS_ONE; 2];
    let values = vec![U256::ZERO; 2];
    let calldatas = vec![CALLDATA; 2];

    let res = harness
        .encodeMultisend(multisend, targets.clone(), values.clone(), calldatas.clone())
        .call()
        .await?;
    let expected = encode_multisend(multisend, &targets, &values, &calldatas)?;

    ensure!(res.to == multisend, "batch sent to {}, expected {multisend}", res.to);
    ensure!(res.value.is_zero(), "batch carries value {}", res.value);
    ensure!(res.data == expected.data, "on-chain packing differs from off-chain packing");
    ensure!(res.operation == Operation::DelegateCall as u8, "batch is not a delegatecall");
    Ok(())
}
integration_test!(test_multisend_batch);

/// Test that a single transaction is passed through as a plain call
async fn test_multisend_single(args: TestArgs) -> Result<()> {
    let (multisend, harness) = setup(&args).await?;

    let res = harness
        .encodeMultisend(multisend, vec![ADDRESS_ONE], vec![U256::ZERO], vec![CALLDATA])
        .call()
        .await?;

    ensure!(res.to == ADDRESS_ONE, "single transaction sent to {}", res.to);
    ensure!(res.value.is_zero(), "single transaction carries value {}", res.value);
    ensure!(res.data == CALLDATA, "single transaction calldata altered");
    ensure!(res.operation == Operation::Call as u8, "single transaction is not a call");
    Ok(())
}
integration_test!(test_multisend_single);

/// Test that an empty batch is rejected
async fn test_multisend_no_transactions(args: TestArgs) -> Result<()> {
    let (multisend, harness) = setup(&args).await?;

    let call = harness.encodeMultisend(multisend, vec![], vec![U256::ZERO], vec![CALLDATA]);
    assert_call_reverts(call, "NoTransactions()").await
}
integration_test!(test_multisend_no_transactions);

/// Test that batches with mismatched array lengths are rejected
async fn test_multisend_unequal_lengths(args: TestArgs) -> Result<()> {
    let (multisend, harness) = setup(&args).await?;
    let cases = [
        (vec![ADDRESS_ONE; 2], vec![U256::ZERO], vec![CALLDATA; 2]),
        (vec![ADDRESS_ONE; 2], vec![U256::ZERO; 2], vec![CALLDATA]),
        (vec![ADDRESS_ONE], vec![U256::ZERO; 2], vec![CALLDATA; 2]),
    ];

    for (targets, values, calldatas) in cases {
        let call = harness.encodeMultisend(multisend, targets, values, calldatas);
        assert_call_reverts(call, "UnequalArraysLengths()").await?;
    }
    Ok(())
}
integration_test!(test_multisend_unequal_lengths);
