//! Tests for the ERC20 voting token

use alloy::primitives::U256;
use eyre::{ensure, Result};

use crate::{
    abis::{Erc20Votes, IERC20Votes},
    constants::{ALREADY_INITIALIZED, TOKEN_NAME, TOKEN_SYMBOL},
    integration_test,
    tests::{deploy_token, proxy::deploy_proxy_of, token_args},
    util::{assert_tx_reverts, send_tx},
    TestArgs,
};

/// Deploys a token owned by the test wallet
async fn setup(args: &TestArgs) -> Result<Erc20Votes> {
    let address = deploy_token(args, "ERC20Votes").await?;
    Ok(IERC20Votes::new(address, args.client.clone()))
}

/// Test that the constructor sets the owner and metadata
async fn test_erc20_constructor(args: TestArgs) -> Result<()> {
    let token = setup(&args).await?;

    ensure!(token.owner().call().await?._0 == args.wallet, "wrong owner");
    ensure!(token.name().call().await?._0 == TOKEN_NAME, "wrong name");
    ensure!(token.symbol().call().await?._0 == TOKEN_SYMBOL, "wrong symbol");
    Ok(())
}
integration_test!(test_erc20_constructor);

/// Test that a proxy is initialized once by its factory and rejects a second `setUp`
async fn test_erc20_proxy_setup(args: TestArgs) -> Result<()> {
    let mastercopy = setup(&args).await?;
    let setup_args = token_args(args.wallet);

    let proxy_address = deploy_proxy_of(&args, *mastercopy.address(), &setup_args).await?;
    let proxy = IERC20Votes::new(proxy_address, args.client.clone());
    ensure!(proxy.owner().call().await?._0 == args.wallet, "wrong proxy owner");
    ensure!(proxy.name().call().await?._0 == TOKEN_NAME, "wrong proxy name");
    ensure!(proxy.symbol().call().await?._0 == TOKEN_SYMBOL, "wrong proxy symbol");

    let initialize_params = setup_args.encode()?;
    assert_tx_reverts(proxy.setUp(initialize_params.into()), ALREADY_INITIALIZED).await
}
integration_test!(test_erc20_proxy_setup);

/// Test minting then burning tokens
async fn test_erc20_mint_and_burn(args: TestArgs) -> Result<()> {
    let token = setup(&args).await?;

    send_tx(token.mint(args.wallet, U256::from(100))).await?;
    let balance = token.balanceOf(args.wallet).call().await?._0;
    ensure!(balance == U256::from(100), "expected 100 tokens, got {balance}");

    send_tx(token.burn(U256::from(50))).await?;
    let balance = token.balanceOf(args.wallet).call().await?._0;
    ensure!(balance == U256::from(50), "expected 50 tokens, got {balance}");
    Ok(())
}
integration_test!(test_erc20_mint_and_burn);

/// Test pausing and unpausing transfers
async fn test_erc20_pause(args: TestArgs) -> Result<()> {
    let token = setup(&args).await?;

    send_tx(token.pause()).await?;
    ensure!(token.paused().call().await?._0, "token not paused");

    send_tx(token.unpause()).await?;
    ensure!(!token.paused().call().await?._0, "token still paused");
    Ok(())
}
integration_test!(test_erc20_pause);
