//! Tests for the ERC721 voting token

use alloy::primitives::{FixedBytes, U256};
use eyre::{ensure, Result};

use crate::{
    abis::{Erc721Votes, IERC721Votes},
    constants::{ALREADY_INITIALIZED, TOKEN_NAME, TOKEN_SYMBOL},
    integration_test,
    tests::{deploy_token, proxy::deploy_proxy_of, token_args},
    util::{assert_tx_reverts, send_tx},
    TestArgs,
};

/// The ERC165, ERC721 and ERC721Metadata interface ids
const SUPPORTED_INTERFACES: [[u8; 4]; 3] = [
    [0x01, 0xff, 0xc9, 0xa7],
    [0x80, 0xac, 0x58, 0xcd],
    [0x5b, 0x5e, 0x13, 0x9f],
];

/// Deploys a token owned by the test wallet
async fn setup(args: &TestArgs) -> Result<Erc721Votes> {
    let address = deploy_token(args, "ERC721Votes").await?;
    Ok(IERC721Votes::new(address, args.client.clone()))
}

/// Test that the constructor sets the owner and metadata
async fn test_erc721_constructor(args: TestArgs) -> Result<()> {
    let token = setup(&args).await?;

    ensure!(token.owner().call().await?._0 == args.wallet, "wrong owner");
    ensure!(token.name().call().await?._0 == TOKEN_NAME, "wrong name");
    ensure!(token.symbol().call().await?._0 == TOKEN_SYMBOL, "wrong symbol");
    Ok(())
}
integration_test!(test_erc721_constructor);

/// Test that a proxy rejects a second `setUp`
async fn test_erc721_proxy_setup(args: TestArgs) -> Result<()> {
    let mastercopy = setup(&args).await?;
    let setup_args = token_args(args.wallet);

    let proxy_address = deploy_proxy_of(&args, *mastercopy.address(), &setup_args).await?;
    let proxy = IERC721Votes::new(proxy_address, args.client.clone());
    ensure!(proxy.owner().call().await?._0 == args.wallet, "wrong proxy owner");

    let initialize_params = setup_args.encode()?;
    assert_tx_reverts(proxy.setUp(initialize_params.into()), ALREADY_INITIALIZED).await
}
integration_test!(test_erc721_proxy_setup);

/// Test minting then burning a token
async fn test_erc721_mint_and_burn(args: TestArgs) -> Result<()> {
    let token = setup(&args).await?;

    send_tx(token.safeMint(args.wallet)).await?;
    let balance = token.balanceOf(args.wallet).call().await?._0;
    ensure!(balance == U256::from(1), "expected 1 token, got {balance}");

    send_tx(token.burn(U256::ZERO)).await?;
    let balance = token.balanceOf(args.wallet).call().await?._0;
    ensure!(balance.is_zero(), "expected no tokens, got {balance}");
    Ok(())
}
integration_test!(test_erc721_mint_and_burn);

/// Test pausing and unpausing transfers
async fn test_erc721_pause(args: TestArgs) -> Result<()> {
    let token = setup(&args).await?;

    send_tx(token.pause()).await?;
    ensure!(token.paused().call().await?._0, "token not paused");

    send_tx(token.unpause()).await?;
    ensure!(!token.paused().call().await?._0, "token still paused");
    Ok(())
}
integration_test!(test_erc721_pause);

/// Test the ERC165 interface detection
async fn test_erc721_supports_interface(args: TestArgs) -> Result<()> {
    let token = setup(&args).await?;

    for interface in SUPPORTED_INTERFACES {
        let supported = token.supportsInterface(FixedBytes(interface)).call().await?._0;
        ensure!(supported, "interface {} not supported", FixedBytes(interface));
    }

    let unsupported = FixedBytes([0xde, 0xad, 0xbe, 0xef]);
    let supported = token.supportsInterface(unsupported).call().await?._0;
    ensure!(!supported, "interface {unsupported} reported as supported");
    Ok(())
}
integration_test!(test_erc721_supports_interface);
