//! Utilities for sending and waiting on transactions

use alloy::{
    contract::Error as ContractError,
    eips::eip2718::Encodable2718,
    network::{EthereumWallet, TransactionBuilder},
    primitives::{TxHash, U256},
    providers::{DynProvider, Provider},
    rpc::types::{TransactionReceipt, TransactionRequest},
    transports::{RpcError, TransportErrorKind},
};
use governor_common::{ledger::DeploymentRecord, revert::decode_revert_data};
use tracing::{info, warn};

use crate::{
    config::Settings,
    context::NetworkContext,
    constants::{HTTP_TOO_MANY_REQUESTS, RECEIPT_POLL_ATTEMPTS, RECEIPT_POLL_INTERVAL},
    errors::ScriptError,
    retry::with_retries,
};

/// Classifies an RPC error, decoding revert data where the node returns any
pub fn map_rpc_error(err: RpcError<TransportErrorKind>) -> ScriptError {
    match err {
        RpcError::ErrorResp(payload) => {
            if let Some(data) = payload.as_revert_data() {
                return ScriptError::Revert(decode_revert_data(&data));
            }

            let message = payload.message.to_lowercase();
            if payload.code == HTTP_TOO_MANY_REQUESTS as i64
                || message.contains("rate limit")
                || message.contains("too many requests")
            {
                ScriptError::RateLimited(payload.message.to_string())
            } else if message.contains("revert") {
                ScriptError::Revert(payload.message.to_string())
            } else {
                ScriptError::ContractInteraction(payload.to_string())
            }
        }
        RpcError::Transport(TransportErrorKind::HttpError(e)) if e.status == HTTP_TOO_MANY_REQUESTS => {
            ScriptError::RateLimited(e.body)
        }
        RpcError::Transport(kind) => ScriptError::Transport(kind.to_string()),
        RpcError::NullResp => ScriptError::Transport("null response".to_string()),
        e => ScriptError::ContractInteraction(e.to_string()),
    }
}

/// Classifies an error raised by a contract binding
pub fn map_contract_error(err: ContractError) -> ScriptError {
    match err {
        ContractError::TransportError(e) => map_rpc_error(e),
        e => ScriptError::ContractInteraction(e.to_string()),
    }
}

/// A transaction signed once, so that a rebroadcast carries the same nonce and hash
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTx {
    /// The transaction hash
    pub hash: TxHash,
    /// The EIP-2718 encoding sent to the node
    pub raw: Vec<u8>,
}

/// Fills the sender, nonce, gas and chain id of `tx` and signs it.
///
/// Reverts surface here, as gas estimation fails for a reverting call.
pub async fn sign_tx(
    ctx: &NetworkContext,
    stage: &str,
    tx: &TransactionRequest,
) -> Result<SignedTx, ScriptError> {
    let client = &ctx.client;
    let settings = &ctx.settings;
    let sender = ctx.sender;
    let request = &tx.clone().with_from(sender);

    let nonce = with_retries(&settings.retry, stage, || async move {
        client
            .get_transaction_count(sender)
            .pending()
            .await
            .map_err(map_rpc_error)
    })
    .await?;
    let gas = with_retries(&settings.retry, stage, || async move {
        client.estimate_gas(request).await.map_err(map_rpc_error)
    })
    .await?;
    let gas_price = with_retries(&settings.retry, stage, || async move {
        client.get_gas_price().await.map_err(map_rpc_error)
    })
    .await?;

    let request = request
        .clone()
        .with_nonce(nonce)
        .with_gas_limit(gas)
        .with_gas_price(gas_price)
        .with_chain_id(ctx.network.chain_id);
    sign_request(request, &ctx.wallet).await
}

/// Signs a fully specified request
async fn sign_request(
    request: TransactionRequest,
    wallet: &EthereumWallet,
) -> Result<SignedTx, ScriptError> {
    let envelope = request
        .build(wallet)
        .await
        .map_err(|e| ScriptError::ContractInteraction(format!("error signing transaction: {e}")))?;

    Ok(SignedTx {
        hash: *envelope.tx_hash(),
        raw: envelope.encoded_2718(),
    })
}

/// Whether the node rejected a broadcast because it has seen the transaction
/// or its nonce before
pub fn is_already_submitted(err: &ScriptError) -> bool {
    let ScriptError::ContractInteraction(message) = err else {
        return false;
    };

    let message = message.to_lowercase();
    ["already known", "known transaction", "already imported", "nonce too low"]
        .iter()
        .any(|marker| message.contains(marker))
}

/// Whether the node knows `tx_hash`, either pending or mined
pub async fn is_known_tx(
    client: &DynProvider,
    settings: &Settings,
    tx_hash: TxHash,
) -> Result<bool, ScriptError> {
    let tx = with_retries(&settings.retry, "get transaction", || async move {
        client
            .get_transaction_by_hash(tx_hash)
            .await
            .map_err(map_rpc_error)
    })
    .await?;

    Ok(tx.is_some())
}

/// Broadcasts a signed transaction. Retries resend the same bytes, so a
/// broadcast that reached the node before failing cannot be duplicated.
pub async fn broadcast_tx(
    client: &DynProvider,
    settings: &Settings,
    stage: &str,
    signed: &SignedTx,
) -> Result<(), ScriptError> {
    let raw = signed.raw.as_slice();
    let res = with_retries(&settings.retry, stage, || async move {
        client
            .send_raw_transaction(raw)
            .await
            .map(|_| ())
            .map_err(map_rpc_error)
    })
    .await;

    match res {
        Err(e) if is_already_submitted(&e) => {
            if is_known_tx(client, settings, signed.hash).await? {
                info!("{stage}: {:#x} already known to the node", signed.hash);
                Ok(())
            } else {
                Err(ScriptError::Conflict(format!(
                    "{stage}: nonce of {:#x} was taken by another transaction",
                    signed.hash
                )))
            }
        }
        res => res,
    }
}

/// Signs and broadcasts a transaction, returning its hash without waiting for
/// inclusion
pub async fn submit_tx(
    ctx: &NetworkContext,
    stage: &str,
    tx: &TransactionRequest,
) -> Result<TxHash, ScriptError> {
    let signed = sign_tx(ctx, stage, tx).await?;
    broadcast_tx(&ctx.client, &ctx.settings, stage, &signed).await?;

    info!("{stage}: submitted {:#x}", signed.hash);
    Ok(signed.hash)
}

/// The recorded transaction of a pending step, when the node still knows it.
/// A transaction the node dropped is resubmitted by the caller.
pub async fn resume_pending_tx(
    ctx: &NetworkContext,
    stage: &str,
    record: &DeploymentRecord,
) -> Result<Option<TxHash>, ScriptError> {
    let Some(tx_hash) = record.pending_tx() else {
        return Ok(None);
    };

    if is_known_tx(&ctx.client, &ctx.settings, tx_hash).await? {
        info!("{stage}: resuming {tx_hash:#x}");
        return Ok(Some(tx_hash));
    }

    warn!("{stage}: recorded transaction {tx_hash:#x} is unknown to the node, resubmitting");
    Ok(None)
}

/// Polls for the receipt of `tx_hash` and checks that the transaction succeeded
pub async fn wait_for_receipt(
    client: &DynProvider,
    settings: &Settings,
    stage: &str,
    tx_hash: TxHash,
) -> Result<TransactionReceipt, ScriptError> {
    // Polled directly rather than through the pending transaction watcher,
    // which misses receipts on some nodes
    for _ in 0..RECEIPT_POLL_ATTEMPTS {
        let receipt = with_retries(&settings.retry, stage, || async move {
            client
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(map_rpc_error)
        })
        .await?;

        if let Some(receipt) = receipt {
            if !receipt.status() {
                return Err(ScriptError::Revert(format!(
                    "{stage}: transaction {tx_hash:#x} reverted"
                )));
            }
            return Ok(receipt);
        }

        tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
    }

    Err(ScriptError::Timeout(format!(
        "{stage}: no receipt for {tx_hash:#x}"
    )))
}

/// Submits a transaction and waits for it to succeed
pub async fn send_tx(
    ctx: &NetworkContext,
    stage: &str,
    tx: &TransactionRequest,
) -> Result<TransactionReceipt, ScriptError> {
    let tx_hash = submit_tx(ctx, stage, tx).await?;
    wait_for_receipt(&ctx.client, &ctx.settings, stage, tx_hash).await
}

/// Estimates the fee of a transaction as gas times the current gas price, in wei
pub async fn estimate_fee(
    client: &DynProvider,
    settings: &Settings,
    tx: &TransactionRequest,
) -> Result<U256, ScriptError> {
    let gas = with_retries(&settings.retry, "estimate gas", || async move {
        client.estimate_gas(tx).await.map_err(map_rpc_error)
    })
    .await?;
    let gas_price = with_retries(&settings.retry, "get gas price", || async move {
        client.get_gas_price().await.map_err(map_rpc_error)
    })
    .await?;

    Ok(U256::from(gas) * U256::from(gas_price))
}

#[cfg(test)]
mod tests {
    use alloy::{
        network::{EthereumWallet, TransactionBuilder},
        primitives::{address, keccak256, Address, Bytes, U256},
        rpc::{json_rpc::ErrorPayload, types::TransactionRequest},
        signers::local::PrivateKeySigner,
        transports::{RpcError, TransportErrorKind},
    };

    use crate::errors::ScriptError;

    use super::{is_already_submitted, map_rpc_error, sign_request};

    /// The first development account of Hardhat and Anvil
    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn dev_wallet() -> (EthereumWallet, Address) {
        let signer: PrivateKeySigner = DEV_KEY.parse().unwrap();
        let sender = signer.address();
        (EthereumWallet::from(signer), sender)
    }

    fn filled_request(sender: Address) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(sender)
            .with_to(address!("914d7fec6aac8cd542e72bca78b30650d45643d7"))
            .with_input(Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]))
            .with_value(U256::ZERO)
            .with_nonce(7)
            .with_gas_limit(100_000)
            .with_gas_price(1_000_000_000)
            .with_chain_id(31337)
    }

    fn error_response(code: i64, message: &'static str) -> RpcError<TransportErrorKind> {
        RpcError::ErrorResp(ErrorPayload {
            code,
            message: message.into(),
            data: None,
        })
    }

    #[test]
    fn test_rate_limits_are_retryable() {
        let err = map_rpc_error(error_response(-32005, "daily request count exceeded, request rate limited"));
        assert!(matches!(err, ScriptError::RateLimited(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_reverts_are_fatal() {
        let err = map_rpc_error(error_response(-32000, "execution reverted"));
        assert!(matches!(err, ScriptError::Revert(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_transport_errors_are_retryable() {
        let err = map_rpc_error(RpcError::Transport(TransportErrorKind::BackendGone));
        assert!(matches!(err, ScriptError::Transport(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_already_submitted_errors() {
        for message in ["already known", "Nonce too low", "known transaction: 0xab"] {
            assert!(is_already_submitted(&map_rpc_error(error_response(-32000, message))));
        }

        let funds = map_rpc_error(error_response(-32000, "insufficient funds for gas * price + value"));
        assert!(!is_already_submitted(&funds));
        assert!(!is_already_submitted(&ScriptError::Transport("already known".to_string())));
    }

    #[tokio::test]
    async fn test_signing_fixes_the_hash() {
        let (wallet, sender) = dev_wallet();

        let first = sign_request(filled_request(sender), &wallet).await.unwrap();
        let second = sign_request(filled_request(sender), &wallet).await.unwrap();

        assert_eq!(first, second);
        // Legacy transactions hash their full encoding
        assert_eq!(first.hash, keccak256(&first.raw));
    }

    #[tokio::test]
    async fn test_signing_requires_a_nonce() {
        let (wallet, sender) = dev_wallet();
        let mut request = filled_request(sender);
        request.nonce = None;

        assert!(matches!(
            sign_request(request, &wallet).await,
            Err(ScriptError::ContractInteraction(_))
        ));
    }
}
