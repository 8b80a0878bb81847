//! Source verification of deployed mastercopies on Etherscan-compatible
//! block explorers.
//!
//! The submission id is written to the ledger as soon as it is known, and a
//! rerun resumes polling that submission instead of submitting again.

mod client;
mod errors;
mod types;

pub use client::{EtherscanClient, VerificationOutcome};
pub use errors::ApiError;
pub use types::EtherscanVerificationRequest;

use governor_common::{ledger::DeploymentStatus, mastercopy::MastercopyArtifact};
use tracing::{info, warn};

use crate::{
    constants::{
        EXPLORER_CONNECT_TIMEOUT, EXPLORER_REQUEST_TIMEOUT, VERIFICATION_POLL_ATTEMPTS,
        VERIFICATION_POLL_INTERVAL,
    },
    context::NetworkContext,
    deployments::LedgerSection,
    errors::ScriptError,
    retry::{with_retries, RetryPolicy},
    utils::has_code,
};

/// The explorer client of the context's network
pub fn explorer_client(ctx: &NetworkContext) -> Result<EtherscanClient, ScriptError> {
    let api_key = ctx.settings.require_etherscan_api_key()?;
    let client = EtherscanClient::new(
        ctx.settings.explorer_api_url(&ctx.network),
        api_key.to_string(),
        ctx.network.chain_id,
        EXPLORER_CONNECT_TIMEOUT,
        EXPLORER_REQUEST_TIMEOUT,
    )?;
    Ok(client)
}

/// Verifies the source of a deployed mastercopy, returning the verification
/// id when a submission was made
pub async fn verify_mastercopy_artifact(
    ctx: &mut NetworkContext,
    explorer: &EtherscanClient,
    artifact: &MastercopyArtifact,
) -> Result<Option<String>, ScriptError> {
    let key = artifact.ledger_key();
    let stage = format!("verify mastercopy {key}");
    let settings = ctx.settings.clone();
    let address = artifact.address;

    if !has_code(&ctx.client, &settings, address).await? {
        return Err(ScriptError::NotDeployed(format!(
            "{key} has no code at {address:#x} on {}",
            ctx.network.name
        )));
    }

    let record = ctx.ledger.begin(
        LedgerSection::Mastercopies,
        &key,
        address,
        artifact.fingerprint()?,
    )?;
    if record.status == DeploymentStatus::Verified {
        info!("{stage}: already verified");
        return Ok(record.verification_guid);
    }
    if !record.status.is_deployed() {
        ctx.ledger
            .update(LedgerSection::Mastercopies, &key, |r| r.mark_deployed(&key, address))?;
    }

    let guid = match record.verification_guid {
        Some(guid) => {
            info!("{stage}: resuming verification {guid}");
            guid
        }
        None => match submit(explorer, &settings.retry, &stage, artifact).await? {
            Some(guid) => {
                ctx.ledger.update(LedgerSection::Mastercopies, &key, |r| {
                    r.verification_guid = Some(guid.clone());
                    Ok(())
                })?;
                guid
            }
            None => {
                info!("{stage}: source already verified on the explorer");
                ctx.ledger
                    .update(LedgerSection::Mastercopies, &key, |r| r.mark_verified(&key, None))?;
                return Ok(None);
            }
        },
    };

    let outcome = match explorer
        .wait_for_verification(&guid, VERIFICATION_POLL_ATTEMPTS, VERIFICATION_POLL_INTERVAL)
        .await
    {
        Ok(outcome) => outcome,
        Err(ApiError::VerificationPending) => {
            return Err(ScriptError::Timeout(format!(
                "{stage}: verification {guid} still pending"
            )));
        }
        Err(e) => {
            if e.settles_submission() {
                warn!("{stage}: verification {guid} failed ({e}), a rerun submits again");
                ctx.ledger.update(LedgerSection::Mastercopies, &key, |r| {
                    r.clear_verification();
                    Ok(())
                })?;
            }
            return Err(e.into());
        }
    };

    match outcome {
        VerificationOutcome::Verified(status) => info!("{stage}: {status}"),
        VerificationOutcome::AlreadyVerified => info!("{stage}: already verified"),
    }
    ctx.ledger.update(LedgerSection::Mastercopies, &key, |r| {
        r.mark_verified(&key, Some(guid.clone()))
    })?;

    Ok(Some(guid))
}

/// Submits the verification unless the explorer already has the source.
/// Returns the verification id of a new submission.
async fn submit(
    explorer: &EtherscanClient,
    retry: &RetryPolicy,
    stage: &str,
    artifact: &MastercopyArtifact,
) -> Result<Option<String>, ScriptError> {
    let address = artifact.address;
    let verified = with_retries(retry, stage, || async move {
        explorer
            .is_contract_verified(address)
            .await
            .map_err(ScriptError::from)
    })
    .await?;
    if verified {
        return Ok(None);
    }

    let request = &EtherscanVerificationRequest::for_mastercopy(artifact)?;
    let guid = with_retries(retry, stage, || async move {
        match explorer.verify(request).await {
            Ok(guid) => Ok(Some(guid)),
            Err(ApiError::ContractAlreadyVerified) => Ok(None),
            Err(e) => Err(e.into()),
        }
    })
    .await?;

    if let Some(guid) = &guid {
        info!("{stage}: submitted verification {guid}");
    }
    Ok(guid)
}
