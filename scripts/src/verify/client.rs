//! A client for the Etherscan-compatible verification API

use std::time::Duration;

use alloy::primitives::Address;
use reqwest::Client;
use serde::Serialize;
use tracing::info;

use super::{
    errors::{is_blocked_by_cloudflare_response, is_cloudflare_security_challenge, ApiError},
    types::{ApiAction, ApiModule, ApiRequest, ApiResponseRaw, EtherscanVerificationRequest},
};

/// The outcome of a finished verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The explorer matched the source to the bytecode
    Verified(String),
    /// The source had been verified before
    AlreadyVerified,
}

/// A client for the explorer of a single chain
#[derive(Debug, Clone)]
pub struct EtherscanClient {
    /// The API endpoint
    api_url: String,
    /// The API key
    api_key: String,
    /// The chain the requests are about
    chain_id: u64,
    /// The HTTP client
    http_client: Client,
}

/// Unwraps the response envelope, classifying the failures the API reports
fn process_api_call_result(
    result: Result<impl AsRef<str>, reqwest::Error>,
) -> Result<String, ApiError> {
    match result {
        Ok(result) => {
            let result = result.as_ref();
            let raw_response: ApiResponseRaw = serde_json::from_str(result).map_err(|error| {
                if result.contains("Page not found") {
                    ApiError::PageNotFound
                } else if is_blocked_by_cloudflare_response(result) {
                    ApiError::BlockedByCloudflare
                } else if is_cloudflare_security_challenge(result) {
                    ApiError::CloudFlareSecurityChallenge
                } else {
                    ApiError::Serde {
                        error,
                        content: result.to_string(),
                    }
                }
            })?;

            match raw_response.status.as_str() {
                "0" => {
                    if raw_response.result == "Contract source code not verified" {
                        return Err(ApiError::ContractNotVerified);
                    }
                    if raw_response.result == "Contract source code already verified"
                        || raw_response.result == "Already Verified"
                    {
                        return Err(ApiError::ContractAlreadyVerified);
                    }
                    if raw_response.result == "Pending in queue" {
                        return Err(ApiError::VerificationPending);
                    }
                    if raw_response.result.starts_with("Fail - Unable to verify") {
                        return Err(ApiError::BytecodeMismatch(raw_response.result));
                    }
                    if raw_response.result.starts_with("Unable to locate ContractCode") {
                        return Err(ApiError::ContractNotIndexed);
                    }
                    // The quota in the message changes, so only its shape is matched
                    if raw_response.result.starts_with("Daily limit")
                        && raw_response
                            .result
                            .ends_with("source code submissions reached")
                    {
                        return Err(ApiError::DailyVerificationRequestsLimitExceeded);
                    }
                    let result_lower = raw_response.result.to_lowercase();
                    if result_lower.contains("rate limit reached") {
                        return Err(ApiError::RateLimitExceeded);
                    }
                    // Either "Invalid API Key" or "Missing/Invalid API Key"
                    if result_lower.contains("invalid api key") {
                        return Err(ApiError::InvalidApiKey);
                    }
                    Err(ApiError::ErrorResponse {
                        message: raw_response.message,
                        result: raw_response.result,
                    })
                }
                "1" => Ok(raw_response.result),
                _ => Err(ApiError::UnexpectedResponse {
                    message: raw_response.message,
                    result: raw_response.result,
                }),
            }
        }
        Err(err) => Err(ApiError::Reqwest(err)),
    }
}

impl EtherscanClient {
    /// Creates a client for the explorer of `chain_id` at `api_url`
    pub fn new(
        api_url: String,
        api_key: String,
        chain_id: u64,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http_client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            api_url,
            api_key,
            chain_id,
            http_client,
        })
    }

    /// The query parameters of a request
    fn request(&self, action: ApiAction) -> ApiRequest<'_> {
        ApiRequest {
            apikey: &self.api_key,
            module: ApiModule::Contract,
            action,
            chainid: self.chain_id,
        }
    }

    /// Sends `form` in the body of a POST request
    async fn post<T>(&self, action: ApiAction, form: &T) -> Result<String, ApiError>
    where
        T: Serialize,
    {
        let response_result = self
            .http_client
            .post(&self.api_url)
            .query(&self.request(action))
            .form(form)
            .send()
            .await?
            .text()
            .await;
        process_api_call_result(response_result)
    }

    /// Sends `query` in the query string of a GET request
    async fn get<T>(&self, action: ApiAction, query: &T) -> Result<String, ApiError>
    where
        T: Serialize,
    {
        let response_result = self
            .http_client
            .get(&self.api_url)
            .query(&self.request(action))
            .query(query)
            .send()
            .await?
            .text()
            .await;
        process_api_call_result(response_result)
    }

    /// Whether the source of the contract at `address` is verified
    pub async fn is_contract_verified(&self, address: Address) -> Result<bool, ApiError> {
        let response = self
            .get(ApiAction::GetAbi, &[("address", address.to_string())])
            .await;

        match response {
            Ok(_) => Ok(true),
            Err(ApiError::ContractNotVerified) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Submits a verification, returning its id
    pub async fn verify(&self, request: &EtherscanVerificationRequest) -> Result<String, ApiError> {
        self.post(ApiAction::VerifySourceCode, request).await
    }

    /// The status of the verification `guid`
    pub async fn get_verification_status(&self, guid: &str) -> Result<String, ApiError> {
        self.get(ApiAction::CheckVerifyStatus, &[("guid", guid)])
            .await
    }

    /// Polls the status of the verification `guid` until it resolves.
    ///
    /// Pending and transient responses are polled again up to `attempts`
    /// times, a bytecode mismatch is returned immediately.
    pub async fn wait_for_verification(
        &self,
        guid: &str,
        attempts: usize,
        interval: Duration,
    ) -> Result<VerificationOutcome, ApiError> {
        let mut last_error = ApiError::VerificationPending;
        for attempt in 1..=attempts {
            match self.get_verification_status(guid).await {
                Ok(status) => return Ok(VerificationOutcome::Verified(status)),
                Err(ApiError::ContractAlreadyVerified) => {
                    return Ok(VerificationOutcome::AlreadyVerified)
                }
                Err(e) if e.is_retryable() => {
                    info!("verification {guid}: {e} ({attempt}/{attempts})");
                    last_error = e;
                    tokio::time::sleep(interval).await;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error)
    }
}
