//! Errors returned by the block explorer API

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use crate::errors::ScriptError;

/// Errors talking to an Etherscan-compatible API
#[derive(Debug)]
pub enum ApiError {
    /// The contract has no verified source
    ContractNotVerified,
    /// The contract source was verified before
    ContractAlreadyVerified,
    /// The explorer has not indexed the contract's bytecode yet
    ContractNotIndexed,
    /// The verification is queued
    VerificationPending,
    /// The submitted source does not compile to the deployed bytecode
    BytecodeMismatch(String),
    /// The daily quota of verification submissions is used up
    DailyVerificationRequestsLimitExceeded,
    /// Too many requests in a short period
    RateLimitExceeded,
    /// The API key is missing or invalid
    InvalidApiKey,
    /// The endpoint does not exist
    PageNotFound,
    /// The request was blocked by Cloudflare
    BlockedByCloudflare,
    /// The request hit a Cloudflare security challenge
    CloudFlareSecurityChallenge,
    /// The response is not the expected JSON
    Serde {
        /// The parsing error
        error: serde_json::Error,
        /// The response body
        content: String,
    },
    /// The API reported a failure
    ErrorResponse {
        /// The response message
        message: String,
        /// The response result
        result: String,
    },
    /// The response status is neither success nor failure
    UnexpectedResponse {
        /// The response message
        message: String,
        /// The response result
        result: String,
    },
    /// The HTTP request failed
    Reqwest(reqwest::Error),
}

impl ApiError {
    /// Whether the request may succeed when repeated later
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::ContractNotIndexed
            | ApiError::VerificationPending
            | ApiError::RateLimitExceeded
            | ApiError::PageNotFound
            | ApiError::BlockedByCloudflare
            | ApiError::CloudFlareSecurityChallenge => true,
            ApiError::Reqwest(e) => !e.is_builder(),
            _ => false,
        }
    }

    /// Whether a verification status query failed because the explorer
    /// finished processing the submission without verifying it
    pub fn settles_submission(&self) -> bool {
        matches!(
            self,
            ApiError::BytecodeMismatch(_) | ApiError::ErrorResponse { .. }
        )
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ContractNotVerified => write!(f, "contract source code not verified"),
            ApiError::ContractAlreadyVerified => write!(f, "contract source code already verified"),
            ApiError::ContractNotIndexed => write!(f, "contract bytecode not indexed yet"),
            ApiError::VerificationPending => write!(f, "verification pending in queue"),
            ApiError::BytecodeMismatch(s) => write!(f, "{s}"),
            ApiError::DailyVerificationRequestsLimitExceeded => {
                write!(f, "daily verification requests limit exceeded")
            }
            ApiError::RateLimitExceeded => write!(f, "max rate limit reached"),
            ApiError::InvalidApiKey => write!(f, "invalid API key"),
            ApiError::PageNotFound => write!(f, "page not found"),
            ApiError::BlockedByCloudflare => write!(f, "blocked by Cloudflare"),
            ApiError::CloudFlareSecurityChallenge => write!(f, "Cloudflare security challenge"),
            ApiError::Serde { error, content } => {
                write!(f, "unable to parse response ({error}): {content}")
            }
            ApiError::ErrorResponse { message, result } => write!(f, "{message}: {result}"),
            ApiError::UnexpectedResponse { message, result } => {
                write!(f, "unexpected response {message}: {result}")
            }
            ApiError::Reqwest(e) => write!(f, "request failed: {e}"),
        }
    }
}

impl Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Reqwest(e)
    }
}

impl From<ApiError> for ScriptError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::BytecodeMismatch(s) => ScriptError::VerificationMismatch(s),
            ApiError::InvalidApiKey => ScriptError::Configuration(e.to_string()),
            ApiError::RateLimitExceeded => ScriptError::RateLimited(e.to_string()),
            e if e.is_retryable() => ScriptError::Transport(e.to_string()),
            e => ScriptError::Verification(e.to_string()),
        }
    }
}

/// Whether the response is Cloudflare's block page
pub(crate) fn is_blocked_by_cloudflare_response(content: &str) -> bool {
    content.contains("Sorry, you have been blocked")
}

/// Whether the response is a Cloudflare security challenge
pub(crate) fn is_cloudflare_security_challenge(content: &str) -> bool {
    content.contains("https://www.cloudflare.com?utm_source=challenge")
        || content.contains("Checking if the site connection is secure")
}

#[cfg(test)]
mod tests {
    use super::ApiError;

    #[test]
    fn test_failed_verifications_settle_the_submission() {
        assert!(ApiError::BytecodeMismatch("Fail - Unable to verify".to_string()).settles_submission());
        assert!(ApiError::ErrorResponse {
            message: "NOTOK".to_string(),
            result: "Unable to locate ContractCode".to_string(),
        }
        .settles_submission());

        // Transient and account-level failures leave the submission to be polled again
        assert!(!ApiError::VerificationPending.settles_submission());
        assert!(!ApiError::RateLimitExceeded.settles_submission());
        assert!(!ApiError::InvalidApiKey.settles_submission());
        assert!(!ApiError::DailyVerificationRequestsLimitExceeded.settles_submission());
    }
}
