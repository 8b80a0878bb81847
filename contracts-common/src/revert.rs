//! Human readable revert reasons

use alloy_primitives::hex;
use alloy_sol_types::{decode_revert_reason, SolInterface};

use crate::solidity::GovernorErrors::GovernorErrorsErrors;

/// Describes the revert data returned by a failed call.
///
/// Custom errors of the factory and the governor are rendered with their
/// arguments, `Error(string)` and `Panic(uint256)` with their message, and
/// anything else as hex.
pub fn decode_revert_data(data: &[u8]) -> String {
    if data.is_empty() {
        return "empty revert data".to_string();
    }

    if let Ok(err) = GovernorErrorsErrors::abi_decode(data, true) {
        return describe_error(&err);
    }

    decode_revert_reason(data).unwrap_or_else(|| format!("unknown revert data {}", hex::encode_prefixed(data)))
}

/// Renders a custom error as its Solidity signature with arguments
fn describe_error(err: &GovernorErrorsErrors) -> String {
    match err {
        GovernorErrorsErrors::TargetHasNoCode(e) => format!("TargetHasNoCode({})", e.target),
        GovernorErrorsErrors::ZeroAddress(e) => format!("ZeroAddress({})", e.target),
        GovernorErrorsErrors::TakenAddress(e) => format!("TakenAddress({})", e.address_),
        GovernorErrorsErrors::FailedInitialization(_) => "FailedInitialization()".to_string(),
        GovernorErrorsErrors::NoTransactions(_) => "NoTransactions()".to_string(),
        GovernorErrorsErrors::UnequalArraysLengths(_) => "UnequalArraysLengths()".to_string(),
        GovernorErrorsErrors::TransactionsFailed(_) => "TransactionsFailed()".to_string(),
        GovernorErrorsErrors::NotAuthorized(e) => format!("NotAuthorized({})", e.sender),
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{hex, Address};
    use alloy_sol_types::{Revert, SolError};

    use crate::solidity::GovernorErrors::{TakenAddress, TransactionsFailed};

    use super::decode_revert_data;

    #[test]
    fn test_custom_error_with_argument() {
        let taken = Address::repeat_byte(0x42);
        let data = TakenAddress { address_: taken }.abi_encode();

        assert_eq!(decode_revert_data(&data), format!("TakenAddress({taken})"));
    }

    #[test]
    fn test_custom_error_without_arguments() {
        let data = TransactionsFailed {}.abi_encode();
        assert_eq!(decode_revert_data(&data), "TransactionsFailed()");
    }

    #[test]
    fn test_string_revert() {
        let data = Revert::from("Initializable: contract is already initialized").abi_encode();
        assert_eq!(
            decode_revert_data(&data),
            "Initializable: contract is already initialized"
        );
    }

    #[test]
    fn test_unknown_data() {
        assert_eq!(
            decode_revert_data(&hex!("deadbeef")),
            "unknown revert data 0xdeadbeef"
        );
        assert_eq!(decode_revert_data(&[]), "empty revert data");
    }
}
