//! ABI encoding of human-authored argument lists.
//!
//! Constructor arguments and `setUp` parameters are persisted as a pair of
//! Solidity type strings and JSON values, e.g.
//! `{"types": ["address", "string"], "values": ["0x...01", "Token"]}`,
//! and encoded with `abi.encode` semantics.

use std::str::FromStr;

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{hex, Address, Bytes, FixedBytes, I256, U256};
use alloy_sol_types::SolCall;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{errors::EncodingError, solidity::setUpCall};

/// A list of Solidity types paired with the values to encode for them
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiArgs {
    /// The Solidity types of the arguments
    pub types: Vec<String>,
    /// The argument values, as JSON
    pub values: Vec<Value>,
}

impl AbiArgs {
    /// Creates an argument list from type strings and values
    pub fn new<S: Into<String>>(types: impl IntoIterator<Item = S>, values: Vec<Value>) -> Self {
        Self {
            types: types.into_iter().map(Into::into).collect(),
            values,
        }
    }

    /// Whether the list holds no arguments
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.values.is_empty()
    }

    /// Coerces the values into their declared types
    pub fn to_sol_values(&self) -> Result<Vec<DynSolValue>, EncodingError> {
        if self.types.len() != self.values.len() {
            return Err(EncodingError::ArityMismatch {
                types: self.types.len(),
                values: self.values.len(),
            });
        }

        self.types
            .iter()
            .zip(self.values.iter())
            .map(|(ty, value)| {
                let sol_type = DynSolType::parse(ty)
                    .map_err(|_| EncodingError::InvalidType(ty.clone()))?;
                coerce_value(&sol_type, value)
            })
            .collect()
    }

    /// ABI-encodes the arguments as function parameters, i.e. `abi.encode(values...)`
    pub fn encode(&self) -> Result<Vec<u8>, EncodingError> {
        let values = self.to_sol_values()?;
        if values.is_empty() {
            return Ok(Vec::new());
        }

        Ok(DynSolValue::Tuple(values).abi_encode_params())
    }

    /// The calldata of a `setUp(bytes)` call initializing a proxy with these arguments
    pub fn setup_calldata(&self) -> Result<Bytes, EncodingError> {
        let initialize_params = self.encode()?;
        Ok(setUpCall {
            initializeParams: initialize_params.into(),
        }
        .abi_encode()
        .into())
    }
}

/// Coerces a JSON value into a Solidity value of the given type
fn coerce_value(ty: &DynSolType, value: &Value) -> Result<DynSolValue, EncodingError> {
    let invalid = || EncodingError::InvalidValue {
        ty: ty.sol_type_name().into_owned(),
        value: value.to_string(),
    };

    match ty {
        DynSolType::Address => {
            let s = value.as_str().ok_or_else(invalid)?;
            Address::from_str(s)
                .map(DynSolValue::Address)
                .map_err(|_| invalid())
        }
        DynSolType::Bool => match value {
            Value::Bool(b) => Ok(DynSolValue::Bool(*b)),
            Value::String(s) => bool::from_str(s)
                .map(DynSolValue::Bool)
                .map_err(|_| invalid()),
            _ => Err(invalid()),
        },
        DynSolType::String => value
            .as_str()
            .map(|s| DynSolValue::String(s.to_string()))
            .ok_or_else(invalid),
        DynSolType::Bytes => {
            let s = value.as_str().ok_or_else(invalid)?;
            hex::decode(s)
                .map(DynSolValue::Bytes)
                .map_err(|_| invalid())
        }
        DynSolType::FixedBytes(size) => {
            let s = value.as_str().ok_or_else(invalid)?;
            let bytes = hex::decode(s).map_err(|_| invalid())?;
            if bytes.len() != *size {
                return Err(invalid());
            }

            let mut word = FixedBytes::<32>::ZERO;
            word[..*size].copy_from_slice(&bytes);
            Ok(DynSolValue::FixedBytes(word, *size))
        }
        DynSolType::Uint(bits) => {
            let n = match value {
                Value::Number(n) => U256::from_str(&n.to_string()),
                Value::String(s) => U256::from_str(s),
                _ => return Err(invalid()),
            }
            .map_err(|_| invalid())?;
            if *bits < 256 && n.bit_len() > *bits {
                return Err(invalid());
            }

            Ok(DynSolValue::Uint(n, *bits))
        }
        DynSolType::Int(bits) => {
            let n = match value {
                Value::Number(n) => I256::from_dec_str(&n.to_string()),
                Value::String(s) => I256::from_dec_str(s),
                _ => return Err(invalid()),
            }
            .map_err(|_| invalid())?;
            if *bits < 256 {
                // Two's complement range of intN: [-2^(N-1), 2^(N-1) - 1]
                let bound = U256::from(1) << (*bits - 1);
                let abs = n.unsigned_abs();
                if (n.is_negative() && abs > bound) || (!n.is_negative() && abs >= bound) {
                    return Err(invalid());
                }
            }

            Ok(DynSolValue::Int(n, *bits))
        }
        DynSolType::Array(inner) => {
            let items = value.as_array().ok_or_else(invalid)?;
            items
                .iter()
                .map(|item| coerce_value(inner, item))
                .collect::<Result<Vec<_>, _>>()
                .map(DynSolValue::Array)
        }
        DynSolType::FixedArray(inner, len) => {
            let items = value.as_array().ok_or_else(invalid)?;
            if items.len() != *len {
                return Err(invalid());
            }

            items
                .iter()
                .map(|item| coerce_value(inner, item))
                .collect::<Result<Vec<_>, _>>()
                .map(DynSolValue::FixedArray)
        }
        DynSolType::Tuple(inner) => {
            let items = value.as_array().ok_or_else(invalid)?;
            if items.len() != inner.len() {
                return Err(invalid());
            }

            inner
                .iter()
                .zip(items.iter())
                .map(|(ty, item)| coerce_value(ty, item))
                .collect::<Result<Vec<_>, _>>()
                .map(DynSolValue::Tuple)
        }
        _ => Err(EncodingError::InvalidType(ty.sol_type_name().into_owned())),
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{hex, Address, U256};
    use alloy_sol_types::{sol_data, SolCall, SolType};
    use serde_json::json;

    use crate::{constants::ADDRESS_ONE, errors::EncodingError, solidity::setUpCall};

    use super::AbiArgs;

    type TokenSetup = (sol_data::Address, sol_data::String, sol_data::String);

    #[test]
    fn test_encode_matches_static_encoding() {
        let args = AbiArgs::new(
            ["address", "string", "string"],
            vec![json!(ADDRESS_ONE.to_string()), json!("Token"), json!("TKN")],
        );

        let expected =
            TokenSetup::abi_encode_params(&(ADDRESS_ONE, "Token".to_string(), "TKN".to_string()));
        assert_eq!(args.encode().unwrap(), expected);
    }

    #[test]
    fn test_empty_strings_encode() {
        let args = AbiArgs::new(
            ["address", "string", "string"],
            vec![json!(ADDRESS_ONE.to_string()), json!(""), json!("")],
        );

        let expected =
            TokenSetup::abi_encode_params(&(ADDRESS_ONE, String::new(), String::new()));
        assert_eq!(args.encode().unwrap(), expected);
    }

    #[test]
    fn test_numbers_accept_json_numbers_and_strings() {
        let from_numbers = AbiArgs::new(["uint256", "uint64"], vec![json!(60), json!(10)]);
        let from_strings = AbiArgs::new(["uint256", "uint64"], vec![json!("60"), json!("0xa")]);

        assert_eq!(
            from_numbers.encode().unwrap(),
            from_strings.encode().unwrap()
        );
        let encoded = from_numbers.encode().unwrap();
        assert_eq!(U256::from_be_slice(&encoded[..32]), U256::from(60));
        assert_eq!(U256::from_be_slice(&encoded[32..]), U256::from(10));
    }

    #[test]
    fn test_uint_out_of_range_rejected() {
        let args = AbiArgs::new(["uint8"], vec![json!(256)]);
        assert!(matches!(
            args.encode(),
            Err(EncodingError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_int_range_is_enforced() {
        for value in [json!(1000), json!(128), json!(-129), json!("-1000")] {
            let args = AbiArgs::new(["int8"], vec![value]);
            assert!(matches!(
                args.encode(),
                Err(EncodingError::InvalidValue { .. })
            ));
        }

        let bounds = AbiArgs::new(["int8", "int8"], vec![json!(127), json!(-128)]);
        let encoded = bounds.encode().unwrap();
        assert_eq!(U256::from_be_slice(&encoded[..32]), U256::from(127));
        assert_eq!(U256::from_be_slice(&encoded[32..]), U256::MAX - U256::from(127));
    }

    #[test]
    fn test_arity_mismatch_rejected() {
        let args = AbiArgs::new(["address", "string"], vec![json!(ADDRESS_ONE.to_string())]);
        assert_eq!(
            args.encode(),
            Err(EncodingError::ArityMismatch {
                types: 2,
                values: 1
            })
        );
    }

    #[test]
    fn test_invalid_address_rejected() {
        let args = AbiArgs::new(["address"], vec![json!("0x1234")]);
        assert!(matches!(
            args.encode(),
            Err(EncodingError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_no_args_encode_empty() {
        assert!(AbiArgs::default().encode().unwrap().is_empty());
    }

    #[test]
    fn test_setup_calldata_wraps_encoded_params() {
        let owner = Address::repeat_byte(0x11);
        let args = AbiArgs::new(
            ["address", "string", "string"],
            vec![json!(owner.to_string()), json!("Votes"), json!("VOTE")],
        );

        let calldata = args.setup_calldata().unwrap();
        assert_eq!(calldata[..4], setUpCall::SELECTOR);
        assert_eq!(calldata[..4], hex!("a4f9edbf"));

        let decoded = setUpCall::abi_decode(&calldata, true).unwrap();
        assert_eq!(decoded.initializeParams.to_vec(), args.encode().unwrap());
    }
}
