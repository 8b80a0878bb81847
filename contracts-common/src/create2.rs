//! Deterministic address prediction for factory deployments.
//!
//! Both deployment flows go through CREATE2, so the target address is known
//! before a transaction is submitted:
//! - mastercopies are created by the ERC-2470 singleton factory from their
//!   full init code and a fixed salt
//! - proxies are created by the `ModuleProxyFactory` from an EIP-1167 minimal
//!   proxy and a salt derived from the initializer and a salt nonce

use alloy_primitives::{keccak256, Address, B256, U256};

use crate::constants::{
    CREATE2_PREFIX, MINIMAL_PROXY_PREFIX, MINIMAL_PROXY_SUFFIX, NUM_BYTES_ADDRESS, NUM_BYTES_U256,
    SINGLETON_FACTORY_ADDRESS,
};

/// Computes the address of a contract created with CREATE2 by `deployer`
pub fn create2_address(deployer: Address, salt: B256, init_code_hash: B256) -> Address {
    let mut preimage = Vec::with_capacity(1 + NUM_BYTES_ADDRESS + 2 * NUM_BYTES_U256);
    preimage.push(CREATE2_PREFIX);
    preimage.extend_from_slice(deployer.as_slice());
    preimage.extend_from_slice(salt.as_slice());
    preimage.extend_from_slice(init_code_hash.as_slice());

    let hash = keccak256(&preimage);
    Address::from_slice(&hash[NUM_BYTES_U256 - NUM_BYTES_ADDRESS..])
}

/// Predicts the address at which the singleton factory deploys `init_code`
pub fn predict_singleton_address(init_code: &[u8], salt: B256) -> Address {
    create2_address(SINGLETON_FACTORY_ADDRESS, salt, keccak256(init_code))
}

/// The creation code of a minimal proxy delegating to `mastercopy`
pub fn minimal_proxy_creation_code(mastercopy: Address) -> Vec<u8> {
    [
        MINIMAL_PROXY_PREFIX.as_slice(),
        mastercopy.as_slice(),
        MINIMAL_PROXY_SUFFIX.as_slice(),
    ]
    .concat()
}

/// The CREATE2 salt the proxy factory derives from an initializer and a salt nonce,
/// i.e. `keccak256(abi.encodePacked(keccak256(initializer), saltNonce))`
pub fn proxy_salt(initializer: &[u8], salt_nonce: U256) -> B256 {
    let mut preimage = Vec::with_capacity(2 * NUM_BYTES_U256);
    preimage.extend_from_slice(keccak256(initializer).as_slice());
    preimage.extend_from_slice(&salt_nonce.to_be_bytes::<NUM_BYTES_U256>());
    keccak256(&preimage)
}

/// Predicts the address of the minimal proxy that `factory` deploys for
/// `mastercopy` when called with `initializer` and `salt_nonce`
pub fn predict_proxy_address(
    factory: Address,
    mastercopy: Address,
    initializer: &[u8],
    salt_nonce: U256,
) -> Address {
    let creation_code = minimal_proxy_creation_code(mastercopy);
    create2_address(
        factory,
        proxy_salt(initializer, salt_nonce),
        keccak256(creation_code),
    )
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, b256, hex, keccak256, Address, B256, U256};

    use crate::constants::{MODULE_PROXY_FACTORY_ADDRESS, SINGLETON_FACTORY_ADDRESS};

    use super::{
        create2_address, minimal_proxy_creation_code, predict_proxy_address,
        predict_singleton_address, proxy_salt,
    };

    /// Example 0 from EIP-1014
    #[test]
    fn test_create2_zero_inputs() {
        let addr = create2_address(Address::ZERO, B256::ZERO, keccak256(hex!("00")));
        assert_eq!(addr, address!("4D1A2e2bB4F88F0250f26Ffff098B0b30B26BF38"));
    }

    /// Example 1 from EIP-1014
    #[test]
    fn test_create2_nonzero_deployer() {
        let addr = create2_address(
            address!("deadbeef00000000000000000000000000000000"),
            B256::ZERO,
            keccak256(hex!("00")),
        );
        assert_eq!(addr, address!("B928f69Bb1D91Cd65274e3c79d8986362984fDA3"));
    }

    /// Example 4 from EIP-1014
    #[test]
    fn test_create2_nonzero_salt() {
        let addr = create2_address(
            address!("00000000000000000000000000000000deadbeef"),
            b256!("00000000000000000000000000000000000000000000000000000000cafebabe"),
            keccak256(hex!("deadbeef")),
        );
        assert_eq!(addr, address!("60f3f640a8508fC6a86d45DF051962668E1e8AC7"));
    }

    #[test]
    fn test_singleton_prediction_uses_factory() {
        let init_code = hex!("6080604052");
        let salt = B256::with_last_byte(7);
        assert_eq!(
            predict_singleton_address(&init_code, salt),
            create2_address(SINGLETON_FACTORY_ADDRESS, salt, keccak256(init_code))
        );
    }

    #[test]
    fn test_minimal_proxy_embeds_mastercopy() {
        let mastercopy = address!("1111111111111111111111111111111111111111");
        let code = minimal_proxy_creation_code(mastercopy);

        assert_eq!(code.len(), 54);
        assert_eq!(&code[19..39], mastercopy.as_slice());
        assert_eq!(code[..10], hex!("602d8060093d393df336"));
    }

    #[test]
    fn test_proxy_salt_depends_on_initializer_and_nonce() {
        let a = proxy_salt(&hex!("deadbeef"), U256::ZERO);
        let b = proxy_salt(&hex!("deadbeef"), U256::from(1));
        let c = proxy_salt(&hex!("deadbeee"), U256::ZERO);

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, proxy_salt(&hex!("deadbeef"), U256::ZERO));
    }

    #[test]
    fn test_proxy_prediction_is_stable_per_inputs() {
        let mastercopy = address!("2222222222222222222222222222222222222222");
        let initializer = hex!("a4f9edbf");

        let first = predict_proxy_address(
            MODULE_PROXY_FACTORY_ADDRESS,
            mastercopy,
            &initializer,
            U256::from(0xfa),
        );
        let second = predict_proxy_address(
            MODULE_PROXY_FACTORY_ADDRESS,
            mastercopy,
            &initializer,
            U256::from(0xfa),
        );
        let other_nonce = predict_proxy_address(
            MODULE_PROXY_FACTORY_ADDRESS,
            mastercopy,
            &initializer,
            U256::from(0xfb),
        );

        assert_eq!(first, second);
        assert_ne!(first, other_nonce);
    }
}
