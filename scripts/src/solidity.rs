//! Definitions of Solidity contracts called during deployment

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use alloy::sol;

sol! {
    /// The ERC-2470 singleton factory
    #[sol(rpc)]
    interface ISingletonFactory {
        function deploy(bytes memory _initCode, bytes32 _salt) external returns (address createdContract);
    }
}

sol! {
    /// The Zodiac module proxy factory
    #[sol(rpc)]
    interface IModuleProxyFactory {
        function deployModule(address masterCopy, bytes memory initializer, uint256 saltNonce) external returns (address proxy);

        event ModuleProxyCreation(address indexed proxy, address indexed masterCopy);
    }
}

sol! {
    /// The module management surface of a Safe-like avatar
    #[sol(rpc)]
    interface IAvatar {
        function enableModule(address module) external;

        function isModuleEnabled(address module) external view returns (bool);
    }
}
