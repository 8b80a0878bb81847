//! Solidity function, event, and error definitions used to build and decode
//! deployment payloads

#![allow(missing_docs)]

use alloy_sol_types::sol;

// The one-time initializer shared by every Zodiac-style mastercopy
sol! {
    function setUp(bytes initializeParams) public;
}

// The batched call exposed by the Gnosis `MultiSend` contract
sol! {
    function multiSend(bytes transactions) external payable;
}

// The Zodiac `ModuleProxyFactory` interface
sol! {
    function deployModule(address masterCopy, bytes initializer, uint256 saltNonce) public returns (address proxy);

    event ModuleProxyCreation(address indexed proxy, address indexed masterCopy);
}

// The ERC-2470 singleton factory interface
sol! {
    function deploy(bytes _initCode, bytes32 _salt) public returns (address createdContract);
}

// Custom errors raised by the factory and the governor contracts
sol! {
    interface GovernorErrors {
        error TargetHasNoCode(address target);
        error ZeroAddress(address target);
        error TakenAddress(address address_);
        error FailedInitialization();
        error NoTransactions();
        error UnequalArraysLengths();
        error TransactionsFailed();
        error NotAuthorized(address sender);
    }
}
