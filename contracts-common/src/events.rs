//! Decoding of factory events from receipt logs

use alloy_primitives::{Address, Log};
use alloy_sol_types::SolEvent;

use crate::solidity::ModuleProxyCreation;

/// A proxy creation emitted by the module proxy factory
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProxyCreation {
    /// The deployed proxy
    pub proxy: Address,
    /// The mastercopy the proxy delegates to
    pub mastercopy: Address,
}

/// Finds the `ModuleProxyCreation` event emitted by `factory` among `logs`.
///
/// Both event parameters are indexed, so they are read from the topics by
/// position rather than from the log data.
pub fn parse_proxy_creation<'a>(
    logs: impl IntoIterator<Item = &'a Log>,
    factory: Address,
) -> Option<ProxyCreation> {
    logs.into_iter()
        .filter(|log| log.address == factory)
        .find_map(|log| {
            let topics = log.topics();
            if topics.len() != 3 || topics[0] != ModuleProxyCreation::SIGNATURE_HASH {
                return None;
            }

            Some(ProxyCreation {
                proxy: Address::from_word(topics[1]),
                mastercopy: Address::from_word(topics[2]),
            })
        })
}
