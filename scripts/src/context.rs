//! The state a command carries while running against one network

use std::sync::Arc;

use alloy::{network::EthereumWallet, primitives::Address, providers::DynProvider};

use crate::{
    config::{NetworkProfile, Settings},
    deployments::Ledger,
    errors::ScriptError,
    utils::setup_client,
};

/// A connected network and its deployments ledger
pub struct NetworkContext {
    /// The network profile
    pub network: NetworkProfile,
    /// The run's settings
    pub settings: Arc<Settings>,
    /// The signing client
    pub client: DynProvider,
    /// The wallet deployment transactions are signed with
    pub wallet: EthereumWallet,
    /// The address transactions are sent from
    pub sender: Address,
    /// The network's deployments ledger
    pub ledger: Ledger,
}

impl NetworkContext {
    /// Connects to `network` and opens its ledger
    pub async fn connect(network: NetworkProfile, settings: Arc<Settings>) -> Result<Self, ScriptError> {
        let (client, wallet, sender) = setup_client(&settings, &network).await?;
        let ledger = Ledger::open(&settings.paths.ledger_path(&network.name), network.chain_id)?;

        Ok(Self {
            network,
            settings,
            client,
            wallet,
            sender,
            ledger,
        })
    }
}
