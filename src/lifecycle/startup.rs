//! Startup wiring: config → wallet → chain client → controller.
//!
//! A missing wallet or unreachable RPC does not stop startup; both surface
//! through the controller as ordinary errors. Only a config that names no
//! usable contract is fatal.

use std::sync::Arc;

use alloy::primitives::Address;
use thiserror::Error;

use crate::chain::{ChainError, RpcChainClient, Wallet};
use crate::config::AppConfig;
use crate::controller::{ControllerHandle, TransactionController};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid contract address '{0}'")]
    ContractAddress(String),

    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Build the controller described by `config`.
pub async fn build_controller(
    config: &AppConfig,
) -> Result<(TransactionController, ControllerHandle), StartupError> {
    let contract: Address = config
        .contract
        .address
        .parse()
        .map_err(|_| StartupError::ContractAddress(config.contract.address.clone()))?;

    let wallet = Wallet::from_env(&config.wallet, config.chain.chain_id);
    let client = RpcChainClient::new(config.chain.clone(), wallet).await?;
    tracing::debug!(?client, %contract, "Chain client ready");

    Ok(TransactionController::new(
        Arc::new(client),
        contract,
        config.policy.clone(),
    ))
}
