//! Local signing wallet with terminal approval prompts.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized
//! - With approval enabled, nothing is revealed or signed without a "y"

use std::io::{BufRead, Write};

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;

use crate::chain::types::{ChainError, ChainResult};
use crate::config::WalletConfig;

/// The user's signing agent.
#[derive(Debug, Clone)]
pub struct Wallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
    /// Chain ID for EIP-155 replay protection.
    chain_id: u64,
    /// Prompt before revealing the account or signing.
    require_approval: bool,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `chain_id` - Chain ID for transaction signing
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> ChainResult<Self> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let mut signer: PrivateKeySigner = key_hex.parse().map_err(|e| {
            ChainError::WalletUnavailable(format!("Invalid private key format: {}", e))
        })?;
        signer.set_chain_id(Some(chain_id));

        tracing::info!(address = %signer.address(), chain_id, "Wallet loaded");

        Ok(Self {
            signer,
            chain_id,
            require_approval: false,
        })
    }

    /// Load the wallet from the environment variable named in `config`.
    pub fn from_env(config: &WalletConfig, chain_id: u64) -> ChainResult<Self> {
        let private_key = std::env::var(&config.private_key_env).map_err(|_| {
            ChainError::WalletUnavailable(format!(
                "Environment variable {} not set",
                config.private_key_env
            ))
        })?;

        Ok(Self::from_private_key(&private_key, chain_id)?
            .with_approval(config.require_approval))
    }

    /// Enable or disable terminal approval prompts.
    pub fn with_approval(mut self, require_approval: bool) -> Self {
        self.require_approval = require_approval;
        self
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Get the chain ID this wallet is configured for.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Network wallet used by the signing provider.
    pub fn network_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }

    /// Ask the user to approve `action`.
    ///
    /// Blocks on the terminal without a deadline; anything but "y"/"yes"
    /// is a rejection.
    pub async fn approve(&self, action: &str) -> ChainResult<()> {
        if !self.require_approval {
            return Ok(());
        }

        let question = format!("{} [y/N] ", action);
        let answer = tokio::task::spawn_blocking(move || -> std::io::Result<String> {
            let mut stderr = std::io::stderr();
            stderr.write_all(question.as_bytes())?;
            stderr.flush()?;
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            Ok(line)
        })
        .await
        .map_err(|e| ChainError::WalletUnavailable(format!("Approval prompt failed: {}", e)))?
        .map_err(|e| ChainError::WalletUnavailable(format!("Approval prompt failed: {}", e)))?;

        if is_affirmative(&answer) {
            Ok(())
        } else {
            tracing::info!(action, "Wallet prompt declined");
            Err(ChainError::UserRejected(action.to_string()))
        }
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
