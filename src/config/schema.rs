//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the answer client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// RPC endpoints and confirmation settings.
    pub chain: ChainConfig,

    /// The deployed answer contract.
    pub contract: ContractConfig,

    /// Signing key source and approval prompts.
    pub wallet: WalletConfig,

    /// Controller policy knobs.
    pub policy: PolicyConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Chain connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs, used for reads and receipt polling.
    pub failover_urls: Vec<String>,

    /// Chain ID (e.g., 1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// Per-request RPC timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Blocks of depth required before a receipt counts as confirmed.
    /// The inclusion block counts as the first.
    pub confirmation_blocks: u32,

    /// Initial delay between receipt polls in milliseconds.
    pub poll_interval_ms: u64,

    /// Upper bound for the receipt poll delay in milliseconds.
    pub max_poll_interval_ms: u64,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_gas_price_gwei: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 1,
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
            poll_interval_ms: 1000,
            max_poll_interval_ms: 8000,
            max_gas_price_gwei: 500,
        }
    }
}

/// Answer contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Address of the deployed contract.
    pub address: String,

    /// Block explorer prefix; the transaction hash is appended to it.
    pub explorer_tx_url: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            explorer_tx_url: "https://etherscan.io/tx/".to_string(),
        }
    }
}

/// Wallet configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Name of the environment variable holding the private key.
    pub private_key_env: String,

    /// Ask on the terminal before revealing the account or signing.
    pub require_approval: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            private_key_env: "ONCHAIN_ANSWER_PRIVATE_KEY".to_string(),
            require_approval: true,
        }
    }
}

/// Controller policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Accept a new answer after one has already settled on-chain.
    /// Whether the contract honours an overwrite is up to the contract.
    pub allow_resubmit: bool,

    /// Base delay before the single automatic read retry, in milliseconds.
    pub read_retry_delay_ms: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            allow_resubmit: false,
            read_retry_delay_ms: 250,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
