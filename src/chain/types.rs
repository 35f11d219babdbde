//! Chain-specific types and error definitions.

use alloy::primitives::{Address, Bytes, Log, TxHash};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export ChainConfig from config module to avoid duplication
pub use crate::config::schema::ChainConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors surfaced by wallet and ledger operations.
///
/// The `Display` text is shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ChainError {
    /// No usable wallet: nothing to sign with.
    #[error("Wallet unavailable: {0}")]
    WalletUnavailable(String),

    /// The user declined a wallet prompt.
    #[error("Request rejected by user: {0}")]
    UserRejected(String),

    /// RPC or connectivity failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The node refused the transaction before broadcast.
    #[error("Transaction submission failed: {0}")]
    Submission(String),

    /// Included on-chain but execution failed.
    #[error("Transaction {tx_hash} reverted")]
    Reverted { tx_hash: TxHash },

    /// The contract returned data outside the expected encoding.
    #[error("Unexpected contract response: {0}")]
    ProtocolMismatch(String),
}

impl ChainError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ChainError::WalletUnavailable(_) => "wallet_unavailable",
            ChainError::UserRejected(_) => "user_rejected",
            ChainError::Network(_) => "network",
            ChainError::Submission(_) => "submission",
            ChainError::Reverted { .. } => "reverted",
            ChainError::ProtocolMismatch(_) => "protocol_mismatch",
        }
    }

    /// Whether a read failing with this error may be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, ChainError::Network(_))
    }
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// An ABI-encoded call against a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    /// Target contract.
    pub to: Address,
    /// Selector plus encoded arguments.
    pub data: Bytes,
}

impl ContractCall {
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to,
            data: data.into(),
        }
    }
}

/// A transaction the network accepted but has not yet confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTx {
    pub hash: TxHash,
}

/// Confirmation record of a transaction that executed successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// Logs emitted during execution.
    pub logs: Vec<Log>,
}
