//! Ledger and wallet integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variable (private key)
//!     → wallet.rs (key loading, approval prompts)
//!     → client.rs (RPC providers with timeouts and failover)
//!         request_account / read / write / await_confirmation
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC requests have configurable timeouts; confirmation waits do not

pub mod client;
pub mod types;
pub mod wallet;

pub use client::{ChainClient, RpcChainClient};
pub use types::{ChainConfig, ChainError, ChainId, ChainResult, ContractCall, PendingTx, Receipt};
pub use wallet::Wallet;
