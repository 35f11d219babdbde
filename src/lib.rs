//! Wallet-driven client for a single on-chain yes/no answer.

pub mod chain;
pub mod config;
pub mod contract;
pub mod controller;
pub mod lifecycle;
pub mod observability;
pub mod presentation;
pub mod resilience;

pub use config::AppConfig;
pub use controller::{ControllerHandle, Snapshot, TransactionController};
pub use lifecycle::Shutdown;
