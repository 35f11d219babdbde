//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Wallet → RpcChainClient → TransactionController
//!
//! Shutdown (shutdown.rs):
//!     Trigger → controller loop exits between intents → renderer exits
//!
//! Signals (signals.rs):
//!     Ctrl-C → trigger shutdown
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
