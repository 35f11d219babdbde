//! Transaction lifecycle controller.
//!
//! # Data Flow
//! ```text
//! presentation ── Intent ──▶ ControllerHandle ──mpsc──▶ TransactionController
//!                                                          │  ContractGateway
//!                                                          ▼  ChainClient
//! presentation ◀── Snapshot ── watch ◀──── enter(phase) ◀──┘
//! ```
//!
//! # Design Decisions
//! - `answer` is only ever written from a successful read
//! - `pending` is derived from the phase on every transition
//! - Every error lands the machine in Disconnected or Idle

pub mod machine;
pub mod phase;
pub mod session;

pub use machine::{ControllerHandle, Intent, TransactionController};
pub use phase::Phase;
pub use session::{Session, Snapshot};
