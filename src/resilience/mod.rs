//! Resilience helpers.
//!
//! # Data Flow
//! ```text
//! Receipt polling (chain::client):
//!     → backoff.rs (growing, capped, jittered delay between polls)
//!
//! Read retry (controller):
//!     → backoff.rs (single jittered pause before the one retry)
//! ```
//!
//! # Design Decisions
//! - No deadline on confirmation waits; only the poll spacing grows
//! - Retries only for idempotent reads, and at most once

pub mod backoff;
