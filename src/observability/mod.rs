//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! controller transitions, chain calls:
//!     → logging.rs (structured tracing events, session id field)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stderr
//!     → Prometheus scrape (when enabled)
//! ```

pub mod logging;
pub mod metrics;
