//! Structured logging.
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies to
//! this crate and `warn` to everything else. Output goes to stderr so
//! rendered snapshots on stdout stay machine-readable.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive used when `RUST_LOG` is absent.
pub fn default_directive(log_level: &str) -> String {
    format!("warn,onchain_answer={}", log_level)
}

/// Install the global tracing subscriber.
pub fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(log_level)));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}
