//! Metrics collection and exposition.
//!
//! # Metrics
//! - `onchain_answer_transitions_total` (counter): controller transitions by phase
//! - `onchain_answer_tx_total` (counter): write outcomes (confirmed or error kind)
//! - `onchain_answer_reads_total` (counter): read outcomes
//! - `onchain_answer_intents_dropped_total` (counter): intents ignored while busy
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::controller::phase::Phase;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_transition(phase: Phase) {
    counter!("onchain_answer_transitions_total", "phase" => phase.as_str()).increment(1);
}

pub fn record_tx(outcome: &'static str) {
    counter!("onchain_answer_tx_total", "outcome" => outcome).increment(1);
}

pub fn record_read(outcome: &'static str) {
    counter!("onchain_answer_reads_total", "outcome" => outcome).increment(1);
}

pub fn record_intent_dropped() {
    counter!("onchain_answer_intents_dropped_total").increment(1);
}
