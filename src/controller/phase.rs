//! Controller phases.

use serde::{Deserialize, Serialize};

/// Where the transaction controller is in its lifecycle.
///
/// ```text
/// Disconnected → Connecting → Reading → Idle → Submitting → Confirming ─┐
///      ▲              │          ▲       ▲  ▲       │            │       │
///      └──── error ───┘          │       │  └─error─┴────error───┘       │
///                                └───────┴──────────── confirmed ────────┘
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Disconnected,
    Connecting,
    Reading,
    Idle,
    Submitting,
    Confirming,
}

impl Phase {
    /// A write is between broadcast request and settlement.
    pub fn is_write_in_flight(self) -> bool {
        matches!(self, Phase::Submitting | Phase::Confirming)
    }

    /// No chain call is outstanding.
    pub fn is_stable(self) -> bool {
        matches!(self, Phase::Disconnected | Phase::Idle)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Disconnected => "disconnected",
            Phase::Connecting => "connecting",
            Phase::Reading => "reading",
            Phase::Idle => "idle",
            Phase::Submitting => "submitting",
            Phase::Confirming => "confirming",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
