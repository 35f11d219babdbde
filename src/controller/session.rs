//! Session state and the snapshots published from it.

use alloy::primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chain::types::ChainError;
use crate::contract::answer::AnswerState;
use crate::controller::phase::Phase;

/// Mutable state for one page/process lifetime.
///
/// Owned by the controller, which is its only writer.
#[derive(Debug, Clone)]
pub struct Session {
    /// Correlates log lines for this session.
    pub id: Uuid,
    /// Set once per connection.
    pub account: Option<Address>,
    /// Written only from a successful read.
    pub answer: AnswerState,
    /// True exactly while a write is submitting or confirming.
    pub pending: bool,
    /// Last transaction the network accepted.
    pub last_tx_id: Option<TxHash>,
    /// Last surfaced error.
    pub last_error: Option<ChainError>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            account: None,
            answer: AnswerState::Unanswered,
            pending: false,
            last_tx_id: None,
            last_error: None,
        }
    }

    /// Immutable view for presentation.
    pub fn snapshot(&self, phase: Phase) -> Snapshot {
        Snapshot {
            account: self.account,
            answer: self.answer,
            pending: self.pending,
            last_tx_id: self.last_tx_id,
            last_error: self.last_error.clone(),
            phase,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// What the presentation layer sees after each transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub account: Option<Address>,
    pub answer: AnswerState,
    pub pending: bool,
    pub last_tx_id: Option<TxHash>,
    pub last_error: Option<ChainError>,
    pub phase: Phase,
}

impl Snapshot {
    /// Block explorer link for the last accepted transaction.
    pub fn explorer_url(&self, explorer_tx_url: &str) -> Option<String> {
        self.last_tx_id
            .map(|hash| format!("{}{}", explorer_tx_url, hash))
    }
}
