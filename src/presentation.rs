//! Text rendering of controller snapshots.
//!
//! Pure functions of the latest snapshot; nothing here writes back into the
//! controller.

use crate::contract::answer::AnswerState;
use crate::controller::{Phase, Snapshot};

/// Render a snapshot as the lines shown to the user.
pub fn render(snapshot: &Snapshot, explorer_tx_url: &str) -> String {
    let mut lines = Vec::new();

    match (snapshot.account, snapshot.phase) {
        (_, Phase::Connecting) => lines.push("Waiting for the wallet...".to_string()),
        (None, _) => lines.push("Wallet not connected. Use `connect`.".to_string()),
        (Some(account), _) => lines.push(format!("Connected as {}", account)),
    }

    if snapshot.pending {
        lines.push("Sending your answer to the chain...".to_string());
    } else if snapshot.phase == Phase::Reading {
        lines.push("Reading the answer from the chain...".to_string());
    } else if snapshot.account.is_some() {
        match snapshot.answer {
            AnswerState::Unanswered => lines.push("No answer yet. Use `yes` or `no`.".to_string()),
            answer => lines.push(format!("You answered: {}", answer)),
        }
    }

    if let Some(url) = snapshot.explorer_url(explorer_tx_url) {
        lines.push(format!("Transaction: {}", url));
    }

    if let Some(error) = &snapshot.last_error {
        lines.push(format!("Error: {}", error));
    }

    lines.join("\n")
}
