//! The answer stored on-chain.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::chain::types::{ChainError, ChainResult};

/// Answer as last read from the contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerState {
    #[default]
    Unanswered,
    Yes,
    No,
}

impl AnswerState {
    /// Map the contract's raw `response()` value: 0, 1 or 2.
    pub fn from_raw(raw: U256) -> ChainResult<Self> {
        match u8::try_from(raw) {
            Ok(0) => Ok(Self::Unanswered),
            Ok(1) => Ok(Self::Yes),
            Ok(2) => Ok(Self::No),
            _ => Err(ChainError::ProtocolMismatch(format!(
                "response() returned {}, expected 0, 1 or 2",
                raw
            ))),
        }
    }

    pub fn is_answered(self) -> bool {
        self != Self::Unanswered
    }
}

impl From<bool> for AnswerState {
    fn from(yes: bool) -> Self {
        if yes {
            Self::Yes
        } else {
            Self::No
        }
    }
}

impl std::fmt::Display for AnswerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Unanswered => "Unanswered",
            Self::Yes => "Yes",
            Self::No => "No",
        };
        f.write_str(label)
    }
}
