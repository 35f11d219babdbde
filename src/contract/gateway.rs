//! Typed access to the deployed answer contract.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use alloy::sol;
use alloy::sol_types::{SolCall, SolEvent, SolValue};

use crate::chain::client::ChainClient;
use crate::chain::types::{ChainError, ChainResult, ContractCall, PendingTx, Receipt};
use crate::contract::answer::AnswerState;

sol! {
    /// Records the caller's answer.
    function answer(bool yes) external;

    /// Stored answer: 0 unanswered, 1 yes, 2 no.
    function response() external view returns (uint8);

    /// Emitted when an answer is recorded.
    #[derive(Debug, PartialEq, Eq)]
    event AnswerGiven(address indexed from, uint8 answer);
}

/// Translates answer operations into chain calls for one contract.
///
/// Holds no state of its own; cloning shares the client.
#[derive(Clone)]
pub struct ContractGateway {
    client: Arc<dyn ChainClient>,
    address: Address,
}

impl ContractGateway {
    pub fn new(client: Arc<dyn ChainClient>, address: Address) -> Self {
        Self { client, address }
    }

    /// Contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Read the stored answer.
    pub async fn fetch_answer(&self) -> ChainResult<AnswerState> {
        let call = ContractCall::new(self.address, responseCall {}.abi_encode());
        let raw = self.client.read(call).await?;

        let value = U256::abi_decode(&raw).map_err(|e| {
            ChainError::ProtocolMismatch(format!("undecodable response() data: {}", e))
        })?;
        AnswerState::from_raw(value)
    }

    /// Submit an answer; the handle is the client's, unchanged.
    pub async fn submit_answer(&self, yes: bool) -> ChainResult<PendingTx> {
        let call = ContractCall::new(self.address, answerCall { yes }.abi_encode());
        self.client.write(call).await
    }

    /// Find this contract's `AnswerGiven` event in a receipt.
    pub fn answer_event(&self, receipt: &Receipt) -> Option<AnswerGiven> {
        receipt
            .logs
            .iter()
            .filter(|log| log.address == self.address)
            .find_map(|log| AnswerGiven::decode_log_data(&log.data).ok())
    }
}

impl std::fmt::Debug for ContractGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractGateway")
            .field("address", &self.address)
            .finish()
    }
}
