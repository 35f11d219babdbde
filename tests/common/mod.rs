//! Shared mock ledger and helpers for controller tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{address, Address, Bytes, Log, TxHash, U256};
use alloy::sol_types::{SolEvent, SolValue};
use async_trait::async_trait;
use tokio::sync::Notify;

use onchain_answer::chain::{ChainClient, ChainError, ChainResult, ContractCall, PendingTx, Receipt};
use onchain_answer::config::PolicyConfig;
use onchain_answer::contract::AnswerGiven;
use onchain_answer::controller::{ControllerHandle, Snapshot, TransactionController};
use onchain_answer::lifecycle::Shutdown;

pub mod rpc;

pub const ACCOUNT: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const CONTRACT: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

#[derive(Default)]
struct Ledger {
    stored: U256,
    account_error: Option<ChainError>,
    read_failures: VecDeque<ChainError>,
    write_error: Option<ChainError>,
    confirm_error: Option<ChainError>,
    in_flight: Option<bool>,
}

/// In-memory ledger with injectable failures.
///
/// Accepted writes take effect at confirmation, like a mined transaction.
#[derive(Default)]
pub struct MockChain {
    ledger: Mutex<Ledger>,
    hold: AtomicBool,
    release: Notify,
    writes: AtomicU32,
    reads: AtomicU32,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Overwrite the raw stored value, as another writer would.
    pub fn set_stored(&self, raw: u64) {
        self.ledger.lock().unwrap().stored = U256::from(raw);
    }

    /// Fail the next account request.
    pub fn fail_account(&self, error: ChainError) {
        self.ledger.lock().unwrap().account_error = Some(error);
    }

    /// Fail the next reads, one error per read.
    pub fn fail_next_reads(&self, errors: impl IntoIterator<Item = ChainError>) {
        self.ledger.lock().unwrap().read_failures.extend(errors);
    }

    /// Fail the next write before broadcast.
    pub fn fail_write(&self, error: ChainError) {
        self.ledger.lock().unwrap().write_error = Some(error);
    }

    /// Fail the next confirmation.
    pub fn fail_confirmation(&self, error: ChainError) {
        self.ledger.lock().unwrap().confirm_error = Some(error);
    }

    /// Park confirmations until `release_confirmation`.
    pub fn hold_confirmations(&self) {
        self.hold.store(true, Ordering::SeqCst);
    }

    pub fn release_confirmation(&self) {
        self.hold.store(false, Ordering::SeqCst);
        self.release.notify_one();
    }

    /// Broadcast transactions accepted so far.
    pub fn writes(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn request_account(&self) -> ChainResult<Address> {
        match self.ledger.lock().unwrap().account_error.take() {
            Some(error) => Err(error),
            None => Ok(ACCOUNT),
        }
    }

    async fn read(&self, call: ContractCall) -> ChainResult<Bytes> {
        assert_eq!(call.to, CONTRACT);
        self.reads.fetch_add(1, Ordering::SeqCst);

        let mut ledger = self.ledger.lock().unwrap();
        match ledger.read_failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(ledger.stored.abi_encode().into()),
        }
    }

    async fn write(&self, call: ContractCall) -> ChainResult<PendingTx> {
        assert_eq!(call.to, CONTRACT);
        let mut ledger = self.ledger.lock().unwrap();
        if let Some(error) = ledger.write_error.take() {
            return Err(error);
        }

        let yes = call.data.last() == Some(&1);
        ledger.in_flight = Some(yes);
        let count = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(PendingTx {
            hash: TxHash::with_last_byte(count as u8),
        })
    }

    async fn await_confirmation(&self, tx: &PendingTx) -> ChainResult<Receipt> {
        if self.hold.load(Ordering::SeqCst) {
            self.release.notified().await;
        }

        let mut ledger = self.ledger.lock().unwrap();
        let yes = ledger.in_flight.take().expect("confirmation without a write");
        if let Some(error) = ledger.confirm_error.take() {
            return Err(error);
        }

        let raw: u8 = if yes { 1 } else { 2 };
        ledger.stored = U256::from(raw);
        Ok(Receipt {
            tx_hash: tx.hash,
            block_number: 1,
            logs: vec![Log {
                address: CONTRACT,
                data: AnswerGiven {
                    from: ACCOUNT,
                    answer: raw,
                }
                .encode_log_data(),
            }],
        })
    }
}

/// Policy with a negligible read retry delay.
pub fn policy() -> PolicyConfig {
    PolicyConfig {
        allow_resubmit: false,
        read_retry_delay_ms: 1,
    }
}

pub fn controller(
    chain: &Arc<MockChain>,
    policy: PolicyConfig,
) -> (TransactionController, ControllerHandle) {
    TransactionController::new(chain.clone(), CONTRACT, policy)
}

/// Run a controller in the background.
///
/// Keep the returned `Shutdown` alive for the duration of the test.
pub fn spawn(chain: &Arc<MockChain>, policy: PolicyConfig) -> (ControllerHandle, Shutdown) {
    let (controller, handle) = controller(chain, policy);
    let shutdown = Shutdown::new();
    tokio::spawn(controller.run(shutdown.subscribe()));
    (handle, shutdown)
}

/// Wait for a snapshot matching `predicate`, failing the test after 5s.
pub async fn wait(handle: &ControllerHandle, predicate: impl FnMut(&Snapshot) -> bool) -> Snapshot {
    tokio::time::timeout(Duration::from_secs(5), handle.wait_for(predicate))
        .await
        .expect("timed out waiting for snapshot")
        .expect("controller stopped")
}

/// Let the controller task drain its queue.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
