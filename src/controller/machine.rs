//! The transaction lifecycle state machine.
//!
//! Drives connect → read → submit → confirm → re-read against the chain,
//! publishing a snapshot after every transition. At most one chain call is
//! outstanding; intents that arrive meanwhile are dropped, not queued.

use std::future::Future;
use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::sleep;
use tracing::{Instrument, Span};

use crate::chain::client::ChainClient;
use crate::chain::types::ChainError;
use crate::config::PolicyConfig;
use crate::contract::gateway::ContractGateway;
use crate::controller::phase::Phase;
use crate::controller::session::{Session, Snapshot};
use crate::observability::metrics;
use crate::resilience::backoff::poll_delay;

/// A user intent from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Connect,
    Answer(bool),
    Refresh,
}

/// Presentation-side handle: intents in, snapshots out.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    intents: mpsc::UnboundedSender<Intent>,
    snapshots: watch::Receiver<Snapshot>,
}

impl ControllerHandle {
    pub fn connect(&self) {
        self.send(Intent::Connect);
    }

    pub fn answer_yes(&self) {
        self.send(Intent::Answer(true));
    }

    pub fn answer_no(&self) {
        self.send(Intent::Answer(false));
    }

    pub fn refresh(&self) {
        self.send(Intent::Refresh);
    }

    pub fn send(&self, intent: Intent) {
        if self.intents.send(intent).is_err() {
            tracing::debug!(?intent, "Controller stopped; intent discarded");
        }
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every transition.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Wait until a snapshot satisfies `predicate`.
    ///
    /// Returns `None` if the controller is gone.
    pub async fn wait_for(&self, predicate: impl FnMut(&Snapshot) -> bool) -> Option<Snapshot> {
        let mut rx = self.subscribe();
        let snapshot = rx.wait_for(predicate).await.ok()?;
        Some(snapshot.clone())
    }
}

/// Owns the session and is its only writer.
pub struct TransactionController {
    client: Arc<dyn ChainClient>,
    gateway: ContractGateway,
    policy: PolicyConfig,
    session: Session,
    phase: Phase,
    snapshots: watch::Sender<Snapshot>,
    intents: mpsc::UnboundedReceiver<Intent>,
    /// Carries the session id on every event the controller emits.
    span: Span,
}

impl TransactionController {
    /// Create a controller for the contract at `contract`.
    pub fn new(
        client: Arc<dyn ChainClient>,
        contract: Address,
        policy: PolicyConfig,
    ) -> (Self, ControllerHandle) {
        let session = Session::new();
        let phase = Phase::Disconnected;
        let span = tracing::info_span!("session", id = %session.id);
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot(phase));
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();

        let controller = Self {
            gateway: ContractGateway::new(client.clone(), contract),
            client,
            policy,
            session,
            phase,
            snapshots: snapshot_tx,
            intents: intent_rx,
            span,
        };
        let handle = ControllerHandle {
            intents: intent_tx,
            snapshots: snapshot_rx,
        };
        (controller, handle)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn snapshot(&self) -> Snapshot {
        self.session.snapshot(self.phase)
    }

    /// Process intents until every handle is dropped or shutdown fires.
    ///
    /// Shutdown is observed between intents only; an in-flight
    /// confirmation is never cancelled programmatically.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        let span = self.span.clone();
        async move {
            tracing::info!(contract = %self.gateway.address(), "Transaction controller started");

            loop {
                tokio::select! {
                    intent = self.intents.recv() => match intent {
                        Some(intent) => self.dispatch(intent).await,
                        None => break,
                    },
                    _ = shutdown.recv() => {
                        tracing::info!("Controller received shutdown signal");
                        break;
                    }
                }
            }

            tracing::info!(phase = %self.phase, "Transaction controller stopped");
        }
        .instrument(span)
        .await
    }

    pub async fn dispatch(&mut self, intent: Intent) {
        match intent {
            Intent::Connect => self.connect().await,
            Intent::Answer(yes) => {
                self.answer(yes).await;
            }
            Intent::Refresh => self.refresh().await,
        }
    }

    /// Disconnected → Connecting → Reading → Idle.
    pub async fn connect(&mut self) {
        let span = self.span.clone();
        self.on_connect().instrument(span).await
    }

    /// Idle → Submitting → Confirming → Reading → Idle.
    ///
    /// Returns false when the intent was ignored; failures still return true.
    pub async fn answer(&mut self, yes: bool) -> bool {
        let span = self.span.clone();
        self.on_answer(yes).instrument(span).await
    }

    /// Idle → Reading → Idle.
    pub async fn refresh(&mut self) {
        let span = self.span.clone();
        self.on_refresh().instrument(span).await
    }

    async fn on_connect(&mut self) {
        if self.phase != Phase::Disconnected {
            self.ignore(Intent::Connect);
            return;
        }

        self.session.last_error = None;
        self.enter(Phase::Connecting);

        let client = self.client.clone();
        match self.guarded(client.request_account()).await {
            Ok(account) => {
                tracing::info!(%account, "Wallet connected");
                self.session.account = Some(account);
                self.read().await;
            }
            Err(e) => self.fail(e, Phase::Disconnected),
        }
    }

    async fn on_answer(&mut self, yes: bool) -> bool {
        if self.phase != Phase::Idle {
            self.ignore(Intent::Answer(yes));
            return false;
        }
        if self.session.answer.is_answered() && !self.policy.allow_resubmit {
            tracing::info!(
                answer = %self.session.answer,
                "Answer already recorded; resubmission disabled"
            );
            self.ignore(Intent::Answer(yes));
            return false;
        }

        self.session.last_error = None;
        self.enter(Phase::Submitting);

        let gateway = self.gateway.clone();
        let pending_tx = match self.guarded(gateway.submit_answer(yes)).await {
            Ok(tx) => tx,
            Err(e) => {
                metrics::record_tx(e.kind());
                self.fail(e, Phase::Idle);
                return true;
            }
        };

        tracing::info!(tx_hash = %pending_tx.hash, yes, "Answer submitted");
        self.session.last_tx_id = Some(pending_tx.hash);
        self.enter(Phase::Confirming);

        let client = self.client.clone();
        match self.guarded(client.await_confirmation(&pending_tx)).await {
            Ok(receipt) => {
                metrics::record_tx("confirmed");
                tracing::info!(
                    tx_hash = %receipt.tx_hash,
                    block = receipt.block_number,
                    "Answer confirmed"
                );
                if let Some(event) = gateway.answer_event(&receipt) {
                    tracing::info!(from = %event.from, answer = event.answer, "AnswerGiven emitted");
                }
                self.read().await;
            }
            Err(e) => {
                metrics::record_tx(e.kind());
                self.fail(e, Phase::Idle);
            }
        }
        true
    }

    async fn on_refresh(&mut self) {
        if self.phase != Phase::Idle {
            self.ignore(Intent::Refresh);
            return;
        }

        self.session.last_error = None;
        self.read().await;
    }

    /// Reconcile `answer` with the ledger. Always lands in Idle.
    async fn read(&mut self) {
        self.enter(Phase::Reading);

        let gateway = self.gateway.clone();
        let mut result = self.guarded(gateway.fetch_answer()).await;

        if matches!(&result, Err(e) if e.is_transient()) {
            metrics::record_read("retried");
            let delay = poll_delay(0, self.policy.read_retry_delay_ms, self.policy.read_retry_delay_ms);
            tracing::debug!(?delay, "Read failed; retrying once");
            result = self
                .guarded(async {
                    sleep(delay).await;
                    gateway.fetch_answer().await
                })
                .await;
        }

        match result {
            Ok(answer) => {
                metrics::record_read("ok");
                self.session.answer = answer;
                self.enter(Phase::Idle);
            }
            Err(e) => {
                metrics::record_read(e.kind());
                self.fail(e, Phase::Idle);
            }
        }
    }

    /// Await `fut`, dropping any intent that arrives in the meantime.
    async fn guarded<F: Future>(&mut self, fut: F) -> F::Output {
        tokio::pin!(fut);
        loop {
            tokio::select! {
                biased;
                Some(intent) = self.intents.recv() => self.ignore(intent),
                out = &mut fut => return out,
            }
        }
    }

    fn ignore(&self, intent: Intent) {
        metrics::record_intent_dropped();
        tracing::debug!(phase = %self.phase, ?intent, "Intent ignored");
    }

    /// Surface `error` and settle in `stable`.
    fn fail(&mut self, error: ChainError, stable: Phase) {
        debug_assert!(stable.is_stable());
        tracing::warn!(
            phase = %self.phase,
            kind = error.kind(),
            error = %error,
            "Chain operation failed"
        );
        self.session.last_error = Some(error);
        self.enter(stable);
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!(from = %self.phase, to = %phase, "Transition");
        self.phase = phase;
        self.session.pending = phase.is_write_in_flight();
        metrics::record_transition(phase);
        self.snapshots.send_replace(self.session.snapshot(phase));
    }
}

impl std::fmt::Debug for TransactionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionController")
            .field("session", &self.session.id)
            .field("phase", &self.phase)
            .field("gateway", &self.gateway)
            .finish()
    }
}
