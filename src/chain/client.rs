//! Ledger access: the `ChainClient` seam and its JSON-RPC implementation.
//!
//! # Responsibilities
//! - Discover the active account through the wallet
//! - Execute read-only contract calls with provider failover
//! - Sign and broadcast mutating calls
//! - Poll receipts until a transaction is confirmed or reverted

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::transports::TransportResult;
use async_trait::async_trait;
use tokio::time::{sleep, timeout};

use crate::chain::types::{
    ChainConfig, ChainError, ChainId, ChainResult, ContractCall, PendingTx, Receipt,
};
use crate::chain::wallet::Wallet;
use crate::resilience::backoff::poll_delay;

type DynProvider = Arc<dyn Provider + Send + Sync>;

const GWEI: u128 = 1_000_000_000;

/// Wallet-backed access to the ledger.
///
/// Every method is a suspension point. `request_account` and `write` may
/// wait on the user without a deadline, and so may `await_confirmation`
/// on the network.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Ask the wallet for the active account.
    async fn request_account(&self) -> ChainResult<Address>;

    /// Execute a non-mutating call against the latest ledger state.
    async fn read(&self, call: ContractCall) -> ChainResult<Bytes>;

    /// Sign and broadcast a mutating call.
    ///
    /// Success only means the network accepted the transaction.
    async fn write(&self, call: ContractCall) -> ChainResult<PendingTx>;

    /// Wait until `tx` is included with enough depth, or fails.
    async fn await_confirmation(&self, tx: &PendingTx) -> ChainResult<Receipt>;
}

/// Signer plus the wallet-filled provider that broadcasts with it.
struct Signing {
    wallet: Wallet,
    provider: DynProvider,
}

/// JSON-RPC chain client with read failover.
pub struct RpcChainClient {
    /// Read providers (primary + failovers).
    readers: Vec<DynProvider>,
    /// Signing side, or why it is unavailable.
    signing: Result<Signing, ChainError>,
    /// Configuration.
    config: ChainConfig,
    /// Per-request timeout.
    timeout_duration: Duration,
}

impl RpcChainClient {
    /// Create a new chain client.
    ///
    /// A missing wallet is not fatal here; it surfaces as
    /// `WalletUnavailable` on the first call that needs it.
    pub async fn new(config: ChainConfig, wallet: ChainResult<Wallet>) -> ChainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);

        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            ChainError::Network(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;

        let mut readers: Vec<DynProvider> =
            vec![Arc::new(ProviderBuilder::new().connect_http(primary_url.clone()))];
        for url_str in &config.failover_urls {
            match url_str.parse::<url::Url>() {
                Ok(url) => readers.push(Arc::new(ProviderBuilder::new().connect_http(url))),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        let signing = wallet.map(|wallet| {
            let provider: DynProvider = Arc::new(
                ProviderBuilder::new()
                    .wallet(wallet.network_wallet())
                    .connect_http(primary_url),
            );
            Signing { wallet, provider }
        });
        if let Err(e) = &signing {
            tracing::warn!(error = %e, "No signing wallet; reads only");
        }

        let client = Self {
            readers,
            signing,
            config,
            timeout_duration,
        };

        match client.verify_chain_id().await {
            Ok(()) => tracing::info!(
                rpc_url = %client.config.rpc_url,
                chain_id = client.config.chain_id,
                "Chain client initialized"
            ),
            // Don't fail initialization; calls will surface their own errors.
            Err(e) => tracing::warn!(
                error = %e,
                "Chain client initialized but chain verification failed"
            ),
        }

        Ok(client)
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> ChainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(ChainError::ProtocolMismatch(format!(
                "Chain ID mismatch: expected {}, got {}",
                self.config.chain_id, chain_id.0
            )));
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> ChainResult<ChainId> {
        self.with_failover("get chain id", |p| async move { p.get_chain_id().await })
            .await
            .map(ChainId)
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> ChainResult<u64> {
        self.with_failover("get block number", |p| async move {
            p.get_block_number().await
        })
        .await
    }

    /// Get a transaction receipt by hash.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> ChainResult<Option<TransactionReceipt>> {
        self.with_failover("get receipt", move |p| async move {
            p.get_transaction_receipt(tx_hash).await
        })
        .await
    }

    fn signing(&self) -> ChainResult<&Signing> {
        self.signing.as_ref().map_err(Clone::clone)
    }

    /// Run `op` against each provider in order until one answers in time.
    async fn with_failover<T, F, Fut>(&self, op: &'static str, f: F) -> ChainResult<T>
    where
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        for (i, provider) in self.readers.iter().enumerate() {
            match timeout(self.timeout_duration, f(provider.clone())).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, op, error = %e, "RPC error, trying next provider")
                }
                Err(_) => tracing::warn!(provider_idx = i, op, "RPC timeout, trying next provider"),
            }
        }
        Err(ChainError::Network(format!("All RPC providers failed to {}", op)))
    }

    /// Refuse to sign while gas is above the configured ceiling.
    async fn check_gas_price(&self) -> ChainResult<()> {
        let gas_price = self
            .with_failover("get gas price", |p| async move { p.get_gas_price().await })
            .await?;
        let ceiling = u128::from(self.config.max_gas_price_gwei) * GWEI;

        if gas_price > ceiling {
            return Err(ChainError::Submission(format!(
                "Gas price {} wei exceeds maximum {} gwei",
                gas_price, self.config.max_gas_price_gwei
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn request_account(&self) -> ChainResult<Address> {
        let signing = self.signing()?;
        let address = signing.wallet.address();
        signing
            .wallet
            .approve(&format!("Connect account {} to this app?", address))
            .await?;
        Ok(address)
    }

    async fn read(&self, call: ContractCall) -> ChainResult<Bytes> {
        let request = TransactionRequest::default()
            .with_to(call.to)
            .with_input(call.data);

        self.with_failover("call contract", |p| {
            let request = request.clone();
            async move { p.call(request).await }
        })
        .await
    }

    async fn write(&self, call: ContractCall) -> ChainResult<PendingTx> {
        let signing = self.signing()?;
        self.check_gas_price().await?;

        signing
            .wallet
            .approve(&format!(
                "Sign transaction to {} with {} bytes of calldata?",
                call.to,
                call.data.len()
            ))
            .await?;

        let request = TransactionRequest::default()
            .with_from(signing.wallet.address())
            .with_to(call.to)
            .with_input(call.data)
            .with_chain_id(signing.wallet.chain_id());

        match timeout(self.timeout_duration, signing.provider.send_transaction(request)).await {
            Ok(Ok(pending)) => {
                let hash = *pending.tx_hash();
                tracing::info!(tx_hash = %hash, "Transaction broadcast");
                Ok(PendingTx { hash })
            }
            Ok(Err(e)) => Err(ChainError::Submission(e.to_string())),
            Err(_) => Err(ChainError::Network(format!(
                "Broadcast timed out after {} seconds",
                self.config.rpc_timeout_secs
            ))),
        }
    }

    async fn await_confirmation(&self, tx: &PendingTx) -> ChainResult<Receipt> {
        let required = u64::from(self.config.confirmation_blocks);
        let mut attempt = 0u32;

        loop {
            sleep(poll_delay(
                attempt,
                self.config.poll_interval_ms,
                self.config.max_poll_interval_ms,
            ))
            .await;
            attempt = attempt.saturating_add(1);

            let receipt = match self.get_transaction_receipt(tx.hash).await? {
                Some(r) => r,
                None => {
                    tracing::debug!(tx_hash = %tx.hash, attempt, "Transaction pending");
                    continue;
                }
            };

            if !receipt.status() {
                return Err(ChainError::Reverted { tx_hash: tx.hash });
            }

            let current_block = self.get_block_number().await?;
            let tx_block = receipt.block_number.unwrap_or(current_block);
            let depth = current_block.saturating_sub(tx_block) + 1;

            if depth >= required {
                return Ok(Receipt {
                    tx_hash: tx.hash,
                    block_number: tx_block,
                    logs: receipt.inner.logs().iter().map(|log| log.inner.clone()).collect(),
                });
            }

            tracing::debug!(
                tx_hash = %tx.hash,
                depth,
                required,
                "Waiting for confirmations"
            );
        }
    }
}

impl std::fmt::Debug for RpcChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("providers", &self.readers.len())
            .field("signing", &self.signing.is_ok())
            .finish()
    }
}
