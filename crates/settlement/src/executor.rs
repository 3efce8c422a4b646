//! Bounded-retry transaction submission.
//!
//! Every on-chain signing submission in the system goes through
//! [`TxExecutor::submit_and_await`]: build and broadcast, wait for mining
//! within a bound, retry transient failures a fixed number of times. The
//! same [`RetryPolicy`] also backs the lighter [`TxExecutor::read`] path
//! used for plain contract reads.

use std::{fmt, future::Future, sync::Arc, time::Duration};

use alloy_primitives::TxHash;
use thiserror::Error;
use tokio::{
    sync::Mutex,
    time::{sleep, timeout},
};
use tracing::{debug, info, warn};

use crate::{
    config::SettlementParams,
    providers::{ChainClient, ProviderError, Receipt},
};

/// A bounded retry schedule with a fixed backoff.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts before giving up.
    pub max_attempts: u32,

    /// Sleep between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Runs `op` until it succeeds, the error stops being retryable, or the
    /// attempts run out. Returns the first success or the last error.
    pub async fn retry<T, E, F, Fut, P>(&self, mut op: F, mut retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: FnMut(&E) -> bool,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts && retryable(&err) => {
                    sleep(self.backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Failure of a transaction submission.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Building or broadcasting the transaction failed.
    #[error("transaction submission failed: {0}")]
    Submission(#[from] ProviderError),

    /// The transaction was mined with a failure status.
    #[error("transaction {tx_hash} reverted on chain")]
    Reverted {
        /// Hash of the reverted transaction.
        tx_hash: TxHash,
    },

    /// The transaction was not mined within the configured bound.
    #[error("transaction {tx_hash} not mined within {timeout:?}")]
    MiningTimeout {
        /// Hash of the pending transaction.
        tx_hash: TxHash,
        /// The bound that was exceeded.
        timeout: Duration,
    },
}

impl ExecutorError {
    /// A reverted transaction is deterministic and never retried; everything
    /// else may be worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Submission(err) => err.is_transient(),
            Self::Reverted { .. } => false,
            Self::MiningTimeout { .. } => true,
        }
    }
}

/// Submits transactions for the single signing account.
///
/// All watchers share one executor; the signing lock serializes submissions
/// so concurrent quotes never race on the account's transaction ordering.
pub struct TxExecutor<C> {
    client: Arc<C>,
    policy: RetryPolicy,
    read_timeout: Duration,
    mining_timeout: Duration,
    receipt_poll: Duration,
    signing_lock: Arc<Mutex<()>>,
}

impl<C> fmt::Debug for TxExecutor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxExecutor")
            .field("policy", &self.policy)
            .field("read_timeout", &self.read_timeout)
            .field("mining_timeout", &self.mining_timeout)
            .field("receipt_poll", &self.receipt_poll)
            .finish_non_exhaustive()
    }
}

impl<C: ChainClient> TxExecutor<C> {
    /// Creates an executor over `client` with the given bounds.
    pub fn new(
        client: Arc<C>,
        policy: RetryPolicy,
        read_timeout: Duration,
        mining_timeout: Duration,
        receipt_poll: Duration,
        signing_lock: Arc<Mutex<()>>,
    ) -> Self {
        Self {
            client,
            policy,
            read_timeout,
            mining_timeout,
            receipt_poll,
            signing_lock,
        }
    }

    /// Convenience constructor from the settlement parameters.
    pub fn from_params(
        client: Arc<C>,
        params: &SettlementParams,
        signing_lock: Arc<Mutex<()>>,
    ) -> Self {
        Self::new(
            client,
            params.retry_policy(),
            params.read_timeout(),
            params.mining_timeout(),
            params.receipt_poll(),
            signing_lock,
        )
    }

    /// Builds, broadcasts and awaits one transaction.
    ///
    /// `build` is invoked once per attempt and must produce a freshly signed
    /// and broadcast transaction, returning its hash. Success is strictly a
    /// mined receipt with a success status; a mined-but-reverted transaction
    /// surfaces as [`ExecutorError::Reverted`] and is not retried.
    pub async fn submit_and_await<F, Fut>(
        &self,
        label: &str,
        build: F,
    ) -> Result<Receipt, ExecutorError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<TxHash, ProviderError>>,
    {
        let _guard = self.signing_lock.lock().await;
        info!(%label, "executing transaction");
        let result = self
            .policy
            .retry(|| self.attempt(label, &build), ExecutorError::is_retryable)
            .await;
        if let Err(err) = &result {
            warn!(%label, error = %err, "transaction failed");
        }
        result
    }

    async fn attempt<F, Fut>(&self, label: &str, build: &F) -> Result<Receipt, ExecutorError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<TxHash, ProviderError>>,
    {
        let tx_hash = build().await?;
        debug!(%label, %tx_hash, "transaction broadcast, awaiting mining");
        let receipt = self.await_receipt(tx_hash).await?;
        if receipt.status {
            info!(%label, %tx_hash, "transaction executed successfully");
            Ok(receipt)
        } else {
            Err(ExecutorError::Reverted { tx_hash })
        }
    }

    async fn await_receipt(&self, tx_hash: TxHash) -> Result<Receipt, ExecutorError> {
        let poll = async {
            loop {
                match self.client.transaction_receipt(tx_hash).await {
                    Ok(Some(receipt)) => return Ok(receipt),
                    Ok(None) => {}
                    Err(err) if err.is_transient() => {
                        debug!(%tx_hash, error = %err, "receipt poll failed")
                    }
                    Err(err) => return Err(ExecutorError::Submission(err)),
                }
                sleep(self.receipt_poll).await;
            }
        };

        match timeout(self.mining_timeout, poll).await {
            Ok(result) => result,
            Err(_) => Err(ExecutorError::MiningTimeout {
                tx_hash,
                timeout: self.mining_timeout,
            }),
        }
    }

    /// Plain read with the shared retry policy and a per-call bound. No
    /// signing lock, no mining wait.
    pub async fn read<T, F, Fut>(&self, label: &str, op: F) -> Result<T, ProviderError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let result = self
            .policy
            .retry(
                || async {
                    match timeout(self.read_timeout, op()).await {
                        Ok(result) => result,
                        Err(_) => Err(ProviderError::Timeout(self.read_timeout)),
                    }
                },
                ProviderError::is_transient,
            )
            .await;
        if let Err(err) = &result {
            warn!(%label, error = %err, "read call failed");
        }
        result
    }
}
