//! Per-quote settlement state machine.
//!
//! A watcher owns exactly one accepted quote and its derived deposit
//! address. It does no polling of its own: the embedding system delivers
//! confirmation counts for the deposit transaction, and the watcher decides
//! when the two settlement calls fire. Duplicate or out-of-order deliveries
//! are harmless; every transition is guarded by the current phase, never by
//! comparing counts.

use std::sync::Arc;

use alloy_primitives::{B256, U256};
use bitcoin::Txid;
use flyover_bridge_primitives::quote::PeginQuote;
use flyover_bridge_proof::{serialize_pmt, serialize_tx};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    config::SettlementParams,
    constants::{BRIDGE_VALIDATION_RACE_MARKER, CFU_EXTRA_GAS, REGISTER_PEGIN_GAS_LIMIT},
    errors::SettlementErr,
    executor::{ExecutorError, TxExecutor},
    providers::{
        BitcoinDataProvider, CallOptions, ChainClient, QuoteSigner, RegisterPegInArgs,
        SettlementContract,
    },
};

/// Phase of one watched quote. Advances forward only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuotePhase {
    /// No sufficiently confirmed deposit yet.
    WaitingForDeposit,

    /// Provider funds have been paid out to the quote's destination.
    CalledForUser,

    /// The peg-in is registered; the provider has been made whole.
    Settled,

    /// The quote ended without settling: expired, reverted or unprovable.
    Failed,
}

impl QuotePhase {
    /// Whether the quote has reached an end state.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Settled | Self::Failed)
    }

    fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::WaitingForDeposit, Self::CalledForUser)
                | (Self::WaitingForDeposit, Self::Failed)
                | (Self::CalledForUser, Self::Settled)
                | (Self::CalledForUser, Self::Failed)
        )
    }
}

/// An illegal phase change was requested.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("invalid phase transition: {from:?} -> {to:?}")]
pub struct TransitionErr {
    /// The phase the quote was in.
    pub from: QuotePhase,
    /// The phase that was requested.
    pub to: QuotePhase,
}

/// Watches one quote's deposit address and performs the settlement calls.
#[derive(Debug)]
pub struct PeginWatcher<B, C, S, G> {
    quote_hash: B256,
    quote: PeginQuote,
    phase: QuotePhase,
    required_bridge_confirmations: u64,
    btc: Arc<B>,
    contract: Arc<S>,
    signer: Arc<G>,
    executor: Arc<TxExecutor<C>>,
}

impl<B, C, S, G> PeginWatcher<B, C, S, G>
where
    B: BitcoinDataProvider,
    C: ChainClient,
    S: SettlementContract,
    G: QuoteSigner,
{
    /// Creates a watcher for a freshly accepted quote.
    pub fn new(
        quote_hash: B256,
        quote: PeginQuote,
        params: &SettlementParams,
        btc: Arc<B>,
        contract: Arc<S>,
        signer: Arc<G>,
        executor: Arc<TxExecutor<C>>,
    ) -> Self {
        Self {
            quote_hash,
            quote,
            phase: QuotePhase::WaitingForDeposit,
            required_bridge_confirmations: params.required_bridge_confirmations,
            btc,
            contract,
            signer,
            executor,
        }
    }

    /// Resumes a watcher for a quote restored mid-flight.
    pub fn with_phase(mut self, phase: QuotePhase) -> Self {
        self.phase = phase;
        self
    }

    /// The quote's current phase.
    pub const fn phase(&self) -> QuotePhase {
        self.phase
    }

    /// The hash identifying the watched quote.
    pub const fn quote_hash(&self) -> B256 {
        self.quote_hash
    }

    /// Handles a confirmation count observed for the deposit transaction
    /// `txid`.
    ///
    /// Counts may repeat or regress; each settlement call still fires at
    /// most once. Transient failures leave the phase untouched so a later
    /// event can try again.
    pub async fn on_confirmation(
        &mut self,
        txid: Txid,
        confirmations: u64,
    ) -> Result<QuotePhase, SettlementErr> {
        if self.phase.is_terminal() {
            debug!(quote = %self.quote_hash, phase = ?self.phase, "ignoring event for finished quote");
            return Ok(self.phase);
        }
        debug!(
            quote = %self.quote_hash,
            %txid,
            confirmations,
            "processing confirmation event"
        );

        if self.phase == QuotePhase::WaitingForDeposit
            && confirmations >= u64::from(self.quote.confirmations)
        {
            self.perform_call_for_user(txid).await?;
        }

        if self.phase == QuotePhase::CalledForUser
            && confirmations >= self.required_bridge_confirmations
        {
            self.perform_register_peg_in(txid).await?;
        }

        Ok(self.phase)
    }

    /// Handles the externally driven expiration of the deposit window.
    ///
    /// Only meaningful while no deposit has been acted on; once provider
    /// funds are committed the quote must settle or fail on its own terms.
    pub fn on_expire(&mut self) -> Result<QuotePhase, SettlementErr> {
        if self.phase == QuotePhase::WaitingForDeposit {
            warn!(quote = %self.quote_hash, "deposit window expired");
            self.transition(QuotePhase::Failed)?;
        } else {
            debug!(quote = %self.quote_hash, phase = ?self.phase, "expiration after deposit; ignored");
        }
        Ok(self.phase)
    }

    fn transition(&mut self, next: QuotePhase) -> Result<(), TransitionErr> {
        if !self.phase.can_advance_to(next) {
            return Err(TransitionErr {
                from: self.phase,
                to: next,
            });
        }
        info!(quote = %self.quote_hash, from = ?self.phase, to = ?next, "quote phase advanced");
        self.phase = next;
        Ok(())
    }

    async fn perform_call_for_user(&mut self, txid: Txid) -> Result<(), SettlementErr> {
        let balance = self
            .executor
            .read("contract balance", || {
                self.contract.provider_balance(self.signer.address())
            })
            .await?;

        // Funds already held by the contract cover part of the payout; only
        // the shortfall travels with the call.
        let value = if balance >= self.quote.value {
            U256::ZERO
        } else {
            self.quote.value - balance
        };
        let opts = CallOptions {
            from: self.signer.address(),
            gas_limit: self.quote.gas_limit + CFU_EXTRA_GAS,
            value,
        };

        let result = self
            .executor
            .submit_and_await("callForUser", || {
                self.contract.call_for_user(opts.clone(), &self.quote)
            })
            .await;

        match result {
            Ok(receipt) => {
                info!(quote = %self.quote_hash, tx = %receipt.tx_hash, "called for user");
                self.transition(QuotePhase::CalledForUser)?;
                Ok(())
            }
            Err(err @ ExecutorError::Reverted { .. }) => {
                error!(quote = %self.quote_hash, %txid, error = %err, "callForUser reverted");
                self.transition(QuotePhase::Failed)?;
                Err(err.into())
            }
            Err(err) => {
                error!(
                    quote = %self.quote_hash,
                    %txid,
                    error = %err,
                    "callForUser failed; awaiting next confirmation"
                );
                Err(err.into())
            }
        }
    }

    async fn perform_register_peg_in(&mut self, txid: Txid) -> Result<(), SettlementErr> {
        let (block, block_height) = self.btc.block_containing(txid).await?;
        let deposit_tx = self.btc.raw_transaction(txid).await?;
        let raw_tx = serialize_tx(&deposit_tx);

        let pmt = match serialize_pmt(txid, &block) {
            Ok(pmt) => pmt,
            Err(err) => {
                error!(quote = %self.quote_hash, %txid, error = %err, "refusing to settle without a sound proof");
                self.transition(QuotePhase::Failed)?;
                return Err(err.into());
            }
        };

        let signature = self.signer.sign_hash(&self.quote_hash).await?;
        let args = RegisterPegInArgs {
            quote: self.quote.clone(),
            signature,
            raw_tx,
            pmt,
            block_height,
        };

        // The bridge may still be catching up on confirmations it has not
        // acknowledged; in that window the dry run fails with a specific
        // validation error and the registration simply waits for the next
        // event. Other dry-run failures are not trusted as final verdicts.
        if let Err(err) = self.contract.register_peg_in_static(&args).await {
            if err.to_string().contains(BRIDGE_VALIDATION_RACE_MARKER) {
                debug!(
                    quote = %self.quote_hash,
                    %txid,
                    "bridge has not validated the deposit yet; retrying on next confirmation"
                );
                return Ok(());
            }
            debug!(quote = %self.quote_hash, %txid, error = %err, "dry run failed; submitting anyway");
        }

        let opts = CallOptions {
            from: self.signer.address(),
            gas_limit: REGISTER_PEGIN_GAS_LIMIT,
            value: U256::ZERO,
        };
        let result = self
            .executor
            .submit_and_await("registerPegIn", || {
                self.contract.register_peg_in(opts.clone(), &args)
            })
            .await;

        match result {
            Ok(receipt) => {
                info!(quote = %self.quote_hash, tx = %receipt.tx_hash, "registered peg-in");
                self.transition(QuotePhase::Settled)?;
                Ok(())
            }
            Err(err @ ExecutorError::Reverted { .. }) => {
                error!(quote = %self.quote_hash, %txid, error = %err, "registerPegIn reverted");
                self.transition(QuotePhase::Failed)?;
                Err(err.into())
            }
            Err(err) => {
                error!(
                    quote = %self.quote_hash,
                    %txid,
                    error = %err,
                    "registerPegIn failed; awaiting next confirmation"
                );
                Err(err.into())
            }
        }
    }
}
