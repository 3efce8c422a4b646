//! Capability interfaces for the external collaborators.
//!
//! The settlement core talks to the Bitcoin node, the smart-contract chain
//! and the key holder exclusively through these narrow traits. Their
//! implementations (RPC clients, contract bindings, wallets) live outside
//! this crate.

use std::time::Duration;

use alloy_primitives::{Address as EvmAddress, Bytes, TxHash, B256, U256};
use async_trait::async_trait;
use bitcoin::{Block, Network, Transaction, Txid};
use flyover_bridge_primitives::quote::PeginQuote;
use thiserror::Error;

/// Failure of a collaborator call.
#[derive(Clone, Debug, Error)]
pub enum ProviderError {
    /// The node could not be reached or answered with a protocol error.
    #[error("rpc call failed: {0}")]
    Rpc(String),

    /// The call executed and the contract rejected it.
    #[error("call reverted: {0}")]
    Revert(String),

    /// The call did not complete within its bound.
    #[error("call timed out after {0:?}")]
    Timeout(Duration),
}

impl ProviderError {
    /// Whether retrying the same call can reasonably succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Rpc(_) | Self::Timeout(_))
    }
}

/// Result of a mined transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Receipt {
    /// Hash of the mined transaction.
    pub tx_hash: TxHash,

    /// Whether execution succeeded. A mined-but-reverted transaction is
    /// never success.
    pub status: bool,

    /// Block the transaction was mined in.
    pub block_number: u64,

    /// Gas consumed by the execution.
    pub gas_used: u64,
}

/// Submission options for a settlement-contract transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallOptions {
    /// The submitting (and paying) account.
    pub from: EvmAddress,

    /// Gas limit for the submission.
    pub gas_limit: u64,

    /// Value attached to the call.
    pub value: U256,
}

/// Everything `registerPegIn` needs.
#[derive(Clone, Debug)]
pub struct RegisterPegInArgs {
    /// The quote being settled.
    pub quote: PeginQuote,

    /// Provider signature over the quote hash.
    pub signature: Bytes,

    /// Canonical serialization of the deposit transaction.
    pub raw_tx: Vec<u8>,

    /// Serialized partial-merkle-tree inclusion proof.
    pub pmt: Vec<u8>,

    /// Height of the block containing the deposit.
    pub block_height: u64,
}

/// Read access to Bitcoin chain data.
#[async_trait]
pub trait BitcoinDataProvider: Send + Sync {
    /// Returns the full transaction for `txid`.
    async fn raw_transaction(&self, txid: Txid) -> Result<Transaction, ProviderError>;

    /// Returns the block containing `txid` along with its height.
    async fn block_containing(&self, txid: Txid) -> Result<(Block, u64), ProviderError>;

    /// The network this provider is connected to.
    fn network(&self) -> Network;
}

/// Generic smart-contract chain primitives.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Current best block height.
    async fn block_height(&self) -> Result<u64, ProviderError>;

    /// The chain id transactions must be signed for.
    async fn chain_id(&self) -> Result<u64, ProviderError>;

    /// Receipt of a transaction, or `None` while it is unmined.
    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<Receipt>, ProviderError>;
}

/// The settlement contract, plus the bridge reads needed to reconstruct the
/// federation it delegates custody to.
#[async_trait]
pub trait SettlementContract: Send + Sync {
    /// Pays out to the quote's destination using provider funds.
    async fn call_for_user(
        &self,
        opts: CallOptions,
        quote: &PeginQuote,
    ) -> Result<TxHash, ProviderError>;

    /// Proves the deposit and releases the provider's refund plus fee.
    async fn register_peg_in(
        &self,
        opts: CallOptions,
        args: &RegisterPegInArgs,
    ) -> Result<TxHash, ProviderError>;

    /// Dry run of [`Self::register_peg_in`] without submitting anything.
    ///
    /// The bridge reports its negative result codes as revert messages;
    /// implementations surface them via [`ProviderError::Revert`].
    async fn register_peg_in_static(&self, args: &RegisterPegInArgs)
        -> Result<(), ProviderError>;

    /// The contract's canonical hash of a quote.
    async fn hash_quote(&self, quote: &PeginQuote) -> Result<B256, ProviderError>;

    /// The authoritative federation redeem script, empty if the bridge does
    /// not expose it yet.
    async fn active_redeem_script(&self) -> Result<Vec<u8>, ProviderError>;

    /// Funds the provider already holds inside the settlement contract.
    async fn provider_balance(&self, provider: EvmAddress) -> Result<U256, ProviderError>;

    /// Number of federation members.
    async fn federation_size(&self) -> Result<u32, ProviderError>;

    /// Signatures required to spend federation funds.
    async fn federation_threshold(&self) -> Result<u32, ProviderError>;

    /// Compressed public key of the federator at `index`.
    async fn federator_public_key(&self, index: u32) -> Result<Vec<u8>, ProviderError>;

    /// The federation's BTC address.
    async fn federation_address(&self) -> Result<String, ProviderError>;

    /// Block height at which the active federation was created.
    async fn active_federation_creation_block_height(&self) -> Result<i64, ProviderError>;
}

/// The provider's signing capability. Key custody is not this crate's
/// concern.
#[async_trait]
pub trait QuoteSigner: Send + Sync {
    /// Signs a 32-byte digest with the provider key.
    async fn sign_hash(&self, digest: &B256) -> Result<Bytes, ProviderError>;

    /// Signs a raw transaction for the given chain.
    async fn sign_transaction(&self, tx: Bytes, chain_id: u64) -> Result<Bytes, ProviderError>;

    /// The address of the signing account.
    fn address(&self) -> EvmAddress;
}
