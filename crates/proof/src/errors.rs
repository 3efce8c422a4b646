//! Error types for proof construction.

use bitcoin::Txid;
use thiserror::Error;

/// Errors arising while building an inclusion proof.
#[derive(Debug, Error)]
pub enum ProofError {
    /// The target transaction is not in the block.
    #[error("transaction {0} not found in block")]
    MatchNotFound(Txid),

    /// More than one transaction in the block matched the target. An
    /// ambiguous proof could prove inclusion of an unintended transaction,
    /// so it is never produced.
    #[error("block matches {matched} transactions for {txid}")]
    AmbiguousMatch {
        /// The transaction the proof was requested for.
        txid: Txid,
        /// How many transactions in the block matched it.
        matched: usize,
    },
}
