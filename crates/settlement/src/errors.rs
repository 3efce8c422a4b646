//! Error types for the settlement crate.

use flyover_bridge_primitives::errors::{AddressError, ScriptError};
use flyover_bridge_proof::ProofError;
use thiserror::Error;

use crate::{executor::ExecutorError, providers::ProviderError, watcher::TransitionErr};

/// Unified error type for everything that can go wrong while settling a
/// quote.
#[derive(Debug, Error)]
pub enum SettlementErr {
    /// Script construction or validation failed; the quote must not proceed.
    #[error("script engine failure: {0}")]
    Script(#[from] ScriptError),

    /// A quote address could not be decoded into derivation bytes.
    #[error("address decoding failure: {0}")]
    Address(#[from] AddressError),

    /// The inclusion proof could not be built.
    #[error("proof construction failure: {0}")]
    Proof(#[from] ProofError),

    /// A collaborator call failed.
    #[error("collaborator call failed: {0}")]
    Provider(#[from] ProviderError),

    /// A transaction submission ran out of attempts, reverted or timed out.
    #[error("transaction submission failed: {0}")]
    Executor(#[from] ExecutorError),

    /// A state machine was asked to perform an illegal phase change.
    #[error(transparent)]
    Transition(#[from] TransitionErr),

    /// Federation data from chain or configuration is unusable.
    #[error("invalid federation data: {0}")]
    InvalidFederation(String),
}
