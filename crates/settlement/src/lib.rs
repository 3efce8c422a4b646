//! Confirmation-driven settlement for flyover peg-ins.
//!
//! One [`watcher::PeginWatcher`] per accepted quote consumes confirmation
//! events for the quote's deposit address and drives the two on-chain
//! settlement calls at the agreed thresholds. All signing submissions funnel
//! through the shared [`executor::TxExecutor`], which serializes them behind
//! one signing lock and retries transient failures with a bounded policy.
//!
//! The Bitcoin and smart-contract nodes are reached exclusively through the
//! narrow capability traits in [`providers`]; this crate contains no RPC
//! client of its own, and no poller. Confirmation events are delivered by
//! the embedding system.

pub mod config;
pub mod constants;
pub mod deriver;
pub mod errors;
pub mod executor;
pub mod federation;
pub mod providers;
pub mod watcher;

#[cfg(test)]
pub(crate) mod test_support;
