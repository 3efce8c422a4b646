//! The accepted peg-in quote.

use alloy_primitives::{Address as EvmAddress, Bytes, U256};
use serde::{Deserialize, Serialize};

/// One agreed bridge transaction intent between a user and a liquidity
/// provider.
///
/// Immutable once accepted; its identity is the 32-byte hash computed by the
/// settlement contract's canonical hashing function, never a locally invented
/// digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeginQuote {
    /// The federation's BTC address at the time the quote was issued.
    pub fed_btc_address: String,

    /// Address of the settlement contract the quote is bound to.
    pub lbc_address: EvmAddress,

    /// The provider's address on the smart-contract chain.
    pub lp_rsk_address: EvmAddress,

    /// Where the user's BTC goes if the quote falls through.
    pub btc_refund_address: String,

    /// Where the user's funds go on the smart-contract chain if the call
    /// cannot be performed.
    pub rsk_refund_address: EvmAddress,

    /// The provider's BTC address.
    pub lp_btc_address: String,

    /// Fee charged by the provider for fronting the funds.
    pub call_fee: U256,

    /// Penalty the provider pays for failing to deliver.
    pub penalty_fee: U256,

    /// Destination of the peg-in: a contract or EOA to call.
    pub contract_address: EvmAddress,

    /// Call data forwarded to the destination.
    pub data: Bytes,

    /// Gas limit the destination call was quoted with.
    pub gas_limit: u64,

    /// Uniquifying nonce chosen at quote time.
    pub nonce: i64,

    /// Value delivered to the destination.
    pub value: U256,

    /// Unix timestamp at which user and provider agreed on the quote.
    pub agreement_timestamp: u32,

    /// Seconds the user has to get the deposit confirmed once.
    pub time_for_deposit: u32,

    /// Seconds the provider has to call on the user's behalf after the
    /// deposit reaches the agreed confirmations.
    pub lp_call_time: u32,

    /// BTC confirmations the provider requires before fronting funds.
    pub confirmations: u16,

    /// Whether `registerPegIn` may perform the destination call itself.
    pub call_on_register: bool,
}

impl PeginQuote {
    /// Unix timestamp after which an undeposited quote expires.
    pub fn deposit_deadline(&self) -> u64 {
        u64::from(self.agreement_timestamp) + u64::from(self.time_for_deposit)
    }
}
