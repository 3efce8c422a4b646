//! Ties a quote to its unique deposit address.

use alloy_primitives::B256;
use flyover_bridge_primitives::{
    deposit::DepositAddress,
    derivation::{address_derivation_bytes, DerivationValue},
    federation::FederationInfo,
    quote::PeginQuote,
};
use tracing::debug;

use crate::{
    errors::SettlementErr,
    executor::TxExecutor,
    providers::{ChainClient, SettlementContract},
};

/// The settlement contract's canonical hash of `quote`.
///
/// Quote identity always comes from the contract; a locally invented digest
/// would not survive the on-chain re-derivation.
pub async fn canonical_quote_hash<C, S>(
    executor: &TxExecutor<C>,
    contract: &S,
    quote: &PeginQuote,
) -> Result<B256, SettlementErr>
where
    C: ChainClient,
    S: SettlementContract,
{
    let hash = executor
        .read("hash quote", || contract.hash_quote(quote))
        .await?;
    Ok(hash)
}

/// Computes the derivation value for an accepted quote.
pub fn quote_derivation_value(
    quote: &PeginQuote,
    quote_hash: &B256,
) -> Result<DerivationValue, SettlementErr> {
    let user_refund = address_derivation_bytes(&quote.btc_refund_address)?;
    let provider_btc = address_derivation_bytes(&quote.lp_btc_address)?;
    Ok(DerivationValue::compute(
        &user_refund,
        quote.lbc_address.as_slice(),
        &provider_btc,
        &quote_hash.0,
    ))
}

/// Derives the deposit address a user must pay into for `quote`.
///
/// The bridge's authoritative redeem script is fetched first and the local
/// reconstruction must agree with it before the address leaves this
/// function.
pub async fn derive_quote_deposit_address<C, S>(
    executor: &TxExecutor<C>,
    contract: &S,
    fed_info: &FederationInfo,
    network: bitcoin::Network,
    quote: &PeginQuote,
    quote_hash: &B256,
) -> Result<DepositAddress, SettlementErr>
where
    C: ChainClient,
    S: SettlementContract,
{
    let derivation_value = quote_derivation_value(quote, quote_hash)?;
    let authoritative = executor
        .read("active redeem script", || contract.active_redeem_script())
        .await?;

    let deposit =
        DepositAddress::derive(fed_info, network, &derivation_value, Some(&authoritative))?;
    debug!(quote = %quote_hash, address = %deposit.address, "derived deposit address");
    Ok(deposit)
}
