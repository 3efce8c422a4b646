//! Reconstructs the active federation from the bridge.

use flyover_bridge_primitives::federation::FederationInfo;
use secp256k1::PublicKey;
use tracing::debug;

use crate::{
    config::SettlementParams,
    errors::SettlementErr,
    executor::TxExecutor,
    providers::{ChainClient, SettlementContract},
};

/// Fetches the active federation's composition, once per federation epoch.
///
/// Member data comes from the bridge through the retrying read path; the
/// emergency-recovery set and the epoch activation height come from operator
/// configuration. The result is an immutable value passed by reference to
/// every consumer for the rest of the epoch.
pub async fn fetch_federation_info<C, S>(
    executor: &TxExecutor<C>,
    contract: &S,
    params: &SettlementParams,
) -> Result<FederationInfo, SettlementErr>
where
    C: ChainClient,
    S: SettlementContract,
{
    let fed_size = executor
        .read("federation size", || contract.federation_size())
        .await?;
    let fed_threshold = executor
        .read("federation threshold", || contract.federation_threshold())
        .await?;

    let mut pub_keys = Vec::with_capacity(fed_size as usize);
    for index in 0..fed_size {
        let raw = executor
            .read("federator public key", || {
                contract.federator_public_key(index)
            })
            .await?;
        let key = PublicKey::from_slice(&raw).map_err(|err| {
            SettlementErr::InvalidFederation(format!("federator key {index}: {err}"))
        })?;
        pub_keys.push(key);
    }

    let fed_address = executor
        .read("federation address", || contract.federation_address())
        .await?;
    let active_fed_block_height = executor
        .read("federation creation height", || {
            contract.active_federation_creation_block_height()
        })
        .await?;
    let erp_keys = params.erp_public_keys()?;

    debug!(fed_size, fed_threshold, %fed_address, "fetched active federation");
    Ok(FederationInfo {
        pub_keys,
        fed_size: fed_size as usize,
        fed_threshold: fed_threshold as usize,
        fed_address,
        active_fed_block_height,
        iris_activation_height: params.iris_activation_height,
        erp_keys,
    })
}
