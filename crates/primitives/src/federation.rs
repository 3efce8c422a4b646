//! Federation metadata and redeem-script selection.

use bitcoin::{address::NetworkUnchecked, Address, Network, Script, ScriptBuf};
use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};

use crate::{
    errors::ScriptError,
    scripts::{
        fallback::{csv_delay, fallback_script},
        multisig::{multisig_script, multisig_script_body},
    },
};

/// Immutable description of one federation epoch.
///
/// Constructed once, from the bridge contract plus operator configuration,
/// and passed by reference everywhere after that. Never mutated mid-flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederationInfo {
    /// Public keys of the federation members.
    pub pub_keys: Vec<PublicKey>,

    /// Number of federation members.
    pub fed_size: usize,

    /// Signatures required to spend; `fed_size / 2 + 1` for a live
    /// federation.
    pub fed_threshold: usize,

    /// The federation's P2SH address, used to cross-check every generated
    /// script before it is trusted.
    pub fed_address: String,

    /// Block height at which this federation became active.
    pub active_fed_block_height: i64,

    /// Network upgrade height that switches the redeem-script variant.
    pub iris_activation_height: i64,

    /// Emergency-recovery key set for the timelocked fallback path.
    pub erp_keys: Vec<PublicKey>,
}

impl FederationInfo {
    /// Spending threshold of the emergency-recovery key set.
    pub fn erp_threshold(&self) -> usize {
        self.erp_keys.len() / 2 + 1
    }

    /// Builds the federation's base redeem script for `network`.
    ///
    /// Federations activated after the Iris upgrade carry the
    /// emergency-recovery wrapper; older ones use the plain multisig. When
    /// the wrapped script does not hash to the federation address the
    /// recovery path is not live yet and the plain multisig applies instead.
    /// Whatever variant is selected must match the federation address or the
    /// script source is stale/compromised and nothing may be derived from it.
    ///
    /// The height comparison is part of the bridge's observable behavior;
    /// it is pinned by fixed vectors and must not be "fixed" to read more
    /// naturally.
    pub fn redeem_script(&self, network: Network) -> Result<ScriptBuf, ScriptError> {
        if self.active_fed_block_height < self.iris_activation_height {
            let script = self.primary_script()?;
            self.validate_matches_address(network, &script)?;
            return Ok(script);
        }

        let wrapped = self.recovery_wrapped_script(network)?;
        if self.hashes_to_federation_address(network, &wrapped)? {
            return Ok(wrapped);
        }

        let script = self.primary_script()?;
        self.validate_matches_address(network, &script)?;
        Ok(script)
    }

    /// The plain `m-of-n OP_CHECKMULTISIG` federation script.
    pub fn primary_script(&self) -> Result<ScriptBuf, ScriptError> {
        multisig_script(&self.pub_keys, self.fed_threshold)
    }

    /// The federation script wrapped with the timelocked recovery branch.
    pub fn recovery_wrapped_script(&self, network: Network) -> Result<ScriptBuf, ScriptError> {
        let primary_body = multisig_script_body(&self.pub_keys, self.fed_threshold)?;
        fallback_script(
            &primary_body,
            &self.erp_keys,
            self.erp_threshold(),
            csv_delay(network),
        )
    }

    /// Fails unless `script` hashes to the federation address.
    pub fn validate_matches_address(
        &self,
        network: Network,
        script: &Script,
    ) -> Result<(), ScriptError> {
        if self.hashes_to_federation_address(network, script)? {
            Ok(())
        } else {
            Err(ScriptError::FederationAddressMismatch {
                expected: self.fed_address.clone(),
            })
        }
    }

    fn hashes_to_federation_address(
        &self,
        network: Network,
        script: &Script,
    ) -> Result<bool, ScriptError> {
        let fed_address = self
            .fed_address
            .parse::<Address<NetworkUnchecked>>()
            .map_err(|_| ScriptError::InvalidFederationAddress(self.fed_address.clone()))?
            .require_network(network)
            .map_err(|_| ScriptError::InvalidFederationAddress(self.fed_address.clone()))?;
        let script_address = Address::p2sh(script, network)?;
        Ok(script_address == fed_address)
    }
}

/// Compares a locally recomputed base script against the authoritative script
/// fetched live from the bridge.
///
/// The two must be byte-identical; anything else means the local federation
/// view or the remote script source is wrong, and no address may be derived.
pub fn validate_against_authoritative(
    candidate: &Script,
    authoritative: &[u8],
) -> Result<(), ScriptError> {
    if candidate.as_bytes() == authoritative {
        Ok(())
    } else {
        Err(ScriptError::ScriptMismatch)
    }
}
