//! Per-quote deposit address derivation.

use bitcoin::{Address, Network, ScriptBuf};

use crate::{
    derivation::DerivationValue,
    errors::ScriptError,
    federation::{validate_against_authoritative, FederationInfo},
    scripts::flyover::flyover_script,
};

/// A derived deposit address together with the redeem script it commits to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepositAddress {
    /// The P2SH address shown to the user.
    pub address: Address,

    /// The flyover-wrapped redeem script the address hashes.
    pub redeem_script: ScriptBuf,
}

impl DepositAddress {
    /// Derives the unique deposit address for a quote.
    ///
    /// When the bridge exposes an authoritative redeem script
    /// (`authoritative_script` non-empty), the locally recomputed base script
    /// must match it byte for byte before anything is derived; a stale or
    /// compromised script source must never reach a user.
    ///
    /// Deterministic: the same federation, network and derivation value
    /// always produce the same address, so it can be re-derived later for
    /// verification.
    pub fn derive(
        fed_info: &FederationInfo,
        network: Network,
        derivation_value: &DerivationValue,
        authoritative_script: Option<&[u8]>,
    ) -> Result<Self, ScriptError> {
        let base = fed_info.redeem_script(network)?;
        if let Some(authoritative) = authoritative_script.filter(|script| !script.is_empty()) {
            validate_against_authoritative(&base, authoritative)?;
        }

        let redeem_script = flyover_script(derivation_value, &base);
        let address = Address::p2sh(&redeem_script, network)?;
        Ok(Self {
            address,
            redeem_script,
        })
    }
}
