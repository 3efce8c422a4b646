//! Error types for script construction and address derivation.

use thiserror::Error;

/// Errors arising while building or validating federation redeem scripts.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The key set cannot be expressed as a standard multisig script.
    #[error("invalid key set: {0}")]
    InvalidKeySet(String),

    /// The locally recomputed script diverges from the authoritative script
    /// fetched from the bridge.
    #[error("recomputed redeem script does not match the authoritative script from the bridge")]
    ScriptMismatch,

    /// The generated redeem script does not hash to the federation address.
    #[error("generated redeem script does not match the federation address {expected}")]
    FederationAddressMismatch {
        /// The federation address the script was validated against.
        expected: String,
    },

    /// The redeem script is too large to be wrapped in a P2SH output.
    #[error("redeem script exceeds the P2SH size limit: {0}")]
    OversizedScript(#[from] bitcoin::address::P2shError),

    /// The federation address string could not be parsed for the target
    /// network.
    #[error("invalid federation address: {0}")]
    InvalidFederationAddress(String),
}

/// Errors arising while decoding Bitcoin addresses into derivation bytes.
#[derive(Debug, Error)]
pub enum AddressError {
    /// The address is neither valid base58check nor a valid segwit address.
    #[error("not a valid base58 or segwit bitcoin address: {0}")]
    Undecodable(String),
}
