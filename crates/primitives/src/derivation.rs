//! Per-quote derivation values.
//!
//! The derivation value ties a deposit address to exactly one quote. It is
//! recomputed independently by the settlement contract, so the concatenation
//! order below is a wire contract, not a local choice.

use std::fmt;

use bitcoin::{address::NetworkUnchecked, base58, Address};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::AddressError;

/// 32-byte value that uniquely identifies a quote inside its deposit script.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DerivationValue([u8; 32]);

impl DerivationValue {
    /// Computes the derivation value for a quote.
    ///
    /// A single SHA-256 over `user_refund_addr ‖ contract_addr ‖
    /// provider_btc_addr ‖ quote_hash`, in exactly that order.
    pub fn compute(
        user_refund_addr: &[u8],
        contract_addr: &[u8],
        provider_btc_addr: &[u8],
        quote_hash: &[u8; 32],
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(user_refund_addr);
        hasher.update(contract_addr);
        hasher.update(provider_btc_addr);
        hasher.update(quote_hash);
        Self(hasher.finalize().into())
    }

    /// Wraps raw bytes as a derivation value.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for DerivationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DerivationValue({})", hex::encode(self.0))
    }
}

impl fmt::Display for DerivationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Decodes a Bitcoin address into the bytes it contributes to a derivation
/// value.
///
/// Base58check addresses contribute their full decoded payload, version byte
/// included. Segwit addresses contribute their witness program.
pub fn address_derivation_bytes(address: &str) -> Result<Vec<u8>, AddressError> {
    if let Ok(decoded) = base58::decode_check(address) {
        return Ok(decoded);
    }

    let parsed = address
        .parse::<Address<NetworkUnchecked>>()
        .map_err(|_| AddressError::Undecodable(address.to_string()))?;
    // Network enforcement happens where addresses are used to move funds;
    // here only the payload bytes matter.
    parsed
        .assume_checked()
        .witness_program()
        .map(|program| program.program().as_bytes().to_vec())
        .ok_or_else(|| AddressError::Undecodable(address.to_string()))
}
