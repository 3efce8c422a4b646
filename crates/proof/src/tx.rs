//! Canonical raw-transaction serialization.

use bitcoin::{consensus, Transaction, Witness};

/// Serializes a transaction in the legacy wire format, without witness data.
///
/// The settlement contract verifies the transaction against the block's
/// txid merkle tree, which commits to the witness-free serialization.
pub fn serialize_tx(tx: &Transaction) -> Vec<u8> {
    let mut stripped = tx.clone();
    for input in &mut stripped.input {
        input.witness = Witness::default();
    }
    consensus::encode::serialize(&stripped)
}
