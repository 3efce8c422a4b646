//! Partial-merkle-tree inclusion proofs.
//!
//! Wire format, bit for bit: `u32 LE total_tx · varint hash_count ·
//! hash_count × 32-byte hashes in depth-first order · varint
//! flag_byte_count · flag bytes packed least-significant-bit first`. This is
//! what the settlement contract's verifier consumes, so the layout is pinned
//! by fixed byte vectors in the tests below.

use bitcoin::{consensus, merkle_tree::PartialMerkleTree, Block, Txid};

use crate::errors::ProofError;

/// Builds the serialized inclusion proof for `txid` inside `block`.
///
/// Exactly one transaction in the block may match the target; zero matches
/// mean the transaction is simply not there, and more than one would make
/// the proof ambiguous.
pub fn serialize_pmt(txid: Txid, block: &Block) -> Result<Vec<u8>, ProofError> {
    let txids: Vec<Txid> = block.txdata.iter().map(|tx| tx.compute_txid()).collect();
    let matches: Vec<bool> = txids.iter().map(|candidate| *candidate == txid).collect();

    match matches.iter().filter(|matched| **matched).count() {
        0 => Err(ProofError::MatchNotFound(txid)),
        1 => {
            let pmt = PartialMerkleTree::from_txids(&txids, &matches);
            Ok(consensus::encode::serialize(&pmt))
        }
        matched => Err(ProofError::AmbiguousMatch { txid, matched }),
    }
}
