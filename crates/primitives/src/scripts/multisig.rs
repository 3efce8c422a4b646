//! Canonical m-of-n `OP_CHECKMULTISIG` scripts.

use bitcoin::{
    opcodes::Opcode,
    script::{Builder, ScriptBuf},
};
use secp256k1::PublicKey;

use crate::errors::ScriptError;

/// Maximum number of keys a standard multisig script can carry. Thresholds
/// and key counts are encoded as `OP_1..OP_16` small-number opcodes, but
/// `OP_CHECKMULTISIG` itself caps the key count at 15.
pub const MAX_MULTISIG_KEYS: usize = 15;

/// Builds the canonical `OP_<m> <key_1>..<key_n> OP_<n> OP_CHECKMULTISIG`
/// script for the given key set.
///
/// Keys are sorted by their compressed serialization before being emitted,
/// so the output is independent of the order the keys arrive in.
pub fn multisig_script(pub_keys: &[PublicKey], threshold: usize) -> Result<ScriptBuf, ScriptError> {
    let body = multisig_script_body(pub_keys, threshold)?;
    let mut script = body.into_bytes();
    script.push(bitcoin::opcodes::all::OP_CHECKMULTISIG.to_u8());
    Ok(ScriptBuf::from_bytes(script))
}

/// Builds the multisig script without the trailing `OP_CHECKMULTISIG`.
///
/// The emergency-path wrapper shares a single `OP_CHECKMULTISIG` between its
/// two branches, so it needs the bare `OP_<m> <keys> OP_<n>` body.
pub fn multisig_script_body(
    pub_keys: &[PublicKey],
    threshold: usize,
) -> Result<ScriptBuf, ScriptError> {
    if pub_keys.is_empty() {
        return Err(ScriptError::InvalidKeySet("empty key set".to_string()));
    }
    if pub_keys.len() > MAX_MULTISIG_KEYS {
        return Err(ScriptError::InvalidKeySet(format!(
            "{} keys exceed the multisig limit of {MAX_MULTISIG_KEYS}",
            pub_keys.len()
        )));
    }
    if threshold < 1 || threshold > pub_keys.len() {
        return Err(ScriptError::InvalidKeySet(format!(
            "threshold {threshold} out of range for {} keys",
            pub_keys.len()
        )));
    }

    let mut sorted: Vec<[u8; 33]> = pub_keys.iter().map(|key| key.serialize()).collect();
    sorted.sort_unstable();

    let mut builder = Builder::new().push_opcode(small_number_opcode(threshold));
    for key in &sorted {
        builder = builder.push_slice(key);
    }
    Ok(builder
        .push_opcode(small_number_opcode(sorted.len()))
        .into_script())
}

/// Maps `1..=16` to the corresponding `OP_1..OP_16` small-number opcode.
fn small_number_opcode(value: usize) -> Opcode {
    debug_assert!((1..=16).contains(&value));
    Opcode::from(bitcoin::opcodes::all::OP_PUSHNUM_1.to_u8() + (value as u8 - 1))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn key(hex: &str) -> PublicKey {
        hex.parse().expect("valid compressed public key")
    }

    fn federation_keys() -> Vec<PublicKey> {
        vec![
            key("02cd53fc53a07f211641a677d250f6de99caf620e8e77071e811a28b3bcddf0be1"),
            key("0362634ab57dae9cb373a5d536e66a8c4f67468bbcfb063809bab643072d78a124"),
            key("03c5946b3fbae03a654237da863c9ed534e0878657175b132b8ca630f245df04db"),
        ]
    }

    // 2-of-3 federation script from the reference vector set.
    const FEDERATION_SCRIPT_HEX: &str = "522102cd53fc53a07f211641a677d250f6de99caf620e8e77071e811a28b3bcddf0be1210362634ab57dae9cb373a5d536e66a8c4f67468bbcfb063809bab643072d78a1242103c5946b3fbae03a654237da863c9ed534e0878657175b132b8ca630f245df04db53ae";

    #[test]
    fn matches_reference_vector() {
        let script = multisig_script(&federation_keys(), 2).unwrap();
        assert_eq!(hex::encode(script.as_bytes()), FEDERATION_SCRIPT_HEX);
    }

    #[test]
    fn opcode_framing() {
        let keys = federation_keys();
        let script = multisig_script(&keys, 2).unwrap();
        let bytes = script.as_bytes();
        assert_eq!(bytes[0], bitcoin::opcodes::all::OP_PUSHNUM_2.to_u8());
        assert_eq!(
            bytes[bytes.len() - 2],
            bitcoin::opcodes::all::OP_PUSHNUM_3.to_u8()
        );
        assert_eq!(
            bytes[bytes.len() - 1],
            bitcoin::opcodes::all::OP_CHECKMULTISIG.to_u8()
        );
    }

    #[test]
    fn rejects_invalid_key_sets() {
        let keys = federation_keys();
        assert!(matches!(
            multisig_script(&keys, 0),
            Err(ScriptError::InvalidKeySet(_))
        ));
        assert!(matches!(
            multisig_script(&keys, 4),
            Err(ScriptError::InvalidKeySet(_))
        ));
        assert!(matches!(
            multisig_script(&[], 1),
            Err(ScriptError::InvalidKeySet(_))
        ));

        let oversized: Vec<PublicKey> = std::iter::repeat(keys[0]).take(16).collect();
        assert!(matches!(
            multisig_script(&oversized, 8),
            Err(ScriptError::InvalidKeySet(_))
        ));
    }

    proptest! {
        #[test]
        fn invariant_under_key_permutation(permutation in proptest::sample::select(vec![
            [0usize, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0],
        ])) {
            let keys = federation_keys();
            let shuffled: Vec<PublicKey> = permutation.iter().map(|&i| keys[i]).collect();
            let canonical = multisig_script(&keys, 2).unwrap();
            let reordered = multisig_script(&shuffled, 2).unwrap();
            prop_assert_eq!(canonical, reordered);
        }
    }
}
