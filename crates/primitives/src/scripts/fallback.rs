//! Emergency-recovery wrapper around the federation multisig.
//!
//! The resulting script spends through the federation unconditionally unless
//! the spender explicitly selects the timelocked recovery branch:
//!
//! `OP_NOTIF <primary multisig> OP_ELSE <delay> OP_CSV OP_DROP
//! <recovery multisig> OP_ENDIF OP_CHECKMULTISIG`
//!
//! A single `OP_CHECKMULTISIG` is shared by both branches, so the multisig
//! bodies are emitted without their own trailing opcode. The byte layout is
//! pinned by fixed hex vectors; do not reorder the writes.

use bitcoin::{
    opcodes::all::{OP_CHECKMULTISIG, OP_CSV, OP_DROP, OP_ELSE, OP_ENDIF, OP_NOTIF},
    script::{Builder, Script, ScriptBuf},
    Network,
};
use secp256k1::PublicKey;

use crate::errors::ScriptError;

use super::multisig::multisig_script_body;

/// Relative-timelock delay pushed in the recovery branch, as raw big-endian
/// script-push bytes. The value is a network constant of the bridge.
pub const fn csv_delay(network: Network) -> [u8; 2] {
    match network {
        Network::Bitcoin | Network::Testnet => [0xcd, 0x50],
        _ => [0x01, 0xf4],
    }
}

/// Wraps a primary multisig body with the timelocked recovery branch.
///
/// `primary_body` must be a multisig script without its trailing
/// `OP_CHECKMULTISIG` (see
/// [`multisig_script_body`](super::multisig_script_body)).
pub fn fallback_script(
    primary_body: &Script,
    recovery_keys: &[PublicKey],
    recovery_threshold: usize,
    delay: [u8; 2],
) -> Result<ScriptBuf, ScriptError> {
    let recovery_body = multisig_script_body(recovery_keys, recovery_threshold)?;

    let mut script = Builder::new().push_opcode(OP_NOTIF).into_script().into_bytes();
    script.extend_from_slice(primary_body.as_bytes());
    script.push(OP_ELSE.to_u8());
    script.extend_from_slice(Builder::new().push_slice(delay).into_script().as_bytes());
    script.push(OP_CSV.to_u8());
    script.push(OP_DROP.to_u8());
    script.extend_from_slice(recovery_body.as_bytes());
    script.push(OP_ENDIF.to_u8());
    script.push(OP_CHECKMULTISIG.to_u8());

    Ok(ScriptBuf::from_bytes(script))
}
