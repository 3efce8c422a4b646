//! The flyover prefix: a 32-byte derivation value pushed and immediately
//! dropped, making the wrapped script unique per quote while leaving its
//! spending conditions untouched.

use bitcoin::script::{Builder, Script, ScriptBuf};

use crate::derivation::DerivationValue;

/// Prefixes `base_script` with `<push derivation value> OP_DROP`.
pub fn flyover_script(derivation_value: &DerivationValue, base_script: &Script) -> ScriptBuf {
    let mut script = Builder::new()
        .push_slice(derivation_value.as_bytes())
        .push_opcode(bitcoin::opcodes::all::OP_DROP)
        .into_script()
        .into_bytes();
    script.extend_from_slice(base_script.as_bytes());
    ScriptBuf::from_bytes(script)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_push_and_drop() {
        let value = DerivationValue::from_bytes([0xab; 32]);
        let base = ScriptBuf::from_bytes(vec![0x51]);
        let script = flyover_script(&value, &base);
        let bytes = script.as_bytes();

        assert_eq!(bytes[0], 0x20);
        assert_eq!(&bytes[1..33], &[0xab; 32]);
        assert_eq!(bytes[33], bitcoin::opcodes::all::OP_DROP.to_u8());
        assert_eq!(bytes[34], 0x51);
        assert_eq!(bytes.len(), 35);
    }
}
