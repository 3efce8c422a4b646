//! Settlement parameters.

use std::time::Duration;

use secp256k1::PublicKey;
use serde::Deserialize;

use crate::{errors::SettlementErr, executor::RetryPolicy};

/// Immutable settlement parameters.
///
/// Constructed once at startup (typically deserialized from the operator's
/// configuration) and passed by reference to every consumer.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettlementParams {
    /// Confirmations the native bridge requires before a peg-in can be
    /// registered. Independent of the per-quote threshold for fronting
    /// funds.
    pub required_bridge_confirmations: u64,

    /// Network upgrade height that switches the federation redeem-script
    /// variant.
    pub iris_activation_height: i64,

    /// Hex-encoded compressed public keys of the emergency-recovery set.
    pub erp_keys: Vec<String>,

    /// Attempts per contract submission or read.
    pub rpc_retry_attempts: u32,

    /// Seconds slept between retry attempts.
    pub rpc_retry_backoff_secs: u64,

    /// Seconds allowed for a plain read call.
    pub read_timeout_secs: u64,

    /// Seconds allowed for a broadcast transaction to be mined.
    pub mining_timeout_secs: u64,

    /// Seconds between receipt polls while waiting for mining.
    pub receipt_poll_secs: u64,
}

impl Default for SettlementParams {
    fn default() -> Self {
        Self {
            required_bridge_confirmations: 10,
            iris_activation_height: 0,
            erp_keys: Vec::new(),
            rpc_retry_attempts: 3,
            rpc_retry_backoff_secs: 5,
            read_timeout_secs: 30,
            mining_timeout_secs: 120,
            receipt_poll_secs: 15,
        }
    }
}

impl SettlementParams {
    /// The retry policy shared by submissions and plain reads.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.rpc_retry_attempts,
            backoff: Duration::from_secs(self.rpc_retry_backoff_secs),
        }
    }

    /// Bound on plain read calls.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Bound on waiting for a broadcast transaction to be mined.
    pub fn mining_timeout(&self) -> Duration {
        Duration::from_secs(self.mining_timeout_secs)
    }

    /// Interval between receipt polls.
    pub fn receipt_poll(&self) -> Duration {
        Duration::from_secs(self.receipt_poll_secs)
    }

    /// Parses the configured emergency-recovery keys.
    pub fn erp_public_keys(&self) -> Result<Vec<PublicKey>, SettlementErr> {
        self.erp_keys
            .iter()
            .map(|key| {
                key.parse::<PublicKey>().map_err(|err| {
                    SettlementErr::InvalidFederation(format!("recovery key {key}: {err}"))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let params: SettlementParams =
            serde_json::from_str(r#"{"requiredBridgeConfirmations": 40}"#).unwrap();
        assert_eq!(params.required_bridge_confirmations, 40);
        assert_eq!(params.rpc_retry_attempts, 3);
        assert_eq!(params.mining_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn bad_recovery_keys_are_rejected() {
        let params = SettlementParams {
            erp_keys: vec!["nonsense".to_string()],
            ..Default::default()
        };
        assert!(params.erp_public_keys().is_err());
    }

    #[test]
    fn recovery_keys_parse() {
        let params = SettlementParams {
            erp_keys: vec![
                "0257c293086c4d4fe8943deda5f890a37d11bebd140e220faa76258a41d077b4d4".to_string(),
            ],
            ..Default::default()
        };
        assert_eq!(params.erp_public_keys().unwrap().len(), 1);
    }
}
