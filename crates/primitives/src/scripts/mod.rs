//! Redeem-script construction for federation-controlled deposit addresses.
//!
//! Three layers compose here: the canonical federation multisig, an optional
//! emergency-recovery wrapper with a relative timelock, and the flyover
//! prefix that tags the script with a per-quote derivation value.

pub mod fallback;
pub mod flyover;
pub mod multisig;

pub use fallback::fallback_script;
pub use flyover::flyover_script;
pub use multisig::{multisig_script, multisig_script_body};
