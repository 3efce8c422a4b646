//! Constants used throughout settlement.

/// Extra gas added on top of the quote's declared limit when calling on the
/// user's behalf, so the surrounding bookkeeping of the settlement contract
/// always fits.
pub const CFU_EXTRA_GAS: u64 = 180_000;

/// Gas limit for peg-in registration submissions.
pub const REGISTER_PEGIN_GAS_LIMIT: u64 = 1_500_000;

/// Message marker of the bridge's transient pre-validation failure: the
/// bridge has not acknowledged all required confirmations yet and the same
/// registration will pass on a later event. Matched as a substring because
/// the bridge only exposes it as message text.
pub const BRIDGE_VALIDATION_RACE_MARKER: &str = "LBC031";
