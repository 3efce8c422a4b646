//! Deterministic primitives for the flyover bridge: federation redeem
//! scripts, per-quote derivation values and the deposit addresses built from
//! them.
//!
//! Everything in this crate is pure and stateless. The address a user is
//! shown can be re-derived at any later point from the same inputs, which is
//! what makes the scheme auditable end to end.

pub mod deposit;
pub mod derivation;
pub mod errors;
pub mod federation;
pub mod quote;
pub mod scripts;
