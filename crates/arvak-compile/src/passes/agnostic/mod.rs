//! Target-agnostic compilation passes.
//!
//! These passes operate purely on the DAG structure without consulting
//! target-specific properties (coupling map, basis gates). They are safe
//! to run on any circuit regardless of the target hardware.
//!
//! Peephole optimization (gate cancellation, merging, basis translation) is
//! deliberately not implemented here. [`verification`] is the one built-in
//! pass in this module — a safety-net analysis, not a rewrite policy — and
//! [`crate::manager::PassManagerBuilder`] exposes hook slots for a caller to
//! supply its own pre-/post-mapping optimization passes.

pub mod verification;

pub use verification::{MeasurementBarrierVerification, VerificationResult};
