//! Shared test fixtures and utilities for simsense crates.
//!
//! Provides ground-truth fixtures and a tick driver, a scripted beacon
//! scanner, sample statistics and deterministic RNG setup.

pub mod fixtures;
pub mod mocks;
pub mod rng;
pub mod stats;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use fixtures::{at_rest, handle_at_rest, rotating, run_ticks, tick};
pub use mocks::{ScannerLog, ScriptedScanner, beacon_hit};
pub use rng::seeded_rng;
pub use stats::{mean, variance};
