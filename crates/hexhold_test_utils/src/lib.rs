//! # Hexhold Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Settlement and simulation fixtures
//! - Brute-force reference graph for cross-checking the incremental one
//! - Determinism test harness
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod reference;

/// Re-export proptest for convenience.
pub use proptest;
