//! Headless settlement runner for scenario testing and CI verification.
//!
//! Loads RON scenarios, drives the deterministic core for a number of ticks
//! and reports the outcome as JSON. This enables:
//!
//! - **Scenario testing**: check gathering and construction end to end
//! - **CI verification**: repeated runs must produce the same state hash
//! - **Path inspection**: print the BFS route between two tiles
//!
//! # Output
//!
//! - **stdout**: JSON report
//! - **stderr**: logs (human-readable)
//!
//! # Example
//!
//! ```bash
//! # Run the built-in demo
//! cargo run -p hexhold_headless -- demo --ticks 600
//!
//! # Run a scenario file
//! cargo run -p hexhold_headless -- run --scenario crates/hexhold_headless/scenarios/starter.ron
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod runner;
pub mod scenario;

pub use runner::{find_path, run_scenario, verify_determinism, HeadlessRunner, RunReport};
pub use scenario::{Scenario, ScenarioError, StructurePlacement, TemplateSpec, UnitPlacement};
