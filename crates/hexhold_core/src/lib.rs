//! # Hexhold Core
//!
//! Deterministic settlement simulation on a hexagonal tile graph.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No floating-point math (uses fixed-point)
//!
//! The presentation layer places structures, spawns units and hands them
//! tasks; the core keeps the tile connectivity graph in sync, routes units
//! over it and runs each unit's task state machine on a fixed tick.
//!
//! ## Crate Structure
//!
//! - [`hex`], [`tile`], [`structure`] - Geometry, tiles, resource slots, structure templates
//! - [`graph`] - Tile connectivity graph and BFS routing
//! - [`settlement`] - Placement validation, registration and queries
//! - [`strategy`], [`unit`] - Task state machines and unit navigation
//! - [`simulation`] - Core simulation loop
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod economy;
pub mod error;
pub mod events;
pub mod graph;
pub mod hex;
pub mod math;
pub mod settlement;
pub mod simulation;
pub mod snapshot;
pub mod strategy;
pub mod structure;
pub mod tile;
pub mod timer;
pub mod unit;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{NavigationMode, SimConfig};
    pub use crate::economy::{ResourcePool, ResourceSink};
    pub use crate::error::{PlacementRejection, Result, SettlementError};
    pub use crate::events::SettlementEvent;
    pub use crate::graph::ConnectivityGraph;
    pub use crate::hex::{HexCoord, HexLayout};
    pub use crate::math::{Fixed, Vec3Fixed};
    pub use crate::settlement::Settlement;
    pub use crate::simulation::Simulation;
    pub use crate::snapshot::SettlementSnapshot;
    pub use crate::strategy::{Strategy, TaskKind, TaskState, TaskStrategy};
    pub use crate::structure::{BuildStatus, Structure, StructureId, StructureTemplate};
    pub use crate::tile::{ResourceKind, ResourceSlot, Tile, TileId};
    pub use crate::unit::{Unit, UnitId};
}
