//! Headless scenario runner.
//!
//! Drives a [`Simulation`] built from a [`Scenario`] and summarizes the run
//! as a serializable report.

use hexhold_core::prelude::{
    HexCoord, SettlementEvent, SettlementSnapshot, Simulation, TileId,
};
use serde::{Deserialize, Serialize};

use crate::scenario::{Scenario, ScenarioError};

/// Per-kind event tallies over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCounts {
    /// Structures placed (scenario setup included).
    pub structures_placed: u32,
    /// Construction sites finished.
    pub structures_completed: u32,
    /// Timer firings that credited resources.
    pub resources_credited: u32,
    /// Slots drained to zero.
    pub slots_depleted: u32,
    /// Failed resource searches.
    pub no_resource_available: u32,
    /// Accepted arrivals.
    pub arrivals: u32,
    /// Ignored arrivals.
    pub stale_arrivals: u32,
    /// Moves that could not be routed.
    pub move_failures: u32,
}

impl EventCounts {
    /// Count one event.
    pub fn record(&mut self, event: &SettlementEvent) {
        match event {
            SettlementEvent::StructurePlaced { .. } => self.structures_placed += 1,
            SettlementEvent::StructureCompleted { .. } => self.structures_completed += 1,
            SettlementEvent::ResourceCredited { .. } => self.resources_credited += 1,
            SettlementEvent::ResourceDepleted { .. } => self.slots_depleted += 1,
            SettlementEvent::NoResourceAvailable { .. } => self.no_resource_available += 1,
            SettlementEvent::UnitArrived { .. } => self.arrivals += 1,
            SettlementEvent::StaleArrivalIgnored { .. } => self.stale_arrivals += 1,
            SettlementEvent::MoveFailed { .. } => self.move_failures += 1,
            SettlementEvent::UnitStateChanged { .. }
            | SettlementEvent::SlotClaimed { .. }
            | SettlementEvent::SlotReleased { .. } => {}
        }
    }
}

/// Outcome of a headless run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Scenario name.
    pub scenario: String,
    /// Ticks simulated.
    pub ticks: u64,
    /// Simulated time in milliseconds.
    pub elapsed_ms: u64,
    /// Final state hash (for determinism validation).
    pub state_hash: u64,
    /// Event tallies.
    pub events: EventCounts,
    /// Final state.
    pub snapshot: SettlementSnapshot,
}

/// Runs one scenario to completion.
#[derive(Debug)]
pub struct HeadlessRunner {
    scenario: String,
    sim: Simulation,
    counts: EventCounts,
}

impl HeadlessRunner {
    /// Build the scenario's simulation.
    pub fn new(scenario: &Scenario) -> Result<Self, ScenarioError> {
        Ok(Self {
            scenario: scenario.name.clone(),
            sim: scenario.build_simulation()?,
            counts: EventCounts::default(),
        })
    }

    /// Advance `ticks` ticks, tallying events.
    pub fn run(&mut self, ticks: u64) {
        tracing::info!(scenario = %self.scenario, ticks, "Running scenario");
        for _ in 0..ticks {
            for event in self.sim.tick() {
                self.counts.record(&event);
            }
        }
        tracing::info!(
            tick = self.sim.current_tick(),
            credited = self.counts.resources_credited,
            "Run finished"
        );
    }

    /// The simulation being driven.
    #[must_use]
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Summarize the run so far.
    #[must_use]
    pub fn report(&self) -> RunReport {
        RunReport {
            scenario: self.scenario.clone(),
            ticks: self.sim.current_tick(),
            elapsed_ms: self.sim.now_ms(),
            state_hash: self.sim.state_hash(),
            events: self.counts,
            snapshot: self.sim.snapshot(),
        }
    }
}

/// Build and run `scenario` for `ticks` (or its own tick count).
pub fn run_scenario(scenario: &Scenario, ticks: Option<u64>) -> Result<RunReport, ScenarioError> {
    let mut runner = HeadlessRunner::new(scenario)?;
    runner.run(ticks.unwrap_or(scenario.ticks));
    Ok(runner.report())
}

/// Run `scenario` `runs` times and return the final hashes.
pub fn verify_determinism(
    scenario: &Scenario,
    ticks: u64,
    runs: u32,
) -> Result<Vec<u64>, ScenarioError> {
    (0..runs)
        .map(|_| {
            let mut sim = scenario.build_simulation()?;
            sim.run(ticks);
            Ok(sim.state_hash())
        })
        .collect()
}

/// One step of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    /// Tile id.
    pub tile: TileId,
    /// Hex of the tile.
    pub coord: HexCoord,
}

/// Shortest path between two tiles of a scenario's initial settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathReport {
    /// Start tile.
    pub from: TileId,
    /// End tile.
    pub to: TileId,
    /// Number of edges walked.
    pub hops: usize,
    /// Tiles in order, both ends included.
    pub steps: Vec<PathStep>,
}

/// Route between `from` and `to` over the scenario's initial settlement.
pub fn find_path(scenario: &Scenario, from: TileId, to: TileId) -> Result<PathReport, ScenarioError> {
    let sim = scenario.build_simulation()?;
    let steps: Vec<PathStep> = sim
        .settlement()
        .path_between(from, to)?
        .into_iter()
        .map(|tile| PathStep {
            tile: tile.id(),
            coord: tile.coord(),
        })
        .collect();
    Ok(PathReport {
        from,
        to,
        hops: steps.len() - 1,
        steps,
    })
}
