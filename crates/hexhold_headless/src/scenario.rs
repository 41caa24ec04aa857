//! Scenario loading and configuration.
//!
//! Scenarios define the initial settlement for headless runs: simulation
//! config, structures in placement order, units with their tasks, and how
//! long to run.

use std::path::Path;

use hexhold_core::prelude::{
    HexCoord, NavigationMode, ResourceKind, SettlementError, SimConfig, Simulation, Structure,
    StructureTemplate, TaskKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The settlement refused part of the scenario.
    #[error("Scenario rejected: {0}")]
    Settlement(#[from] SettlementError),
    /// A unit was placed on a hex with no tile.
    #[error("No tile at {0}")]
    NoTileAt(HexCoord),
}

/// Shape of a structure in a scenario file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateSpec {
    /// The 4×4 starter platform.
    Starter,
    /// Three-hex dwelling.
    Hut,
    /// Straight walkway of the given length.
    Walkway(u32),
    /// Wood slot with the given amount.
    LumberGrove(u32),
    /// Rock slot with the given amount.
    Quarry(u32),
    /// Meat slot with the given amount.
    HuntingGround(u32),
    /// Free-form shape.
    Custom(StructureTemplate),
}

impl TemplateSpec {
    /// Build the template.
    #[must_use]
    pub fn to_template(&self) -> StructureTemplate {
        match self {
            Self::Starter => StructureTemplate::starter(),
            Self::Hut => StructureTemplate::hut(),
            Self::Walkway(len) => StructureTemplate::walkway(*len),
            Self::LumberGrove(amount) => StructureTemplate::lumber_grove(*amount),
            Self::Quarry(amount) => StructureTemplate::quarry(*amount),
            Self::HuntingGround(amount) => StructureTemplate::hunting_ground(*amount),
            Self::Custom(template) => template.clone(),
        }
    }
}

/// One structure placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructurePlacement {
    /// Shape to place.
    pub template: TemplateSpec,
    /// Axial origin.
    #[serde(default)]
    pub origin: HexCoord,
    /// Extra resource slots as (offset, kind, amount).
    #[serde(default)]
    pub resources: Vec<(HexCoord, ResourceKind, u32)>,
    /// Place as a construction site needing this much work.
    #[serde(default)]
    pub construction_work: Option<u32>,
}

impl StructurePlacement {
    /// A finished structure at `origin`.
    #[must_use]
    pub fn new(template: TemplateSpec, q: i32, r: i32) -> Self {
        Self {
            template,
            origin: HexCoord::new(q, r),
            resources: Vec::new(),
            construction_work: None,
        }
    }

    /// Add a resource slot.
    #[must_use]
    pub fn with_resource(mut self, q: i32, r: i32, kind: ResourceKind, amount: u32) -> Self {
        self.resources.push((HexCoord::new(q, r), kind, amount));
        self
    }

    /// Mark as a construction site.
    #[must_use]
    pub fn under_construction(mut self, work: u32) -> Self {
        self.construction_work = Some(work);
        self
    }

    fn to_structure(&self) -> Structure {
        let template = self
            .resources
            .iter()
            .fold(self.template.to_template(), |t, &(offset, kind, amount)| {
                t.with_resource(offset, kind, amount)
            });
        Structure::new(template, self.origin)
    }
}

/// Units to spawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPlacement {
    /// Task to assign; `None` leaves the units idle.
    pub task: Option<TaskKind>,
    /// Spawn hex; the starter tile when absent.
    #[serde(default)]
    pub position: Option<HexCoord>,
    /// How many identical units.
    #[serde(default = "default_count")]
    pub count: u32,
}

impl UnitPlacement {
    /// `count` units on the starter tile doing `task`.
    #[must_use]
    pub fn new(task: TaskKind, count: u32) -> Self {
        Self {
            task: Some(task),
            position: None,
            count,
        }
    }
}

fn default_count() -> u32 {
    1
}

fn default_ticks() -> u64 {
    1200
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Simulation parameters.
    #[serde(default)]
    pub config: SimConfig,
    /// Structures in placement order.
    pub structures: Vec<StructurePlacement>,
    /// Units in spawn order.
    #[serde(default)]
    pub units: Vec<UnitPlacement>,
    /// Ticks to run when none are given on the command line.
    #[serde(default = "default_ticks")]
    pub ticks: u64,
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario: Scenario = ron::from_str(&contents)?;
        tracing::debug!(name = %scenario.name, path = %path.display(), "Scenario loaded");
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Serialize to pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// The built-in demo: starter platform with wood and rock, a quarry, a
    /// hunting ground, a hut under construction and five workers.
    #[must_use]
    pub fn starter_demo() -> Self {
        Self {
            name: "Starter Demo".to_string(),
            description: "Starter platform with every task kind in play".to_string(),
            config: SimConfig::default(),
            structures: vec![
                StructurePlacement::new(TemplateSpec::Starter, 0, 0)
                    .with_resource(3, 3, ResourceKind::Wood, 40)
                    .with_resource(0, 3, ResourceKind::Wood, 20)
                    .with_resource(3, 0, ResourceKind::Rock, 10),
                StructurePlacement::new(TemplateSpec::Quarry(30), -1, 2),
                StructurePlacement::new(TemplateSpec::HuntingGround(20), 4, 0),
                StructurePlacement::new(TemplateSpec::Hut, 4, 2).under_construction(40),
            ],
            units: vec![
                UnitPlacement::new(TaskKind::Gather(ResourceKind::Wood), 2),
                UnitPlacement::new(TaskKind::Gather(ResourceKind::Rock), 1),
                UnitPlacement::new(TaskKind::Gather(ResourceKind::Meat), 1),
                UnitPlacement::new(TaskKind::Construct, 1),
            ],
            ticks: 1200,
        }
    }

    /// Build the initial simulation.
    pub fn build_simulation(&self) -> Result<Simulation, ScenarioError> {
        let mut sim = Simulation::new(self.config.clone())?;

        for placement in &self.structures {
            let structure = placement.to_structure();
            match placement.construction_work {
                Some(work) => sim.place_construction_site(structure, work)?,
                None => sim.place_structure(structure)?,
            };
        }

        if self.config.navigation == NavigationMode::External && !self.units.is_empty() {
            tracing::warn!(
                scenario = %self.name,
                "External navigation: units will wait for arrivals that never come"
            );
        }

        for placement in &self.units {
            let position = match placement.position {
                Some(coord) => Some(
                    sim.settlement()
                        .tile_at(coord)
                        .ok_or(ScenarioError::NoTileAt(coord))?,
                ),
                None => None,
            };
            for _ in 0..placement.count {
                let unit = sim.spawn_unit(position)?;
                if let Some(task) = placement.task {
                    sim.assign_task(unit, task)?;
                }
            }
        }

        tracing::info!(
            scenario = %self.name,
            structures = self.structures.len(),
            units = sim.units().count(),
            "Scenario built"
        );
        Ok(sim)
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::starter_demo()
    }
}
