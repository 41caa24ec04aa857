//! Read-only view of the simulation for presentation and reports.

use serde::{Deserialize, Serialize};

use crate::hex::HexCoord;
use crate::strategy::{Strategy, TaskKind, TaskState};
use crate::structure::StructureId;
use crate::tile::{ResourceKind, TileId};
use crate::unit::{Unit, UnitId};

/// Everything observable about a simulation at one tick.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettlementSnapshot {
    /// Ticks elapsed.
    pub tick: u64,
    /// Structures in placement order.
    pub structures: Vec<StructureView>,
    /// Every resource slot in tile order, depleted ones included.
    pub slots: Vec<SlotView>,
    /// Units by id.
    pub units: Vec<UnitView>,
    /// Stockpile per kind.
    pub resources: Vec<(ResourceKind, u64)>,
}

/// One placed structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructureView {
    /// Structure id.
    pub id: StructureId,
    /// Template name.
    pub name: String,
    /// Placement origin.
    pub origin: HexCoord,
    /// Number of tiles.
    pub tiles: usize,
    /// Construction progress, 100 when complete.
    pub progress: u32,
}

/// One resource slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotView {
    /// Tile carrying the slot.
    pub tile: TileId,
    /// Hex of that tile.
    pub coord: HexCoord,
    /// Resource kind.
    pub kind: ResourceKind,
    /// Amount left.
    pub amount: u32,
    /// Whether a unit holds it.
    pub occupied: bool,
}

/// One unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitView {
    /// Unit id.
    pub id: UnitId,
    /// Current tile.
    pub position: TileId,
    /// Task state.
    pub state: TaskState,
    /// Assigned task.
    pub task: Option<TaskKind>,
    /// Tile the task targets.
    pub target: Option<TileId>,
    /// Move destination, if walking.
    pub destination: Option<TileId>,
    /// Tiles still ahead on the route.
    pub route: Vec<TileId>,
}

impl From<&Unit> for UnitView {
    fn from(unit: &Unit) -> Self {
        Self {
            id: unit.id(),
            position: unit.position(),
            state: unit.state(),
            task: unit.task(),
            target: unit.strategy().and_then(Strategy::target),
            destination: unit.destination(),
            route: unit.remaining_route().to_vec(),
        }
    }
}
