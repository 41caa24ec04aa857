//! Notifications raised by the simulation for the presentation layer.
//!
//! Events carry ids only. Consumers drain them once per tick and look up
//! whatever else they need through the read-only queries.

use serde::{Deserialize, Serialize};

use crate::strategy::TaskState;
use crate::structure::StructureId;
use crate::tile::{ResourceKind, TileId};
use crate::unit::UnitId;

/// Something the presentation layer may react to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementEvent {
    /// A structure (finished or site) was placed.
    StructurePlaced {
        /// The new structure.
        structure: StructureId,
    },
    /// A construction site received its last unit of work.
    StructureCompleted {
        /// The finished structure.
        structure: StructureId,
    },
    /// A unit entered a new task state.
    UnitStateChanged {
        /// The unit.
        unit: UnitId,
        /// Previous state.
        from: TaskState,
        /// New state.
        to: TaskState,
    },
    /// A unit claimed a resource slot.
    SlotClaimed {
        /// Claiming unit.
        unit: UnitId,
        /// Tile carrying the slot.
        tile: TileId,
    },
    /// A unit released a resource slot.
    SlotReleased {
        /// Releasing unit.
        unit: UnitId,
        /// Tile carrying the slot.
        tile: TileId,
    },
    /// A timer firing credited resources to the pool.
    ResourceCredited {
        /// Working unit.
        unit: UnitId,
        /// Resource kind.
        kind: ResourceKind,
        /// Amount credited.
        amount: u32,
    },
    /// A slot reached zero.
    ResourceDepleted {
        /// Unit that drained it.
        unit: UnitId,
        /// Tile carrying the slot.
        tile: TileId,
    },
    /// An idle gatherer found nothing to claim.
    NoResourceAvailable {
        /// Searching unit.
        unit: UnitId,
        /// Requested kind.
        kind: ResourceKind,
    },
    /// A unit reached its destination tile.
    UnitArrived {
        /// The unit.
        unit: UnitId,
        /// Destination tile.
        tile: TileId,
    },
    /// An arrival was delivered while the unit was not traveling there.
    StaleArrivalIgnored {
        /// The unit.
        unit: UnitId,
        /// Reported tile.
        tile: TileId,
    },
    /// A move request could not be routed; the unit is stalled.
    MoveFailed {
        /// The unit.
        unit: UnitId,
        /// Requested destination.
        tile: TileId,
    },
}

/// FIFO buffer of pending events.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<SettlementEvent>,
}

impl EventQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn push(&mut self, event: SettlementEvent) {
        self.events.push(event);
    }

    /// Take every pending event, oldest first.
    pub fn drain(&mut self) -> Vec<SettlementEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pending events without consuming them.
    #[must_use]
    pub fn pending(&self) -> &[SettlementEvent] {
        &self.events
    }

    /// Number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
