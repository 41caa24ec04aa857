//! Structure templates and placed structures.
//!
//! A structure is a fixed, pre-shaped group of hex tiles placed onto the
//! settlement in one step. Templates are data: a list of axial offsets plus
//! the resource slots some of those offsets carry. Placing a template at an
//! origin yields the absolute coordinates the settlement registers.

use serde::{Deserialize, Serialize};

use crate::hex::HexCoord;
use crate::tile::{ResourceKind, ResourceSlot, TileId};

/// Unique identifier for placed structures, in placement order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct StructureId(pub u32);

impl StructureId {
    /// Create a new structure ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for StructureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "structure-{}", self.0)
    }
}

/// A resource slot carried by one cell of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCell {
    /// Offset of the carrying cell, relative to the template origin.
    pub offset: HexCoord,
    /// Resource kind.
    pub kind: ResourceKind,
    /// Starting amount.
    pub amount: u32,
}

/// Named shape of hex cells, relative to an origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureTemplate {
    /// Template name.
    pub name: String,
    /// Cell offsets, in tile registration order.
    pub cells: Vec<HexCoord>,
    /// Cells that carry a resource slot.
    #[serde(default)]
    pub resources: Vec<ResourceCell>,
}

impl StructureTemplate {
    /// Template with the given cells and no resources.
    #[must_use]
    pub fn new(name: impl Into<String>, cells: Vec<HexCoord>) -> Self {
        Self {
            name: name.into(),
            cells,
            resources: Vec::new(),
        }
    }

    /// The settlement's starting platform: a 4×4 rhombus of hexes.
    #[must_use]
    pub fn starter() -> Self {
        let cells = (0..4)
            .flat_map(|r| (0..4).map(move |q| HexCoord::new(q, r)))
            .collect();
        Self::new("starter", cells)
    }

    /// Three-hex dwelling.
    #[must_use]
    pub fn hut() -> Self {
        Self::new(
            "hut",
            vec![HexCoord::new(0, 0), HexCoord::new(1, 0), HexCoord::new(0, 1)],
        )
    }

    /// Straight walkway of `len` hexes along the `q` axis.
    #[must_use]
    pub fn walkway(len: u32) -> Self {
        let cells = (0..len as i32).map(|q| HexCoord::new(q, 0)).collect();
        Self::new(format!("walkway-{len}"), cells)
    }

    /// Single hex with a wood slot.
    #[must_use]
    pub fn lumber_grove(amount: u32) -> Self {
        Self::new("lumber_grove", vec![HexCoord::new(0, 0)]).with_resource(
            HexCoord::new(0, 0),
            ResourceKind::Wood,
            amount,
        )
    }

    /// Single hex with a rock slot.
    #[must_use]
    pub fn quarry(amount: u32) -> Self {
        Self::new("quarry", vec![HexCoord::new(0, 0)]).with_resource(
            HexCoord::new(0, 0),
            ResourceKind::Rock,
            amount,
        )
    }

    /// Single hex with a meat slot.
    #[must_use]
    pub fn hunting_ground(amount: u32) -> Self {
        Self::new("hunting_ground", vec![HexCoord::new(0, 0)]).with_resource(
            HexCoord::new(0, 0),
            ResourceKind::Meat,
            amount,
        )
    }

    /// Attach a resource slot to the cell at `offset`.
    ///
    /// The cell is appended to the shape if it is not already part of it.
    /// A second resource on the same cell replaces the first (one slot per tile).
    #[must_use]
    pub fn with_resource(mut self, offset: HexCoord, kind: ResourceKind, amount: u32) -> Self {
        if !self.cells.contains(&offset) {
            self.cells.push(offset);
        }
        self.resources.retain(|cell| cell.offset != offset);
        self.resources.push(ResourceCell {
            offset,
            kind,
            amount,
        });
        self
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if the template has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn slot_at(&self, offset: HexCoord) -> Option<ResourceSlot> {
        self.resources
            .iter()
            .find(|cell| cell.offset == offset)
            .map(|cell| ResourceSlot::new(cell.kind, cell.amount))
    }
}

/// A template anchored at an absolute origin, ready for placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    /// Shape and resources.
    pub template: StructureTemplate,
    /// Absolute coordinate of the template's `(0, 0)` cell.
    pub origin: HexCoord,
}

impl Structure {
    /// Anchor `template` at `origin`.
    #[must_use]
    pub fn new(template: StructureTemplate, origin: HexCoord) -> Self {
        Self { template, origin }
    }

    /// Absolute coordinates and initial slots, in registration order.
    #[must_use]
    pub fn cells(&self) -> Vec<(HexCoord, Option<ResourceSlot>)> {
        self.template
            .cells
            .iter()
            .map(|&offset| (self.origin + offset, self.template.slot_at(offset)))
            .collect()
    }

    /// Absolute coordinates only.
    pub fn coords(&self) -> impl Iterator<Item = HexCoord> + '_ {
        self.template.cells.iter().map(|&offset| self.origin + offset)
    }
}

/// Construction status of a placed structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildStatus {
    /// Fully built.
    Complete,
    /// Placed as a site; units walk on it and builders apply work to it.
    UnderConstruction {
        /// Work still needed.
        remaining: u32,
        /// Work needed in total.
        total: u32,
    },
}

impl BuildStatus {
    /// Check if construction is complete.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Construction progress as a percentage (0-100).
    #[must_use]
    pub fn percentage(&self) -> u32 {
        match *self {
            Self::Complete => 100,
            Self::UnderConstruction { total: 0, .. } => 100,
            Self::UnderConstruction { remaining, total } => ((total - remaining) * 100) / total,
        }
    }
}

/// A structure registered in the settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedStructure {
    /// Structure identifier.
    pub id: StructureId,
    /// The placed shape.
    pub structure: Structure,
    /// Tiles created for this structure, in registration order.
    pub tiles: Vec<TileId>,
    /// Construction status.
    pub status: BuildStatus,
}

impl PlacedStructure {
    /// Apply `work` to a structure under construction.
    ///
    /// Returns `true` if construction just completed.
    pub fn apply_work(&mut self, work: u32) -> bool {
        match self.status {
            BuildStatus::Complete => false,
            BuildStatus::UnderConstruction { remaining, total } => {
                let remaining = remaining.saturating_sub(work);
                if remaining == 0 {
                    self.status = BuildStatus::Complete;
                    true
                } else {
                    self.status = BuildStatus::UnderConstruction { remaining, total };
                    false
                }
            }
        }
    }
}
