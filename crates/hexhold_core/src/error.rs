//! Error types for the settlement core.

use thiserror::Error;

use crate::tile::TileId;
use crate::unit::UnitId;

/// Result type alias using [`SettlementError`].
pub type Result<T> = std::result::Result<T, SettlementError>;

/// Why a structure was refused by placement validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementRejection {
    /// At least one tile coincides with a tile of an existing structure.
    Overlap,
    /// No tile lies within the neighbor threshold of the settlement.
    NotAdjacent,
    /// The structure has no tiles at all.
    Empty,
}

impl std::fmt::Display for PlacementRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overlap => write!(f, "overlaps an existing structure"),
            Self::NotAdjacent => write!(f, "not adjacent to the settlement"),
            Self::Empty => write!(f, "structure has no tiles"),
        }
    }
}

/// Top-level error type for all settlement errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettlementError {
    /// A tile id is not registered in the settlement or graph.
    #[error("Unknown tile: {0}")]
    UnknownTile(TileId),

    /// Both tiles exist but no route connects them.
    #[error("No path from {from} to {to}")]
    PathNotFound {
        /// Start tile.
        from: TileId,
        /// Destination tile.
        to: TileId,
    },

    /// Structure placement refused; nothing was mutated.
    #[error("Placement rejected: {0}")]
    PlacementRejected(PlacementRejection),

    /// A tile id was inserted twice into the graph.
    #[error("Tile {0} is already registered")]
    DuplicateTile(TileId),

    /// The slot is already claimed by another unit.
    #[error("Resource slot on {0} is already occupied")]
    SlotOccupied(TileId),

    /// The tile carries no resource slot.
    #[error("Tile {0} has no resource slot")]
    NoResourceSlot(TileId),

    /// A unit id is not registered in the simulation.
    #[error("Unknown unit: {0}")]
    UnknownUnit(UnitId),

    /// Configuration values failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration text could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),
}
