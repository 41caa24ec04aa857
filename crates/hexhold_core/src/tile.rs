//! Settlement tiles and the resource slots they may carry.
//!
//! A [`Tile`] is created when its structure is placed and lives as long as
//! the settlement. Its world center never changes. A tile holds at most one
//! [`ResourceSlot`], a depletable reservoir that one unit at a time may claim.

use serde::{Deserialize, Serialize};

use crate::hex::HexCoord;
use crate::math::Vec3Fixed;
use crate::structure::StructureId;

/// Unique tile identifier, assigned in registration order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TileId(pub u32);

impl TileId {
    /// Create a new tile ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "hex-{}", self.0)
    }
}

/// Kinds of gatherable resources.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ResourceKind {
    /// Gathered from groves.
    Wood,
    /// Gathered from quarries.
    Rock,
    /// Gathered from hunting grounds.
    Meat,
}

impl ResourceKind {
    /// Every resource kind, in display order.
    pub const ALL: [ResourceKind; 3] = [Self::Wood, Self::Rock, Self::Meat];
}

/// A depletable resource reservoir attached to a tile.
///
/// The amount only ever decreases. A slot at zero stays registered but is
/// skipped by resource searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSlot {
    /// What this slot yields.
    pub kind: ResourceKind,
    amount: u32,
    occupied: bool,
}

impl ResourceSlot {
    /// Create a free slot holding `amount` units of `kind`.
    #[must_use]
    pub const fn new(kind: ResourceKind, amount: u32) -> Self {
        Self {
            kind,
            amount,
            occupied: false,
        }
    }

    /// Remaining amount.
    #[must_use]
    pub const fn amount(&self) -> u32 {
        self.amount
    }

    /// Whether a unit currently holds the claim.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.occupied
    }

    /// Check if this slot is depleted.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.amount == 0
    }

    /// Free, non-empty and of the requested kind.
    #[must_use]
    pub fn is_available_for(&self, kind: ResourceKind) -> bool {
        !self.occupied && self.amount > 0 && self.kind == kind
    }

    /// Take the claim. Returns `false` if someone already holds it.
    pub fn claim(&mut self) -> bool {
        if self.occupied {
            return false;
        }
        self.occupied = true;
        true
    }

    /// Drop the claim. Releasing a free slot is a no-op.
    pub fn release(&mut self) {
        self.occupied = false;
    }

    /// Extract resources from this slot.
    ///
    /// Returns the actual amount extracted (may be less than requested if the
    /// slot is nearly depleted).
    pub fn extract(&mut self, requested: u32) -> u32 {
        let extracted = requested.min(self.amount);
        self.amount -= extracted;
        extracted
    }
}

/// A hexagonal settlement cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    id: TileId,
    coord: HexCoord,
    center: Vec3Fixed,
    structure: StructureId,
    /// Optional resource reservoir on this tile.
    pub slot: Option<ResourceSlot>,
}

impl Tile {
    /// Create a tile. Called by the settlement when a structure is placed.
    #[must_use]
    pub const fn new(
        id: TileId,
        coord: HexCoord,
        center: Vec3Fixed,
        structure: StructureId,
        slot: Option<ResourceSlot>,
    ) -> Self {
        Self {
            id,
            coord,
            center,
            structure,
            slot,
        }
    }

    /// Tile identifier.
    #[must_use]
    pub const fn id(&self) -> TileId {
        self.id
    }

    /// Axial coordinate.
    #[must_use]
    pub const fn coord(&self) -> HexCoord {
        self.coord
    }

    /// World center.
    #[must_use]
    pub const fn world_center(&self) -> Vec3Fixed {
        self.center
    }

    /// Structure this tile belongs to.
    #[must_use]
    pub const fn structure(&self) -> StructureId {
        self.structure
    }

    /// True if the tile has a free, non-empty slot of `kind`.
    #[must_use]
    pub fn offers(&self, kind: ResourceKind) -> bool {
        self.slot.is_some_and(|s| s.is_available_for(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_extraction() {
        let mut slot = ResourceSlot::new(ResourceKind::Wood, 25);

        assert_eq!(slot.extract(10), 10);
        assert_eq!(slot.amount(), 15);

        // Extract more than remaining
        assert_eq!(slot.extract(100), 15);
        assert_eq!(slot.amount(), 0);
        assert!(slot.is_depleted());
        assert_eq!(slot.extract(10), 0);
    }

    #[test]
    fn test_slot_claim_is_exclusive() {
        let mut slot = ResourceSlot::new(ResourceKind::Rock, 10);

        assert!(slot.claim());
        assert!(slot.is_occupied());
        assert!(!slot.claim());

        slot.release();
        assert!(!slot.is_occupied());
        assert!(slot.claim());
    }

    #[test]
    fn test_slot_availability() {
        let mut slot = ResourceSlot::new(ResourceKind::Meat, 10);
        assert!(slot.is_available_for(ResourceKind::Meat));
        assert!(!slot.is_available_for(ResourceKind::Wood));

        slot.claim();
        assert!(!slot.is_available_for(ResourceKind::Meat));

        slot.release();
        slot.extract(10);
        assert!(!slot.is_available_for(ResourceKind::Meat));
    }

    #[test]
    fn test_tile_id_display() {
        assert_eq!(TileId::new(7).to_string(), "hex-7");
    }
}
