//! Axial hex coordinates and their world-space layout.
//!
//! Tiles are pointy-top hexagons addressed by axial `(q, r)` coordinates.
//! [`HexLayout`] turns a coordinate into the world center the graph uses
//! for neighbor detection, standing in for the renderer's
//! `getWorldCenter` query.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_sqrt, Fixed, Vec3Fixed};

/// Axial hex coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct HexCoord {
    /// Column axis.
    pub q: i32,
    /// Row axis.
    pub r: i32,
}

impl HexCoord {
    /// Create a coordinate.
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }
}

impl std::ops::Add for HexCoord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.q.saturating_add(rhs.q), self.r.saturating_add(rhs.r))
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Converts hex coordinates to world centers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexLayout {
    size: Fixed,
    sqrt3: Fixed,
}

impl HexLayout {
    /// Layout with the given hex radius (center to corner) in world units.
    #[must_use]
    pub fn new(size: Fixed) -> Self {
        Self {
            size,
            sqrt3: fixed_sqrt(Fixed::from_num(3)),
        }
    }

    /// Hex radius in world units.
    #[must_use]
    pub const fn size(&self) -> Fixed {
        self.size
    }

    /// World center of the given coordinate, on the ground plane.
    ///
    /// Saturates at the edge of the [`Fixed`] range; such centers are far
    /// from every realistic settlement and never within a neighbor threshold.
    #[must_use]
    pub fn world_center(&self, coord: HexCoord) -> Vec3Fixed {
        let q = Fixed::from_num(coord.q);
        let r = Fixed::from_num(coord.r);
        let half = Fixed::from_num(2);
        let column = q.saturating_add(r / half);
        let x = self.neighbor_spacing().saturating_mul(column);
        let z = (self.size * Fixed::from_num(3) / half).saturating_mul(r);
        Vec3Fixed::ground(x, z)
    }

    /// Distance between the centers of two adjacent hexes.
    #[must_use]
    pub fn neighbor_spacing(&self) -> Fixed {
        self.size * self.sqrt3
    }

    /// Neighbor spacing widened by `slack_percent` to absorb rounding.
    #[must_use]
    pub fn neighbor_threshold(&self, slack_percent: u32) -> Fixed {
        self.neighbor_spacing() * Fixed::from_num(100 + slack_percent) / Fixed::from_num(100)
    }
}

impl Default for HexLayout {
    fn default() -> Self {
        Self::new(Fixed::ONE)
    }
}
