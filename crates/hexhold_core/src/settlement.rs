//! The player settlement: placed structures, their tiles, and the
//! connectivity graph units walk on.
//!
//! Tile ids are assigned sequentially in registration order, so the tile
//! list doubles as the id lookup table. Every structure is registered
//! atomically: either its tiles and graph edges are all added or nothing
//! changes.

use std::collections::BTreeMap;

use crate::error::{PlacementRejection, Result, SettlementError};
use crate::graph::ConnectivityGraph;
use crate::hex::{HexCoord, HexLayout};
use crate::math::Fixed;
use crate::structure::{BuildStatus, PlacedStructure, Structure, StructureId};
use crate::tile::{ResourceKind, ResourceSlot, Tile, TileId};

/// Owns every placed structure, the flattened tile list and the graph.
#[derive(Debug, Clone)]
pub struct Settlement {
    layout: HexLayout,
    structures: Vec<PlacedStructure>,
    tiles: Vec<Tile>,
    occupancy: BTreeMap<HexCoord, TileId>,
    graph: ConnectivityGraph,
}

impl Settlement {
    /// Empty settlement.
    #[must_use]
    pub fn new(layout: HexLayout, neighbor_threshold: Fixed) -> Self {
        Self {
            layout,
            structures: Vec::new(),
            tiles: Vec::new(),
            occupancy: BTreeMap::new(),
            graph: ConnectivityGraph::new(neighbor_threshold),
        }
    }

    // ------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------

    /// Validate a structure against the current settlement.
    ///
    /// Rejected if it is empty, if any cell coincides with an existing tile
    /// (or with another of its own cells), or if the settlement is non-empty
    /// and no cell lies within the neighbor threshold of an existing tile.
    pub fn check_placement(&self, structure: &Structure) -> Result<()> {
        if structure.template.is_empty() {
            return Err(SettlementError::PlacementRejected(PlacementRejection::Empty));
        }

        let mut seen = Vec::with_capacity(structure.template.len());
        for coord in structure.coords() {
            if self.occupancy.contains_key(&coord) || seen.contains(&coord) {
                return Err(SettlementError::PlacementRejected(PlacementRejection::Overlap));
            }
            seen.push(coord);
        }

        if self.tiles.is_empty() {
            return Ok(());
        }

        let threshold = self.graph.threshold();
        let adjacent = structure.coords().any(|coord| {
            let center = self.layout.world_center(coord);
            self.tiles
                .iter()
                .any(|tile| center.is_within(tile.world_center(), threshold))
        });

        if adjacent {
            Ok(())
        } else {
            Err(SettlementError::PlacementRejected(PlacementRejection::NotAdjacent))
        }
    }

    /// True iff the structure passes [`check_placement`](Self::check_placement).
    #[must_use]
    pub fn can_place(&self, structure: &Structure) -> bool {
        self.check_placement(structure).is_ok()
    }

    /// Place a finished structure.
    pub fn add_structure(&mut self, structure: Structure) -> Result<StructureId> {
        self.check_placement(&structure)?;
        self.register(structure, BuildStatus::Complete)
    }

    /// Place a structure as a construction site needing `work` to finish.
    ///
    /// Site tiles are walkable and join the graph immediately.
    pub fn add_construction_site(&mut self, structure: Structure, work: u32) -> Result<StructureId> {
        self.check_placement(&structure)?;
        let status = if work == 0 {
            BuildStatus::Complete
        } else {
            BuildStatus::UnderConstruction {
                remaining: work,
                total: work,
            }
        };
        self.register(structure, status)
    }

    fn register(&mut self, structure: Structure, status: BuildStatus) -> Result<StructureId> {
        let id = StructureId::new(self.structures.len() as u32);
        let first = self.tiles.len() as u32;

        let new_tiles: Vec<Tile> = structure
            .cells()
            .into_iter()
            .enumerate()
            .map(|(n, (coord, slot))| {
                Tile::new(
                    TileId::new(first + n as u32),
                    coord,
                    self.layout.world_center(coord),
                    id,
                    slot,
                )
            })
            .collect();

        let vertices: Vec<_> = new_tiles
            .iter()
            .map(|t| (t.id(), t.world_center()))
            .collect();
        // Graph first: if it refuses, nothing else has been touched.
        self.graph.add_tiles(&vertices)?;

        let tile_ids: Vec<TileId> = new_tiles.iter().map(Tile::id).collect();
        for tile in new_tiles {
            self.occupancy.insert(tile.coord(), tile.id());
            self.tiles.push(tile);
        }

        tracing::info!(
            structure = %id,
            template = %structure.template.name,
            origin = %structure.origin,
            tiles = tile_ids.len(),
            "Structure placed"
        );

        self.structures.push(PlacedStructure {
            id,
            structure,
            tiles: tile_ids,
            status,
        });
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Pathfinding
    // ------------------------------------------------------------------

    /// Shortest route between two tiles as tile ids, both endpoints included.
    pub fn route(&self, from: TileId, to: TileId) -> Result<Vec<TileId>> {
        self.graph.shortest_path(from, to)
    }

    /// Shortest route between two tiles, resolved to tiles.
    ///
    /// # Errors
    ///
    /// [`SettlementError::UnknownTile`] or [`SettlementError::PathNotFound`].
    pub fn path_between(&self, from: TileId, to: TileId) -> Result<Vec<&Tile>> {
        self.route(from, to)?
            .into_iter()
            .map(|id| self.tile(id).ok_or(SettlementError::UnknownTile(id)))
            .collect()
    }

    /// Nearest tile, by graph distance from `from`, holding a free non-empty
    /// slot of `kind`. Ties go to the earliest registered tile.
    pub fn find_nearest_resource(&self, kind: ResourceKind, from: TileId) -> Result<Option<TileId>> {
        self.nearest_matching(from, |tile| tile.offers(kind))
    }

    /// Nearest tile, by graph distance, belonging to an unfinished structure.
    pub fn find_nearest_construction_site(&self, from: TileId) -> Result<Option<TileId>> {
        self.nearest_matching(from, |tile| {
            !self.structures[tile.structure().0 as usize].status.is_complete()
        })
    }

    fn nearest_matching(
        &self,
        from: TileId,
        mut matches: impl FnMut(&Tile) -> bool,
    ) -> Result<Option<TileId>> {
        let distances = self.graph.distances_from(from)?;

        let mut best: Option<(u32, TileId)> = None;
        for tile in &self.tiles {
            if !matches(tile) {
                continue;
            }
            let Some(&d) = distances.get(&tile.id()) else {
                continue;
            };
            // Strict comparison keeps the first-registered tile on ties.
            if best.map_or(true, |(best_d, _)| d < best_d) {
                best = Some((d, tile.id()));
            }
        }
        Ok(best.map(|(_, id)| id))
    }

    // ------------------------------------------------------------------
    // Resource slots
    // ------------------------------------------------------------------

    /// Resource slot on a tile, if any.
    #[must_use]
    pub fn slot(&self, id: TileId) -> Option<&ResourceSlot> {
        self.tile(id).and_then(|t| t.slot.as_ref())
    }

    fn slot_mut(&mut self, id: TileId) -> Result<&mut ResourceSlot> {
        self.tiles
            .get_mut(id.0 as usize)
            .ok_or(SettlementError::UnknownTile(id))?
            .slot
            .as_mut()
            .ok_or(SettlementError::NoResourceSlot(id))
    }

    /// Mark the slot on `id` occupied.
    ///
    /// # Errors
    ///
    /// [`SettlementError::SlotOccupied`] if another unit holds it.
    pub fn claim_slot(&mut self, id: TileId) -> Result<()> {
        if self.slot_mut(id)?.claim() {
            Ok(())
        } else {
            Err(SettlementError::SlotOccupied(id))
        }
    }

    /// Mark the slot on `id` free.
    pub fn release_slot(&mut self, id: TileId) -> Result<()> {
        self.slot_mut(id)?.release();
        Ok(())
    }

    /// Remove up to `amount` from the slot on `id`; returns what was removed.
    pub fn extract(&mut self, id: TileId, amount: u32) -> Result<u32> {
        Ok(self.slot_mut(id)?.extract(amount))
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Whether the structure owning `tile` still needs work.
    pub fn is_under_construction(&self, tile: TileId) -> Result<bool> {
        let tile = self.tile(tile).ok_or(SettlementError::UnknownTile(tile))?;
        Ok(!self.structures[tile.structure().0 as usize].status.is_complete())
    }

    /// Apply `work` to the structure owning `tile`.
    ///
    /// Returns the structure id when this call completed it.
    pub fn apply_work(&mut self, tile: TileId, work: u32) -> Result<Option<StructureId>> {
        let structure = self
            .tile(tile)
            .ok_or(SettlementError::UnknownTile(tile))?
            .structure();
        let placed = &mut self.structures[structure.0 as usize];
        if placed.apply_work(work) {
            tracing::info!(structure = %structure, "Construction complete");
            Ok(Some(structure))
        } else {
            Ok(None)
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Tile by id.
    #[must_use]
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.0 as usize)
    }

    /// Tile occupying `coord`, if any.
    #[must_use]
    pub fn tile_at(&self, coord: HexCoord) -> Option<TileId> {
        self.occupancy.get(&coord).copied()
    }

    /// All tiles in registration order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// The first registered tile; new units start here.
    #[must_use]
    pub fn starter_tile(&self) -> Option<TileId> {
        self.tiles.first().map(Tile::id)
    }

    /// Placed structures in placement order.
    #[must_use]
    pub fn structures(&self) -> &[PlacedStructure] {
        &self.structures
    }

    /// Structure by id.
    #[must_use]
    pub fn structure(&self, id: StructureId) -> Option<&PlacedStructure> {
        self.structures.get(id.0 as usize)
    }

    /// The connectivity graph.
    #[must_use]
    pub fn graph(&self) -> &ConnectivityGraph {
        &self.graph
    }

    /// Hex layout used for world centers.
    #[must_use]
    pub const fn layout(&self) -> &HexLayout {
        &self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::StructureTemplate;

    fn settlement() -> Settlement {
        let layout = HexLayout::default();
        Settlement::new(layout, layout.neighbor_threshold(10))
    }

    fn starter_with_wood(amount: u32) -> Structure {
        Structure::new(
            StructureTemplate::starter().with_resource(HexCoord::new(3, 3), ResourceKind::Wood, amount),
            HexCoord::new(0, 0),
        )
    }

    #[test]
    fn test_first_structure_always_placeable() {
        let s = settlement();
        let far = Structure::new(StructureTemplate::hut(), HexCoord::new(100, 100));
        assert!(s.can_place(&far));
    }

    #[test]
    fn test_add_structure_registers_tiles_and_edges() {
        let mut s = settlement();
        let id = s.add_structure(starter_with_wood(20)).unwrap();

        assert_eq!(id, StructureId::new(0));
        assert_eq!(s.tiles().len(), 16);
        assert_eq!(s.graph().vertex_count(), 16);
        // 4x4 rhombus: 3*4 + 3*4 + 3*3 = 33 edges
        assert_eq!(s.graph().edge_count(), 33);
        assert_eq!(s.starter_tile(), Some(TileId::new(0)));
        assert_eq!(s.tile_at(HexCoord::new(3, 3)), Some(TileId::new(15)));
    }

    #[test]
    fn test_overlap_rejected_without_mutation() {
        let mut s = settlement();
        s.add_structure(starter_with_wood(20)).unwrap();
        let overlapping = Structure::new(StructureTemplate::hut(), HexCoord::new(3, 3));

        assert!(!s.can_place(&overlapping));
        assert_eq!(
            s.add_structure(overlapping),
            Err(SettlementError::PlacementRejected(PlacementRejection::Overlap))
        );
        assert_eq!(s.tiles().len(), 16);
        assert_eq!(s.structures().len(), 1);
    }

    #[test]
    fn test_non_adjacent_rejected() {
        let mut s = settlement();
        s.add_structure(starter_with_wood(20)).unwrap();
        let island = Structure::new(StructureTemplate::hut(), HexCoord::new(10, 0));

        assert_eq!(
            s.check_placement(&island),
            Err(SettlementError::PlacementRejected(PlacementRejection::NotAdjacent))
        );

        let touching = Structure::new(StructureTemplate::hut(), HexCoord::new(4, 0));
        assert!(s.can_place(&touching));
    }

    #[test]
    fn test_distant_placement_rejected_not_adjacent() {
        let mut s = settlement();
        s.add_structure(starter_with_wood(20)).unwrap();

        for origin in [
            HexCoord::new(30_000, 0),
            HexCoord::new(-2_000_000_000, 5),
            HexCoord::new(i32::MAX - 10, i32::MAX - 10),
        ] {
            let far = Structure::new(StructureTemplate::hut(), origin);
            assert!(!s.can_place(&far), "{origin}");
            assert_eq!(
                s.add_structure(far),
                Err(SettlementError::PlacementRejected(PlacementRejection::NotAdjacent))
            );
        }
        assert_eq!(s.tiles().len(), 16);
        assert_eq!(s.graph().edge_count(), 33);
    }

    #[test]
    fn test_empty_structure_rejected() {
        let s = settlement();
        let empty = Structure::new(StructureTemplate::new("nothing", vec![]), HexCoord::default());
        assert_eq!(
            s.check_placement(&empty),
            Err(SettlementError::PlacementRejected(PlacementRejection::Empty))
        );
    }

    #[test]
    fn test_path_between_resolves_tiles() {
        let mut s = settlement();
        s.add_structure(starter_with_wood(20)).unwrap();

        let path = s.path_between(TileId::new(0), TileId::new(3)).unwrap();
        let coords: Vec<_> = path.iter().map(|t| t.coord()).collect();
        assert_eq!(
            coords,
            vec![
                HexCoord::new(0, 0),
                HexCoord::new(1, 0),
                HexCoord::new(2, 0),
                HexCoord::new(3, 0)
            ]
        );

        assert_eq!(
            s.path_between(TileId::new(0), TileId::new(99)).err(),
            Some(SettlementError::UnknownTile(TileId::new(99)))
        );
    }

    #[test]
    fn test_find_nearest_resource_uses_graph_distance() {
        let mut s = settlement();
        s.add_structure(starter_with_wood(20)).unwrap();
        // A second wood slot just east of the starter's first row.
        s.add_structure(Structure::new(StructureTemplate::lumber_grove(50), HexCoord::new(4, 0)))
            .unwrap();

        let from_origin = s.find_nearest_resource(ResourceKind::Wood, TileId::new(0)).unwrap();
        assert_eq!(from_origin, s.tile_at(HexCoord::new(4, 0)));

        let from_corner = s
            .find_nearest_resource(ResourceKind::Wood, s.tile_at(HexCoord::new(3, 2)).unwrap())
            .unwrap();
        assert_eq!(from_corner, s.tile_at(HexCoord::new(3, 3)));

        assert_eq!(s.find_nearest_resource(ResourceKind::Rock, TileId::new(0)).unwrap(), None);
    }

    #[test]
    fn test_find_nearest_resource_skips_occupied_and_empty() {
        let mut s = settlement();
        s.add_structure(starter_with_wood(10)).unwrap();
        let wood = s.tile_at(HexCoord::new(3, 3)).unwrap();

        s.claim_slot(wood).unwrap();
        assert_eq!(s.find_nearest_resource(ResourceKind::Wood, TileId::new(0)).unwrap(), None);

        s.release_slot(wood).unwrap();
        assert_eq!(s.extract(wood, 25).unwrap(), 10);
        assert_eq!(s.find_nearest_resource(ResourceKind::Wood, TileId::new(0)).unwrap(), None);
    }

    #[test]
    fn test_nearest_resource_tie_goes_to_first_registered() {
        let mut s = settlement();
        let template = StructureTemplate::walkway(3)
            .with_resource(HexCoord::new(0, 0), ResourceKind::Meat, 5)
            .with_resource(HexCoord::new(2, 0), ResourceKind::Meat, 5);
        s.add_structure(Structure::new(template, HexCoord::default())).unwrap();

        let middle = s.tile_at(HexCoord::new(1, 0)).unwrap();
        assert_eq!(
            s.find_nearest_resource(ResourceKind::Meat, middle).unwrap(),
            Some(TileId::new(0))
        );
    }

    #[test]
    fn test_claim_slot_errors() {
        let mut s = settlement();
        s.add_structure(starter_with_wood(10)).unwrap();
        let wood = s.tile_at(HexCoord::new(3, 3)).unwrap();

        assert!(s.claim_slot(wood).is_ok());
        assert_eq!(s.claim_slot(wood), Err(SettlementError::SlotOccupied(wood)));
        assert_eq!(
            s.claim_slot(TileId::new(0)),
            Err(SettlementError::NoResourceSlot(TileId::new(0)))
        );
        assert_eq!(
            s.claim_slot(TileId::new(500)),
            Err(SettlementError::UnknownTile(TileId::new(500)))
        );
    }

    #[test]
    fn test_construction_site_progress() {
        let mut s = settlement();
        s.add_structure(starter_with_wood(10)).unwrap();
        let site = s
            .add_construction_site(Structure::new(StructureTemplate::hut(), HexCoord::new(4, 0)), 20)
            .unwrap();
        let site_tile = s.structure(site).unwrap().tiles[0];

        assert!(s.is_under_construction(site_tile).unwrap());
        assert_eq!(s.find_nearest_construction_site(TileId::new(0)).unwrap(), Some(site_tile));

        assert_eq!(s.apply_work(site_tile, 10).unwrap(), None);
        assert_eq!(s.apply_work(site_tile, 10).unwrap(), Some(site));
        assert!(!s.is_under_construction(site_tile).unwrap());
        assert_eq!(s.find_nearest_construction_site(TileId::new(0)).unwrap(), None);
    }
}
