//! Connectivity graph over settlement tiles.
//!
//! One vertex per tile, undirected unit-weight edges between any two tiles
//! whose world centers lie closer than the neighbor threshold. Shortest
//! paths use breadth-first search, which is exact for unit weights.
//!
//! # Determinism
//!
//! Vertices are stored in registration order and every adjacency list is
//! kept sorted by that order. BFS expands neighbors in list order and keeps
//! the first parent it finds, so ties between equal-length paths always
//! resolve the same way.

use std::collections::{BTreeMap, VecDeque};

use crate::error::{Result, SettlementError};
use crate::math::{Fixed, Vec3Fixed};
use crate::tile::TileId;

/// Cost of traversing one edge.
pub const EDGE_WEIGHT: u32 = 1;

/// Adjacency structure over all tiles of the settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityGraph {
    /// Neighbor threshold in world units (strict `<`).
    threshold: Fixed,
    /// Vertex index to tile id, in registration order.
    ids: Vec<TileId>,
    /// World center per vertex.
    centers: Vec<Vec3Fixed>,
    /// Tile id to vertex index.
    index: BTreeMap<TileId, usize>,
    /// Sorted neighbor indices per vertex.
    adjacency: Vec<Vec<usize>>,
}

impl ConnectivityGraph {
    /// Empty graph using the given neighbor threshold.
    #[must_use]
    pub fn new(threshold: Fixed) -> Self {
        Self {
            threshold,
            ids: Vec::new(),
            centers: Vec::new(),
            index: BTreeMap::new(),
            adjacency: Vec::new(),
        }
    }

    /// Neighbor threshold in world units.
    #[must_use]
    pub const fn threshold(&self) -> Fixed {
        self.threshold
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.ids.len()
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Check if a tile is a vertex of the graph.
    #[must_use]
    pub fn contains(&self, id: TileId) -> bool {
        self.index.contains_key(&id)
    }

    /// Neighbors of `id`, in registration order.
    pub fn neighbors(&self, id: TileId) -> Result<Vec<TileId>> {
        let i = self.vertex(id)?;
        Ok(self.adjacency[i].iter().map(|&j| self.ids[j]).collect())
    }

    /// All edges as `(lower, higher)` pairs in registration order.
    #[must_use]
    pub fn edges(&self) -> Vec<(TileId, TileId)> {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(i, list)| {
                list.iter()
                    .filter(move |&&j| j > i)
                    .map(move |&j| (self.ids[i], self.ids[j]))
            })
            .collect()
    }

    /// Insert vertices for `tiles` and connect them to every tile within
    /// the threshold, existing or new.
    ///
    /// Only new × (existing ∪ new) pairs are compared; the resulting edge set
    /// equals a full pairwise [`rebuild`](Self::rebuild). The graph is left
    /// untouched if any id is already present or repeated in `tiles`.
    pub fn add_tiles(&mut self, tiles: &[(TileId, Vec3Fixed)]) -> Result<()> {
        for (n, (id, _)) in tiles.iter().enumerate() {
            if self.contains(*id) || tiles[..n].iter().any(|(other, _)| other == id) {
                return Err(SettlementError::DuplicateTile(*id));
            }
        }

        for &(id, center) in tiles {
            let i = self.ids.len();
            self.ids.push(id);
            self.centers.push(center);
            self.index.insert(id, i);
            self.adjacency.push(Vec::new());

            // Every j < i, so each list stays sorted as i only grows.
            for j in 0..i {
                if center.is_within(self.centers[j], self.threshold) {
                    self.adjacency[i].push(j);
                    self.adjacency[j].push(i);
                }
            }
        }

        tracing::debug!(
            added = tiles.len(),
            vertices = self.vertex_count(),
            edges = self.edge_count(),
            "Connectivity graph extended"
        );
        Ok(())
    }

    /// Recompute every edge from scratch by pairwise distance.
    pub fn rebuild(&mut self) {
        let n = self.ids.len();
        self.adjacency = vec![Vec::new(); n];
        for i in 0..n {
            for j in (i + 1)..n {
                if self.centers[i].is_within(self.centers[j], self.threshold) {
                    self.adjacency[i].push(j);
                    self.adjacency[j].push(i);
                }
            }
        }
    }

    /// Shortest path from `from` to `to`, both endpoints included.
    ///
    /// # Errors
    ///
    /// - [`SettlementError::UnknownTile`] if either endpoint is not a vertex
    /// - [`SettlementError::PathNotFound`] if the endpoints are disconnected
    pub fn shortest_path(&self, from: TileId, to: TileId) -> Result<Vec<TileId>> {
        let start = self.vertex(from)?;
        let goal = self.vertex(to)?;

        if start == goal {
            return Ok(vec![from]);
        }

        let mut came_from: Vec<Option<usize>> = vec![None; self.ids.len()];
        let mut visited = vec![false; self.ids.len()];
        let mut open = VecDeque::new();
        visited[start] = true;
        open.push_back(start);

        while let Some(current) = open.pop_front() {
            for &next in &self.adjacency[current] {
                if visited[next] {
                    continue;
                }
                visited[next] = true;
                came_from[next] = Some(current);
                if next == goal {
                    return Ok(self.reconstruct_path(&came_from, goal));
                }
                open.push_back(next);
            }
        }

        Err(SettlementError::PathNotFound { from, to })
    }

    /// Hop distance from `from` to every reachable tile (including itself).
    pub fn distances_from(&self, from: TileId) -> Result<BTreeMap<TileId, u32>> {
        let start = self.vertex(from)?;

        let mut dist: Vec<Option<u32>> = vec![None; self.ids.len()];
        let mut open = VecDeque::new();
        dist[start] = Some(0);
        open.push_back(start);

        while let Some(current) = open.pop_front() {
            let d = dist[current].unwrap_or_default();
            for &next in &self.adjacency[current] {
                if dist[next].is_none() {
                    dist[next] = Some(d + EDGE_WEIGHT);
                    open.push_back(next);
                }
            }
        }

        Ok(dist
            .into_iter()
            .enumerate()
            .filter_map(|(i, d)| d.map(|d| (self.ids[i], d)))
            .collect())
    }

    fn vertex(&self, id: TileId) -> Result<usize> {
        self.index
            .get(&id)
            .copied()
            .ok_or(SettlementError::UnknownTile(id))
    }

    /// Reconstruct path from came_from links.
    fn reconstruct_path(&self, came_from: &[Option<usize>], goal: usize) -> Vec<TileId> {
        let mut path = vec![self.ids[goal]];
        let mut current = goal;

        while let Some(prev) = came_from[current] {
            path.push(self.ids[prev]);
            current = prev;
        }

        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::{HexCoord, HexLayout};

    fn layout() -> HexLayout {
        HexLayout::default()
    }

    /// Tiles at the given axial coordinates, ids numbered from `first`.
    fn tiles(first: u32, coords: &[(i32, i32)]) -> Vec<(TileId, Vec3Fixed)> {
        coords
            .iter()
            .enumerate()
            .map(|(n, &(q, r))| {
                (
                    TileId::new(first + n as u32),
                    layout().world_center(HexCoord::new(q, r)),
                )
            })
            .collect()
    }

    fn graph(coords: &[(i32, i32)]) -> ConnectivityGraph {
        let mut g = ConnectivityGraph::new(layout().neighbor_threshold(10));
        g.add_tiles(&tiles(0, coords)).unwrap();
        g
    }

    #[test]
    fn test_line_edges() {
        let g = graph(&[(0, 0), (1, 0), (2, 0)]);
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.neighbors(TileId::new(1)).unwrap(), vec![TileId::new(0), TileId::new(2)]);
    }

    #[test]
    fn test_path_to_self() {
        let g = graph(&[(0, 0), (1, 0)]);
        assert_eq!(g.shortest_path(TileId::new(0), TileId::new(0)).unwrap(), vec![TileId::new(0)]);
    }

    #[test]
    fn test_simple_path_in_order() {
        let g = graph(&[(0, 0), (1, 0), (2, 0), (3, 0)]);
        let path = g.shortest_path(TileId::new(3), TileId::new(0)).unwrap();
        assert_eq!(
            path,
            vec![TileId::new(3), TileId::new(2), TileId::new(1), TileId::new(0)]
        );
    }

    #[test]
    fn test_disconnected_is_path_not_found() {
        let g = graph(&[(0, 0), (1, 0), (5, 0), (6, 0)]);
        assert_eq!(
            g.shortest_path(TileId::new(0), TileId::new(3)),
            Err(SettlementError::PathNotFound {
                from: TileId::new(0),
                to: TileId::new(3)
            })
        );
    }

    #[test]
    fn test_unknown_tile() {
        let g = graph(&[(0, 0)]);
        assert_eq!(
            g.shortest_path(TileId::new(0), TileId::new(9)),
            Err(SettlementError::UnknownTile(TileId::new(9)))
        );
        assert!(g.neighbors(TileId::new(9)).is_err());
    }

    #[test]
    fn test_duplicate_insert_leaves_graph_untouched() {
        let mut g = graph(&[(0, 0), (1, 0)]);
        let before = g.clone();

        let mut batch = tiles(2, &[(2, 0)]);
        batch.push((TileId::new(1), layout().world_center(HexCoord::new(3, 0))));

        assert_eq!(g.add_tiles(&batch), Err(SettlementError::DuplicateTile(TileId::new(1))));
        assert_eq!(g, before);
    }

    #[test]
    fn test_incremental_matches_rebuild() {
        let mut g = ConnectivityGraph::new(layout().neighbor_threshold(10));
        g.add_tiles(&tiles(0, &[(0, 0), (1, 0), (0, 1), (1, 1)])).unwrap();
        g.add_tiles(&tiles(4, &[(2, 0), (2, 1), (-1, 1)])).unwrap();
        g.add_tiles(&tiles(7, &[(2, -1)])).unwrap();

        let mut rebuilt = g.clone();
        rebuilt.rebuild();
        assert_eq!(g.edges(), rebuilt.edges());
        assert_eq!(g, rebuilt);
    }

    #[test]
    fn test_tie_break_is_deterministic() {
        // Diamond: 0 -> {1, 2} -> 3, both routes two hops long.
        let g = graph(&[(0, 0), (1, 0), (0, 1), (1, 1)]);
        let first = g.shortest_path(TileId::new(0), TileId::new(3)).unwrap();
        let second = g.shortest_path(TileId::new(0), TileId::new(3)).unwrap();

        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
        // Lower-registered neighbor is expanded first.
        assert_eq!(first[1], TileId::new(1));
    }

    #[test]
    fn test_distances_from() {
        let g = graph(&[(0, 0), (1, 0), (2, 0), (9, 9)]);
        let d = g.distances_from(TileId::new(0)).unwrap();
        assert_eq!(d.get(&TileId::new(0)), Some(&0));
        assert_eq!(d.get(&TileId::new(2)), Some(&2));
        assert_eq!(d.get(&TileId::new(3)), None);
    }
}
