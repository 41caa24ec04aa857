//! Brute-force reference for the connectivity graph.
//!
//! Everything here is recomputed from scratch by pairwise comparison, so it
//! can be used as an oracle for the incremental graph and its BFS.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use hexhold_core::math::{Fixed, WideFixed};
use hexhold_core::settlement::Settlement;
use hexhold_core::tile::TileId;

/// Every pair of tiles whose centers are strictly closer than `threshold`,
/// as `(lower, higher)` pairs.
#[must_use]
pub fn pairwise_edges(settlement: &Settlement, threshold: Fixed) -> BTreeSet<(TileId, TileId)> {
    let tiles = settlement.tiles();
    let limit = WideFixed::from_num(threshold) * WideFixed::from_num(threshold);
    let mut edges = BTreeSet::new();
    for (i, a) in tiles.iter().enumerate() {
        for b in &tiles[i + 1..] {
            if a.world_center().distance_squared(b.world_center()) < limit {
                edges.insert((a.id().min(b.id()), a.id().max(b.id())));
            }
        }
    }
    edges
}

/// Hop count between two tiles over `edges`, or `None` if unreachable.
#[must_use]
pub fn hop_distance(
    edges: &BTreeSet<(TileId, TileId)>,
    from: TileId,
    to: TileId,
) -> Option<usize> {
    let mut adjacency: BTreeMap<TileId, Vec<TileId>> = BTreeMap::new();
    for &(a, b) in edges {
        adjacency.entry(a).or_default().push(b);
        adjacency.entry(b).or_default().push(a);
    }

    let mut seen = BTreeSet::from([from]);
    let mut queue = VecDeque::from([(from, 0)]);
    while let Some((tile, hops)) = queue.pop_front() {
        if tile == to {
            return Some(hops);
        }
        for &next in adjacency.get(&tile).into_iter().flatten() {
            if seen.insert(next) {
                queue.push_back((next, hops + 1));
            }
        }
    }
    None
}

/// True if every consecutive pair of `path` is an edge.
#[must_use]
pub fn is_connected_walk(edges: &BTreeSet<(TileId, TileId)>, path: &[TileId]) -> bool {
    path.windows(2)
        .all(|w| edges.contains(&(w[0].min(w[1]), w[0].max(w[1]))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{starter_settlement, walkway_settlement};

    #[test]
    fn test_walkway_reference() {
        let settlement = walkway_settlement(4);
        let edges = pairwise_edges(&settlement, settlement.graph().threshold());
        assert_eq!(edges.len(), 3);
        assert_eq!(hop_distance(&edges, TileId::new(0), TileId::new(3)), Some(3));
    }

    #[test]
    fn test_starter_reference_matches_graph() {
        let settlement = starter_settlement();
        let edges = pairwise_edges(&settlement, settlement.graph().threshold());
        let graph_edges: BTreeSet<_> = settlement.graph().edges().into_iter().collect();
        assert_eq!(edges, graph_edges);
    }
}
