//! A* pathfinding on the tile grid
//!
//! 8-directional search over any [`Passability`] provider. Waypoints are tile
//! centers in pixel space, start tile included.
//!
//! The open list is a plain vector scanned for the lowest f-cost, so ties
//! resolve to the node that entered the list first. Nodes live in a pool that
//! is dropped when the search returns; parents are pool indices.

use glam::Vec2;
use log::warn;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::map::{Passability, TileCoord};

/// Cost of a horizontal or vertical step
pub const CARDINAL_COST: f32 = 1.0;
/// Cost of a diagonal step
pub const DIAGONAL_COST: f32 = 1.414;
/// Expansion cap applied when the caller does not set one
pub const DEFAULT_MAX_EXPANSIONS: usize = 4096;

/// Distance estimate used to order the open list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Heuristic {
    /// `|dx| + |dy|`. Overestimates diagonal routes, so paths may be
    /// slightly longer than optimal, but searches expand fewer nodes.
    #[default]
    Manhattan,
    /// Exact cost on an open grid with the cardinal/diagonal step costs.
    /// Never overestimates, so returned paths are cheapest.
    Octile,
}

impl Heuristic {
    /// Estimated cost between two tiles
    #[must_use]
    pub fn estimate(self, from: TileCoord, to: TileCoord) -> f32 {
        let dx = (from.x - to.x).abs() as f32;
        let dy = (from.y - to.y).abs() as f32;
        match self {
            Heuristic::Manhattan => dx + dy,
            Heuristic::Octile => {
                dx.max(dy) * CARDINAL_COST + dx.min(dy) * (DIAGONAL_COST - CARDINAL_COST)
            }
        }
    }
}

/// Search tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Open list ordering estimate
    pub heuristic: Heuristic,
    /// Give up after this many node expansions
    pub max_expansions: usize,
}

impl SearchOptions {
    /// Use a different heuristic
    #[must_use]
    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Use a different expansion cap
    #[must_use]
    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            heuristic: Heuristic::default(),
            max_expansions: DEFAULT_MAX_EXPANSIONS,
        }
    }
}

/// Result of pathfinding
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathResult {
    /// Tile centers from start to goal, in pixels
    pub waypoints: Vec<Vec2>,
    /// Sum of step costs along the path
    pub cost: f32,
    /// Nodes taken off the open list
    pub expanded: usize,
}

impl PathResult {
    /// Check if path was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Path length in pixels
    #[must_use]
    pub fn length(&self) -> f32 {
        self.waypoints
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum()
    }

    fn failed(expanded: usize) -> Self {
        Self {
            expanded,
            ..Self::default()
        }
    }
}

type NodeId = usize;

#[derive(Debug, Clone, Copy)]
struct Node {
    tile: TileCoord,
    g_cost: f32,
    h_cost: f32,
    parent: Option<NodeId>,
}

impl Node {
    fn f_cost(&self) -> f32 {
        self.g_cost + self.h_cost
    }
}

/// Per-search node storage; one entry per tile
#[derive(Debug, Default)]
struct NodePool {
    nodes: Vec<Node>,
    index: FxHashMap<TileCoord, NodeId>,
}

impl NodePool {
    fn insert(&mut self, node: Node) -> NodeId {
        let id = self.nodes.len();
        self.index.insert(node.tile, id);
        self.nodes.push(node);
        id
    }

    fn get(&self, tile: TileCoord) -> Option<NodeId> {
        self.index.get(&tile).copied()
    }

    /// Tile centers from the root to `id`
    fn trace(&self, id: NodeId) -> Vec<Vec2> {
        let mut waypoints = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id];
            waypoints.push(node.tile.center());
            current = node.parent;
        }
        waypoints.reverse();
        waypoints
    }
}

/// 8-connected neighbours in search order: `dx` outer, `dy` inner
fn neighbors(tile: TileCoord) -> SmallVec<[(TileCoord, f32); 8]> {
    let mut result = SmallVec::new();
    for dx in -1..=1 {
        for dy in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let cost = if dx != 0 && dy != 0 {
                DIAGONAL_COST
            } else {
                CARDINAL_COST
            };
            result.push((tile.offset(dx, dy), cost));
        }
    }
    result
}

/// Find a path between two pixel positions with default options
#[must_use]
pub fn find_path<G: Passability + ?Sized>(grid: &G, start: Vec2, goal: Vec2) -> PathResult {
    find_path_with(grid, start, goal, &SearchOptions::default())
}

/// Find a path between two pixel positions.
///
/// Returns an empty result when the goal is unreachable or the expansion cap
/// is hit. The start tile itself is not checked for passability.
#[must_use]
pub fn find_path_with<G: Passability + ?Sized>(
    grid: &G,
    start: Vec2,
    goal: Vec2,
    options: &SearchOptions,
) -> PathResult {
    let start_tile = TileCoord::from_pixel(start);
    let goal_tile = TileCoord::from_pixel(goal);

    // A blocked goal never enters the open list; skip the flood fill
    if start_tile != goal_tile && !grid.is_tile_passable(goal_tile.x, goal_tile.y) {
        return PathResult::failed(0);
    }

    let mut pool = NodePool::default();
    let mut open: Vec<NodeId> = Vec::new();
    let mut closed: FxHashSet<TileCoord> = FxHashSet::default();
    let mut expanded = 0;

    open.push(pool.insert(Node {
        tile: start_tile,
        g_cost: 0.0,
        h_cost: options.heuristic.estimate(start_tile, goal_tile),
        parent: None,
    }));

    while !open.is_empty() {
        // First minimum wins
        let mut best = 0;
        for (position, &id) in open.iter().enumerate().skip(1) {
            if pool.nodes[id].f_cost() < pool.nodes[open[best]].f_cost() {
                best = position;
            }
        }
        let current_id = open.remove(best);
        let current = pool.nodes[current_id];

        if current.tile == goal_tile {
            return PathResult {
                waypoints: pool.trace(current_id),
                cost: current.g_cost,
                expanded,
            };
        }

        if expanded >= options.max_expansions {
            warn!(
                "Path search from {start_tile:?} to {goal_tile:?} gave up after {expanded} expansions"
            );
            return PathResult::failed(expanded);
        }
        expanded += 1;
        closed.insert(current.tile);

        for (tile, step_cost) in neighbors(current.tile) {
            if !grid.is_tile_passable(tile.x, tile.y) || closed.contains(&tile) {
                continue;
            }

            let g_cost = current.g_cost + step_cost;
            match pool.get(tile) {
                Some(id) => {
                    let node = &mut pool.nodes[id];
                    if g_cost < node.g_cost {
                        node.g_cost = g_cost;
                        node.parent = Some(current_id);
                    }
                }
                None => {
                    let id = pool.insert(Node {
                        tile,
                        g_cost,
                        h_cost: options.heuristic.estimate(tile, goal_tile),
                        parent: Some(current_id),
                    });
                    open.push(id);
                }
            }
        }
    }

    PathResult::failed(expanded)
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;
    use std::collections::BinaryHeap;

    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::map::Grid;

    fn center(x: i32, y: i32) -> Vec2 {
        TileCoord::new(x, y).center()
    }

    /// Every step moves to an adjacent passable tile
    fn assert_valid_path(grid: &Grid, path: &PathResult, start: TileCoord, goal: TileCoord) {
        assert_eq!(path.waypoints.first(), Some(&start.center()));
        assert_eq!(path.waypoints.last(), Some(&goal.center()));
        for pair in path.waypoints.windows(2) {
            let a = TileCoord::from_pixel(pair[0]);
            let b = TileCoord::from_pixel(pair[1]);
            assert!((a.x - b.x).abs() <= 1 && (a.y - b.y).abs() <= 1);
            assert_ne!(a, b);
            assert!(grid.is_passable(b.x, b.y));
        }
    }

    #[derive(PartialEq)]
    struct Entry(f32, TileCoord);

    impl Eq for Entry {}

    impl Ord for Entry {
        fn cmp(&self, other: &Self) -> Ordering {
            other.0.total_cmp(&self.0)
        }
    }

    impl PartialOrd for Entry {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    /// Exhaustive reference: cheapest cost over the same move set
    fn dijkstra(grid: &Grid, start: TileCoord, goal: TileCoord) -> Option<f32> {
        let mut best: FxHashMap<TileCoord, f32> = FxHashMap::default();
        let mut heap = BinaryHeap::new();
        best.insert(start, 0.0);
        heap.push(Entry(0.0, start));

        while let Some(Entry(cost, tile)) = heap.pop() {
            if tile == goal {
                return Some(cost);
            }
            if cost > best[&tile] {
                continue;
            }
            for (next, step) in neighbors(tile) {
                if !grid.is_passable(next.x, next.y) {
                    continue;
                }
                let candidate = cost + step;
                if best.get(&next).is_none_or(|&known| candidate < known) {
                    best.insert(next, candidate);
                    heap.push(Entry(candidate, next));
                }
            }
        }
        None
    }

    #[test]
    fn test_open_grid_diagonal() {
        let grid = Grid::new(10, 10);
        let path = find_path(&grid, center(0, 0), center(9, 9));

        assert_eq!(path.waypoints.len(), 10);
        assert_relative_eq!(path.cost, 9.0 * DIAGONAL_COST, epsilon = 1e-4);
        assert_valid_path(&grid, &path, TileCoord::new(0, 0), TileCoord::new(9, 9));
    }

    #[test]
    fn test_boxed_goal_has_no_path() {
        let mut grid = Grid::new(10, 10);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx != 0 || dy != 0 {
                    grid.set_passable(5 + dx, 5 + dy, false);
                }
            }
        }

        let path = find_path(&grid, center(0, 0), center(5, 5));
        assert!(path.is_empty());
        assert_eq!(path.cost, 0.0);
    }

    #[test]
    fn test_wall_detour() {
        let mut grid = Grid::new(10, 10);
        for y in 0..8 {
            grid.set_passable(5, y, false);
        }

        let path = find_path(&grid, center(2, 2), center(8, 2));
        assert!(!path.is_empty());
        assert!(path.waypoints.len() > 7);
        assert_valid_path(&grid, &path, TileCoord::new(2, 2), TileCoord::new(8, 2));
    }

    #[test]
    fn test_disconnected_regions() {
        let mut grid = Grid::new(8, 8);
        for y in 0..8 {
            grid.set_passable(4, y, false);
        }

        let path = find_path(&grid, center(1, 1), center(6, 6));
        assert!(path.is_empty());
        assert!(path.expanded > 0);
    }

    #[test]
    fn test_blocked_goal_returns_immediately() {
        let mut grid = Grid::new(8, 8);
        grid.set_passable(6, 6, false);

        let path = find_path(&grid, center(1, 1), center(6, 6));
        assert!(path.is_empty());
        assert_eq!(path.expanded, 0);
    }

    #[test]
    fn test_out_of_bounds_goal() {
        let grid = Grid::new(4, 4);
        assert!(find_path(&grid, center(0, 0), Vec2::new(-10.0, 10.0)).is_empty());
        assert!(find_path(&grid, center(0, 0), center(9, 0)).is_empty());
    }

    #[test]
    fn test_start_equals_goal() {
        let grid = Grid::new(4, 4);
        let path = find_path(&grid, Vec2::new(30.0, 30.0), Vec2::new(40.0, 10.0));
        assert_eq!(path.waypoints, vec![center(0, 0)]);
        assert_eq!(path.cost, 0.0);
    }

    #[test]
    fn test_corner_cutting_allowed() {
        // Diagonal squeeze between two blocked orthogonals
        let grid = Grid::parse(&[".#", "#."]);
        let path = find_path(&grid, center(0, 0), center(1, 1));
        assert_eq!(path.waypoints, vec![center(0, 0), center(1, 1)]);
    }

    fn tiles(path: &PathResult) -> Vec<TileCoord> {
        path.waypoints
            .iter()
            .map(|&point| TileCoord::from_pixel(point))
            .collect()
    }

    #[test]
    fn test_ties_resolve_in_expansion_order() {
        let grid = Grid::parse(&["......", "..#...", "..#...", "......"]);
        let path = find_path(&grid, center(0, 0), center(5, 2));

        // (2, 0) is first reached diagonally from (1, 1), then relaxed from (1, 0)
        assert_eq!(
            tiles(&path),
            vec![
                TileCoord::new(0, 0),
                TileCoord::new(1, 0),
                TileCoord::new(2, 0),
                TileCoord::new(3, 1),
                TileCoord::new(4, 2),
                TileCoord::new(5, 2),
            ]
        );
        assert_relative_eq!(
            path.cost,
            3.0 * CARDINAL_COST + 2.0 * DIAGONAL_COST,
            epsilon = 1e-4
        );
        assert_eq!(path.expanded, 9);

        // Both ways round the pillar tie on f; the one pushed first wins
        let grid = Grid::parse(&["...", ".#.", "..."]);
        let path = find_path(&grid, center(0, 0), center(2, 2));
        assert_eq!(
            tiles(&path),
            vec![
                TileCoord::new(0, 0),
                TileCoord::new(0, 1),
                TileCoord::new(1, 2),
                TileCoord::new(2, 2),
            ]
        );
        assert_eq!(path.expanded, 3);
    }

    #[test]
    fn test_open_list_keeps_insertion_order_after_removal() {
        let grid = Grid::parse(&[".#..", "..#.", "...."]);
        let path = find_path(&grid, center(0, 0), center(3, 1));

        // (2, 0) and (2, 2) tie; (2, 0) was pushed earlier and must stay ahead
        assert_eq!(
            tiles(&path),
            vec![
                TileCoord::new(0, 0),
                TileCoord::new(1, 1),
                TileCoord::new(2, 0),
                TileCoord::new(3, 1),
            ]
        );
        assert_relative_eq!(path.cost, 3.0 * DIAGONAL_COST, epsilon = 1e-4);
        assert_eq!(path.expanded, 4);
    }

    #[test]
    fn test_equal_cost_keeps_first_parent() {
        let grid = Grid::parse(&["..#.", "....", "...."]);
        let path = find_path(&grid, center(0, 0), center(3, 0));

        // (2, 1) costs 2.414 via (1, 0) and again via (1, 1); the first parent stays
        assert_eq!(
            tiles(&path),
            vec![
                TileCoord::new(0, 0),
                TileCoord::new(1, 0),
                TileCoord::new(2, 1),
                TileCoord::new(3, 0),
            ]
        );
        assert_relative_eq!(
            path.cost,
            CARDINAL_COST + 2.0 * DIAGONAL_COST,
            epsilon = 1e-4
        );
        assert_eq!(path.expanded, 4);
    }

    #[test]
    fn test_expansion_cap() {
        let grid = Grid::new(40, 40);
        let options = SearchOptions::default().with_max_expansions(5);

        let path = find_path_with(&grid, center(0, 0), center(39, 0), &options);
        assert!(path.is_empty());
        assert_eq!(path.expanded, 5);
    }

    #[test]
    fn test_octile_matches_exhaustive_search() {
        let options = SearchOptions::default().with_heuristic(Heuristic::Octile);

        for seed in 0..60 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut grid = Grid::new(9, 9);
            for y in 0..9 {
                for x in 0..9 {
                    if rng.random_bool(0.3) {
                        grid.set_passable(x, y, false);
                    }
                }
            }
            let start = TileCoord::new(rng.random_range(0..9), rng.random_range(0..9));
            let goal = TileCoord::new(rng.random_range(0..9), rng.random_range(0..9));
            grid.set_passable(start.x, start.y, true);
            grid.set_passable(goal.x, goal.y, true);

            let reference = dijkstra(&grid, start, goal);
            let octile = find_path_with(&grid, start.center(), goal.center(), &options);
            let manhattan = find_path(&grid, start.center(), goal.center());

            match reference {
                None => {
                    assert!(octile.is_empty(), "seed {seed}");
                    assert!(manhattan.is_empty(), "seed {seed}");
                }
                Some(cost) => {
                    assert!(octile.cost <= cost + 1e-3, "seed {seed}: {} > {cost}", octile.cost);
                    assert_valid_path(&grid, &octile, start, goal);
                    assert_valid_path(&grid, &manhattan, start, goal);
                    assert!(manhattan.cost + 1e-3 >= cost, "seed {seed}");
                }
            }
        }
    }

    #[test]
    fn test_heuristic_estimates() {
        let a = TileCoord::new(0, 0);
        let b = TileCoord::new(3, 1);
        assert_relative_eq!(Heuristic::Manhattan.estimate(a, b), 4.0);
        assert_relative_eq!(Heuristic::Octile.estimate(a, b), 3.414, epsilon = 1e-4);
    }

    #[test]
    fn test_path_length_in_pixels() {
        let grid = Grid::new(5, 1);
        let path = find_path(&grid, center(0, 0), center(4, 0));
        assert_relative_eq!(path.length(), 4.0 * 48.0);
        assert_relative_eq!(path.cost, 4.0);
    }
}
