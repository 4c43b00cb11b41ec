//! A* pathfinding on the tile map
//!
//! 8-directional search with terrain costs, no corner cutting and a small
//! FIFO cache keyed by the exact (start, end) request.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use ahash::{AHashMap, AHashSet};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::Cell;
use crate::spatial::tilemap::TileMap;

/// Outcome of a path request. Not finding a path is a normal result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathResult {
    /// Waypoints from start (inclusive) to goal (inclusive)
    pub path: Vec<Cell>,
    pub found: bool,
}

impl PathResult {
    pub fn not_found() -> Self {
        Self::default()
    }

    /// Final waypoint, which may differ from the requested goal after substitution
    pub fn destination(&self) -> Option<Cell> {
        self.path.last().copied()
    }
}

/// Node in the A* open set
#[derive(Debug, Clone, Copy)]
struct PathNode {
    cell: Cell,
    f_cost: OrderedFloat<f32>,
    /// Insertion order; keeps ties deterministic
    seq: u32,
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap, earliest insertion wins ties
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pathfinder with a bounded result cache
#[derive(Debug, Clone)]
pub struct Pathfinder {
    cache: AHashMap<(Cell, Cell), PathResult>,
    order: VecDeque<(Cell, Cell)>,
    capacity: usize,
    max_iterations: usize,
    search_radius: i32,
    /// Map revision the cached entries were computed against
    revision: Option<u64>,
}

impl Pathfinder {
    pub fn new(capacity: usize, max_iterations: usize, search_radius: i32) -> Self {
        Self {
            cache: AHashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            max_iterations,
            search_radius,
            revision: None,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            config.path_cache_size,
            config.max_path_iterations,
            config.walkable_search_radius,
        )
    }

    /// Drop every cached route. Call whenever walkability changes.
    pub fn invalidate(&mut self) {
        self.cache.clear();
        self.order.clear();
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Find a path from `start` to `end`
    ///
    /// A blocked `end` is replaced by the nearest walkable cell within the
    /// search radius. The returned path begins with `start`.
    pub fn find_path(&mut self, grid: &TileMap, start: Cell, end: Cell) -> PathResult {
        if self.revision != Some(grid.revision()) {
            self.invalidate();
            self.revision = Some(grid.revision());
        }

        let key = (start, end);
        if let Some(hit) = self.cache.get(&key) {
            return hit.clone();
        }

        let result = self.search(grid, start, end);

        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.cache.remove(&oldest);
            }
        }
        self.order.push_back(key);
        self.cache.insert(key, result.clone());
        result
    }

    fn search(&self, grid: &TileMap, start: Cell, end: Cell) -> PathResult {
        if start == end {
            return PathResult { path: vec![start], found: true };
        }

        let goal = if grid.is_walkable(end) {
            end
        } else {
            match nearest_walkable(grid, end, self.search_radius) {
                Some(cell) => cell,
                None => return PathResult::not_found(),
            }
        };
        if goal == start {
            return PathResult { path: vec![start], found: true };
        }

        let mut open_set = BinaryHeap::new();
        let mut came_from: AHashMap<Cell, Cell> = AHashMap::new();
        let mut g_scores: AHashMap<Cell, f32> = AHashMap::new();
        let mut closed: AHashSet<Cell> = AHashSet::new();
        let mut seq = 0u32;

        g_scores.insert(start, 0.0);
        open_set.push(PathNode {
            cell: start,
            f_cost: OrderedFloat(heuristic(start, goal)),
            seq,
        });

        let mut expansions = 0usize;

        while let Some(current) = open_set.pop() {
            if !closed.insert(current.cell) {
                continue;
            }
            if current.cell == goal {
                return PathResult {
                    path: reconstruct_path(&came_from, goal),
                    found: true,
                };
            }

            expansions += 1;
            if expansions > self.max_iterations {
                return PathResult::not_found();
            }

            let current_g = *g_scores.get(&current.cell).unwrap_or(&f32::INFINITY);

            for (i, neighbor) in current.cell.neighbors().into_iter().enumerate() {
                if closed.contains(&neighbor) || !grid.is_walkable(neighbor) {
                    continue;
                }

                let diagonal = i >= 4;
                if diagonal {
                    // Both orthogonal neighbours must be open
                    let dx = neighbor.x - current.cell.x;
                    let dy = neighbor.y - current.cell.y;
                    if !grid.is_walkable(current.cell.offset(dx, 0))
                        || !grid.is_walkable(current.cell.offset(0, dy))
                    {
                        continue;
                    }
                }

                let step = grid.path_cost(neighbor);
                let move_cost = if diagonal { step * std::f32::consts::SQRT_2 } else { step };
                let tentative_g = current_g + move_cost;
                let neighbor_g = *g_scores.get(&neighbor).unwrap_or(&f32::INFINITY);

                if tentative_g < neighbor_g {
                    came_from.insert(neighbor, current.cell);
                    g_scores.insert(neighbor, tentative_g);
                    seq += 1;
                    open_set.push(PathNode {
                        cell: neighbor,
                        f_cost: OrderedFloat(tentative_g + heuristic(neighbor, goal)),
                        seq,
                    });
                }
            }
        }

        PathResult::not_found()
    }
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

/// Plain Manhattan distance. Not admissible with diagonal moves or road
/// discounts, so routes are occasionally a little longer than optimal.
fn heuristic(from: Cell, to: Cell) -> f32 {
    from.manhattan(&to) as f32
}

/// Ring search outward from `center`, row-major within each ring
pub fn nearest_walkable(grid: &TileMap, center: Cell, max_radius: i32) -> Option<Cell> {
    for r in 1..=max_radius {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx.abs() != r && dy.abs() != r {
                    continue;
                }
                let cell = center.offset(dx, dy);
                if grid.is_walkable(cell) {
                    return Some(cell);
                }
            }
        }
    }
    None
}

/// Reconstruct path from came_from map
fn reconstruct_path(came_from: &AHashMap<Cell, Cell>, mut current: Cell) -> Vec<Cell> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Total terrain cost of walking a path (start cell excluded)
pub fn path_cost(grid: &TileMap, path: &[Cell]) -> f32 {
    path.windows(2)
        .map(|w| {
            let step = grid.path_cost(w[1]);
            if w[0].x != w[1].x && w[0].y != w[1].y {
                step * std::f32::consts::SQRT_2
            } else {
                step
            }
        })
        .sum()
}
