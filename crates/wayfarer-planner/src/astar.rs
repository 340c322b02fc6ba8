//! A* search over a [`WeightedGrid`].
//!
//! # Algorithm
//!
//! The frontier is a binary min-heap keyed on `g + h`, where `g` is the best
//! known cost from the start and `h` is the Manhattan distance to the goal.
//! Manhattan distance is admissible and consistent for unit-cost 4-connected
//! movement, so the first time the goal is popped its cost is optimal.
//!
//! Cells are never removed from the heap when their cost improves; the
//! outdated entry is skipped when popped instead.
//!
//! # Tie-breaking
//!
//! Every push is stamped with a monotonically increasing sequence number and
//! entries of equal priority pop in push order.  Combined with the fixed
//! East, North, West, South neighbour order this makes the returned path a
//! pure function of the grid, start, and goal.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use tracing::{debug, instrument};
use wayfarer_types::{GridCell, NavError};

use crate::grid::WeightedGrid;

/// A frontier entry.  Ordered so that [`BinaryHeap`] pops the lowest
/// priority first, and the earliest push among equals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrontierEntry {
    priority: u32,
    seq: u64,
    cost: u32,
    cell: GridCell,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap behaviour.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Output of [`astar_search`].
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    /// Predecessor of every discovered cell; the start maps to `None`.
    pub came_from: HashMap<GridCell, Option<GridCell>>,
    /// Best known cost from the start to every discovered cell.
    pub cost_so_far: HashMap<GridCell, u32>,
    /// Number of cells popped and expanded.
    pub expanded: usize,
    /// Whether the goal was popped before the frontier ran dry.
    pub reached: bool,
}

impl SearchResult {
    /// Cost of the optimal path to the goal, if it was reached.
    pub fn goal_cost(&self, goal: GridCell) -> Option<u32> {
        if self.reached {
            self.cost_so_far.get(&goal).copied()
        } else {
            None
        }
    }
}

fn heuristic(a: GridCell, b: GridCell) -> u32 {
    a.manhattan(&b)
}

/// Run A* from `start` to `goal`.
///
/// Wall cells are never entered, so a walled goal is unreachable.  The
/// start is expanded even when it is a wall.
/// Exhausting the frontier is a normal outcome reported through
/// [`SearchResult::reached`].
#[instrument(level = "debug", skip(grid), fields(width = grid.width(), height = grid.height(), walls = grid.walls().len()))]
pub fn astar_search(grid: &WeightedGrid, start: GridCell, goal: GridCell) -> SearchResult {
    let mut result = SearchResult::default();
    let mut frontier = BinaryHeap::new();
    let mut seq = 0u64;

    frontier.push(FrontierEntry {
        priority: 0,
        seq,
        cost: 0,
        cell: start,
    });
    result.came_from.insert(start, None);
    result.cost_so_far.insert(start, 0);

    while let Some(entry) = frontier.pop() {
        let current = entry.cell;
        if result.cost_so_far.get(&current).is_some_and(|&best| entry.cost > best) {
            continue;
        }
        if current == goal {
            result.reached = true;
            break;
        }
        result.expanded += 1;

        for next in grid.neighbors(current) {
            let new_cost = entry.cost + grid.cost(current, next);
            let improves = result
                .cost_so_far
                .get(&next)
                .is_none_or(|&known| new_cost < known);
            if improves {
                result.cost_so_far.insert(next, new_cost);
                seq += 1;
                frontier.push(FrontierEntry {
                    priority: new_cost + heuristic(next, goal),
                    seq,
                    cost: new_cost,
                    cell: next,
                });
                result.came_from.insert(next, Some(current));
            }
        }
    }

    debug!(
        expanded = result.expanded,
        reached = result.reached,
        cost = ?result.goal_cost(goal),
        "A* search finished"
    );
    result
}

/// Walk `came_from` back from `goal` to `start` and return the path in
/// travel order, both ends inclusive.
///
/// # Errors
///
/// Returns [`NavError::Unreachable`] when the goal was never discovered or
/// the predecessor chain does not lead back to `start`.
pub fn reconstruct_path(
    came_from: &HashMap<GridCell, Option<GridCell>>,
    start: GridCell,
    goal: GridCell,
) -> Result<Vec<GridCell>, NavError> {
    let unreachable = || NavError::Unreachable { start, goal };

    if !came_from.contains_key(&goal) {
        return Err(unreachable());
    }

    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        // A chain longer than the map means a cycle.
        if path.len() > came_from.len() {
            return Err(unreachable());
        }
        current = came_from
            .get(&current)
            .copied()
            .flatten()
            .ok_or_else(unreachable)?;
        path.push(current);
    }
    path.reverse();

    if path.first() != Some(&start) {
        return Err(unreachable());
    }
    Ok(path)
}

/// Search and reconstruct in one call.
///
/// # Errors
///
/// Returns [`NavError::Unreachable`] when no path exists.
pub fn plan(grid: &WeightedGrid, start: GridCell, goal: GridCell) -> Result<Vec<GridCell>, NavError> {
    let search = astar_search(grid, start, goal);
    if !search.reached {
        return Err(NavError::Unreachable { start, goal });
    }
    reconstruct_path(&search.came_from, start, goal)
}
