use crate::algorithms::common::{
    reconstruct_path, stop_requested, Frontier, SearchResult, NEVER_STOP,
};
use crate::algorithms::Algorithm;
use crate::grid::{Grid, Position};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::atomic::AtomicBool;

/// Uniform-cost search (Dijkstra from a single source). The frontier is ordered
/// by accumulated cost, equal costs in insertion order.
pub fn uniform_cost(grid: &Grid, start: Position, goal: Position) -> SearchResult {
    uniform_cost_until(grid, start, goal, &NEVER_STOP)
}

/// [`uniform_cost`] that gives up, reporting no path, once `stop` is raised.
pub(crate) fn uniform_cost_until(
    grid: &Grid,
    start: Position,
    goal: Position,
    stop: &AtomicBool,
) -> SearchResult {
    let mut frontier = Frontier::new();
    let mut costs: FxHashMap<Position, u64> = FxHashMap::default();
    let mut parents: FxHashMap<Position, Position> = FxHashMap::default();
    let mut closed: FxHashSet<Position> = FxHashSet::default();
    let mut visited_order = vec![start];
    frontier.push(start, 0);
    costs.insert(start, 0);

    let mut found = false;
    while let Some((cost, current)) = frontier.pop() {
        if stop_requested(stop) {
            break;
        }
        // Stale entry for a position settled earlier.
        if !closed.insert(current) {
            continue;
        }
        if current == goal {
            found = true;
            break;
        }
        for neighbor in grid.neighbors(current) {
            let next_cost = cost + grid.weight(neighbor);
            if costs.get(&neighbor).is_some_and(|&known| known <= next_cost) {
                continue;
            }
            costs.insert(neighbor, next_cost);
            parents.insert(neighbor, current);
            frontier.push(neighbor, next_cost);
            visited_order.push(neighbor);
        }
    }

    if found {
        let path = reconstruct_path(&parents, start, goal);
        SearchResult::found(Algorithm::UniformCost, grid, path, closed.len(), visited_order)
    } else {
        SearchResult::not_found(Algorithm::UniformCost, closed.len(), visited_order)
    }
}
