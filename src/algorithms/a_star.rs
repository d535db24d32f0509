use crate::algorithms::common::{Heuristic, SearchResult};
use crate::algorithms::Algorithm;
use crate::grid::{Grid, Position};
use pathfinding::prelude::astar;
use rustc_hash::FxHashSet;

/// A* search using the `pathfinding` crate.
///
/// Every position the crate pops off its open set passes through the success
/// callback, which is where examined positions are recorded.
///
/// # Arguments
///
/// * `grid` - The grid to search.
/// * `start` - The starting position.
/// * `goal` - The goal position.
/// * `heuristic` - Admissible estimate of the remaining cost.
pub fn a_star(grid: &Grid, start: Position, goal: Position, heuristic: Heuristic) -> SearchResult {
    let mut examined: FxHashSet<Position> = FxHashSet::default();
    let mut visited_order = Vec::new();

    let result = astar(
        &start,
        |p| {
            // Stepping onto a neighbor costs the neighbor's weight.
            grid.neighbors(*p)
                .into_iter()
                .map(|neighbor| (neighbor, grid.weight(neighbor)))
                .collect::<Vec<_>>()
        },
        |p| heuristic(*p, goal),
        |p| {
            if examined.insert(*p) {
                visited_order.push(*p);
            }
            *p == goal
        },
    );

    match result {
        Some((path, _)) => {
            SearchResult::found(Algorithm::AStar, grid, path, examined.len(), visited_order)
        }
        None => SearchResult::not_found(Algorithm::AStar, examined.len(), visited_order),
    }
}
