use crate::algorithms::common::{reconstruct_path, SearchResult};
use crate::algorithms::Algorithm;
use crate::grid::{Grid, Position};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

/// Breadth-first search. Finds the path with the fewest moves; cell weights only
/// show up in the reported cost.
pub fn bfs(grid: &Grid, start: Position, goal: Position) -> SearchResult {
    let mut frontier = VecDeque::from([start]);
    let mut visited: FxHashSet<Position> = FxHashSet::default();
    let mut parents: FxHashMap<Position, Position> = FxHashMap::default();
    let mut visited_order = vec![start];
    visited.insert(start);

    let mut found = false;
    while let Some(current) = frontier.pop_front() {
        if current == goal {
            found = true;
            break;
        }
        for neighbor in grid.neighbors(current) {
            if !visited.insert(neighbor) {
                continue;
            }
            parents.insert(neighbor, current);
            frontier.push_back(neighbor);
            visited_order.push(neighbor);
        }
    }

    if found {
        let path = reconstruct_path(&parents, start, goal);
        SearchResult::found(Algorithm::Bfs, grid, path, visited.len(), visited_order)
    } else {
        SearchResult::not_found(Algorithm::Bfs, visited.len(), visited_order)
    }
}
