use crate::algorithms::common::{reconstruct_path, SearchResult};
use crate::algorithms::Algorithm;
use crate::grid::{Grid, Position};
use rustc_hash::{FxHashMap, FxHashSet};

/// Depth-first search with a visited set. Returns the first path it reaches the
/// goal by, with no optimality guarantee.
pub fn dfs(grid: &Grid, start: Position, goal: Position) -> SearchResult {
    let mut stack = vec![start];
    let mut visited: FxHashSet<Position> = FxHashSet::default();
    let mut parents: FxHashMap<Position, Position> = FxHashMap::default();
    let mut visited_order = vec![start];
    visited.insert(start);

    let mut found = false;
    while let Some(current) = stack.pop() {
        if current == goal {
            found = true;
            break;
        }
        for neighbor in grid.neighbors(current) {
            if !visited.insert(neighbor) {
                continue;
            }
            parents.insert(neighbor, current);
            stack.push(neighbor);
            visited_order.push(neighbor);
        }
    }

    if found {
        let path = reconstruct_path(&parents, start, goal);
        SearchResult::found(Algorithm::Dfs, grid, path, visited.len(), visited_order)
    } else {
        SearchResult::not_found(Algorithm::Dfs, visited.len(), visited_order)
    }
}
