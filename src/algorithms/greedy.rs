use crate::algorithms::common::{reconstruct_path, Frontier, Heuristic, SearchResult};
use crate::algorithms::Algorithm;
use crate::grid::{Grid, Position};
use rustc_hash::{FxHashMap, FxHashSet};

/// Greedy best-first search: always expands the position that looks closest to
/// the goal, ignoring the cost paid so far.
pub fn greedy_best_first(
    grid: &Grid,
    start: Position,
    goal: Position,
    heuristic: Heuristic,
) -> SearchResult {
    let mut frontier = Frontier::new();
    let mut visited: FxHashSet<Position> = FxHashSet::default();
    let mut parents: FxHashMap<Position, Position> = FxHashMap::default();
    let mut visited_order = vec![start];
    frontier.push(start, heuristic(start, goal));
    visited.insert(start);

    let mut found = false;
    while let Some((_, current)) = frontier.pop() {
        if current == goal {
            found = true;
            break;
        }
        for neighbor in grid.neighbors(current) {
            if !visited.insert(neighbor) {
                continue;
            }
            parents.insert(neighbor, current);
            frontier.push(neighbor, heuristic(neighbor, goal));
            visited_order.push(neighbor);
        }
    }

    if found {
        let path = reconstruct_path(&parents, start, goal);
        SearchResult::found(
            Algorithm::GreedyBestFirst,
            grid,
            path,
            visited.len(),
            visited_order,
        )
    } else {
        SearchResult::not_found(Algorithm::GreedyBestFirst, visited.len(), visited_order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::common::manhattan;
    use crate::grid::GridSetup;

    #[test]
    fn walks_straight_through_heavy_cells() {
        let setup = GridSetup::new(Position::new(0, 0), Position::new(0, 2))
            .with_weights([(Position::new(0, 1), 10)]);
        let grid = Grid::build(2, 3, &setup).unwrap();

        let result = greedy_best_first(&grid, grid.start(), grid.goal(), manhattan);
        assert!(result.success);
        assert_eq!(result.cost, 11);
    }

    #[test]
    fn explores_little_on_an_open_grid() {
        let grid = Grid::build(10, 10, &GridSetup::new(Position::new(0, 0), Position::new(9, 9))).unwrap();
        let result = greedy_best_first(&grid, grid.start(), grid.goal(), manhattan);
        assert!(result.success);
        assert_eq!(result.steps(), 18);
        assert!(result.explored_nodes < 50);
    }
}
