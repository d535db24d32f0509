//! The seven search strategies and the closed set that names them.

pub mod a_star;
pub mod bfs;
pub mod bidirectional;
pub mod common;
pub mod dfs;
pub mod greedy;
pub mod ida_star;
pub mod ucs;

pub use common::{manhattan, Heuristic, SearchResult};

use common::NEVER_STOP;

use crate::grid::{Grid, Position};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::time::Instant;
use tracing::debug;

/// Identity of a search strategy. Declaration order is the canonical order
/// used for reporting and for breaking ranking ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Algorithm {
    Bfs,
    Dfs,
    UniformCost,
    GreedyBestFirst,
    AStar,
    IdaStar,
    Bidirectional,
}

impl Algorithm {
    pub const ALL: [Algorithm; 7] = [
        Algorithm::Bfs,
        Algorithm::Dfs,
        Algorithm::UniformCost,
        Algorithm::GreedyBestFirst,
        Algorithm::AStar,
        Algorithm::IdaStar,
        Algorithm::Bidirectional,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Bfs => "BFS",
            Algorithm::Dfs => "DFS",
            Algorithm::UniformCost => "Uniform Cost",
            Algorithm::GreedyBestFirst => "Greedy Best-First",
            Algorithm::AStar => "A*",
            Algorithm::IdaStar => "IDA*",
            Algorithm::Bidirectional => "Bidirectional",
        }
    }

    /// Short identifier accepted by [`FromStr`].
    pub fn key(&self) -> &'static str {
        match self {
            Algorithm::Bfs => "bfs",
            Algorithm::Dfs => "dfs",
            Algorithm::UniformCost => "ucs",
            Algorithm::GreedyBestFirst => "greedy",
            Algorithm::AStar => "a_star",
            Algorithm::IdaStar => "ida_star",
            Algorithm::Bidirectional => "bidirectional",
        }
    }

    /// Whether the strategy consults a heuristic.
    pub fn is_informed(&self) -> bool {
        matches!(
            self,
            Algorithm::GreedyBestFirst | Algorithm::AStar | Algorithm::IdaStar
        )
    }

    /// Whether the strategy always returns a lowest-cost path on weighted grids.
    pub fn is_cost_optimal(&self) -> bool {
        matches!(
            self,
            Algorithm::UniformCost | Algorithm::AStar | Algorithm::IdaStar | Algorithm::Bidirectional
        )
    }

    /// Runs the strategy with the Manhattan heuristic.
    ///
    /// Both endpoints must be walkable. Callers that skip this check (the
    /// evaluator does not) get an empty failure with zero examined positions,
    /// the only case where a run that was not stopped reports 0 explored.
    pub fn run(&self, grid: &Grid, start: Position, goal: Position) -> SearchResult {
        self.run_with_heuristic(grid, start, goal, manhattan)
    }

    /// [`run`](Self::run), abandoned with no path once `stop` is raised.
    /// IDA*, uniform cost and bidirectional search check the flag as they go;
    /// the remaining strategies finish within one pass over the grid.
    pub fn run_until(
        &self,
        grid: &Grid,
        start: Position,
        goal: Position,
        stop: &AtomicBool,
    ) -> SearchResult {
        self.dispatch(grid, start, goal, manhattan, stop)
    }

    /// Runs the strategy and stamps the result with its wall-clock duration.
    /// Uninformed strategies ignore `heuristic`. Endpoints must be walkable,
    /// as for [`run`](Self::run).
    pub fn run_with_heuristic(
        &self,
        grid: &Grid,
        start: Position,
        goal: Position,
        heuristic: Heuristic,
    ) -> SearchResult {
        self.dispatch(grid, start, goal, heuristic, &NEVER_STOP)
    }

    fn dispatch(
        &self,
        grid: &Grid,
        start: Position,
        goal: Position,
        heuristic: Heuristic,
        stop: &AtomicBool,
    ) -> SearchResult {
        let started = Instant::now();

        let mut result = if !grid.is_walkable(start) || !grid.is_walkable(goal) {
            SearchResult::not_found(*self, 0, Vec::new())
        } else if start == goal {
            SearchResult::found(*self, grid, vec![start], 1, vec![start])
        } else {
            match self {
                Algorithm::Bfs => bfs::bfs(grid, start, goal),
                Algorithm::Dfs => dfs::dfs(grid, start, goal),
                Algorithm::UniformCost => ucs::uniform_cost_until(grid, start, goal, stop),
                Algorithm::GreedyBestFirst => greedy::greedy_best_first(grid, start, goal, heuristic),
                Algorithm::AStar => a_star::a_star(grid, start, goal, heuristic),
                Algorithm::IdaStar => ida_star::ida_star_until(grid, start, goal, heuristic, stop),
                Algorithm::Bidirectional => {
                    bidirectional::bidirectional_until(grid, start, goal, stop)
                }
            }
        };
        result.duration = started.elapsed();

        debug!(
            algorithm = self.name(),
            success = result.success,
            cost = result.cost,
            explored = result.explored_nodes,
            elapsed = ?result.duration,
            "search finished"
        );
        result
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let algorithm = match key.as_str() {
            "bfs" => Algorithm::Bfs,
            "dfs" => Algorithm::Dfs,
            "ucs" | "uniform_cost" => Algorithm::UniformCost,
            "greedy" | "greedy_best_first" => Algorithm::GreedyBestFirst,
            "a_star" | "astar" | "a*" => Algorithm::AStar,
            "ida_star" | "idastar" | "ida*" => Algorithm::IdaStar,
            "bidirectional" | "bidi" => Algorithm::Bidirectional,
            _ => {
                return Err(format!(
                    "unknown algorithm '{}', expected one of: {}",
                    s,
                    Algorithm::ALL.map(|a| a.key()).join(", ")
                ))
            }
        };
        Ok(algorithm)
    }
}
