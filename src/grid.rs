use crate::error::{EngineError, Result};
use crate::weights::next_weight;
use pathfinding::prelude::{bfs, dijkstra};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use tracing::debug;

/// Moves in the order neighbors are reported: up, right, down, left.
const DIRECTIONS: [(isize, isize); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

/// Weights handed out to the weighted cells of a random grid.
const RANDOM_WEIGHTS: [u32; 4] = [2, 3, 5, 10];

/// Number of fresh layouts a random grid draws before it starts clearing obstacles.
const MAX_LAYOUT_ATTEMPTS: usize = 16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// Manhattan distance between two positions.
    pub fn distance(&self, other: Position) -> u64 {
        (self.row.abs_diff(other.row) + self.col.abs_diff(other.col)) as u64
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Position { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Free,
    Obstacle,
    Start,
    Goal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub kind: CellKind,
    /// Cost of entering the cell. Meaningless for obstacles.
    pub weight: u32,
}

impl Cell {
    const FREE: Cell = Cell {
        kind: CellKind::Free,
        weight: 1,
    };
    const OBSTACLE: Cell = Cell {
        kind: CellKind::Obstacle,
        weight: 1,
    };

    pub fn is_obstacle(&self) -> bool {
        self.kind == CellKind::Obstacle
    }
}

/// Result of asking what it costs to step onto a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepCost {
    Weight(u32),
    Blocked,
}

/// Layout handed to [`Grid::build`].
#[derive(Debug, Clone, Default)]
pub struct GridSetup {
    pub start: Position,
    pub goal: Position,
    pub obstacles: Vec<Position>,
    pub weights: Vec<(Position, u32)>,
}

impl GridSetup {
    pub fn new(start: Position, goal: Position) -> Self {
        GridSetup {
            start,
            goal,
            ..Default::default()
        }
    }

    pub fn with_obstacles<I: IntoIterator<Item = Position>>(mut self, obstacles: I) -> Self {
        self.obstacles.extend(obstacles);
        self
    }

    pub fn with_weights<I: IntoIterator<Item = (Position, u32)>>(mut self, weights: I) -> Self {
        self.weights.extend(weights);
        self
    }
}

/// Rectangular, 4-connected grid with weighted cells.
///
/// The shape never changes after construction. Only the weights of free cells
/// can be edited, through [`Grid::set_weight`] and friends.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    start: Position,
    goal: Position,
}

impl Grid {
    /// Builds a grid from an explicit layout.
    ///
    /// Fails with `InvalidDimensions` for an empty shape and with
    /// `InvalidEndpoints` when start or goal are outside the grid, coincide, or
    /// are covered by an obstacle. A weight placed on an obstacle or an endpoint
    /// is a `LockedCell` error, and a zero weight is `InvalidWeight`.
    pub fn build(rows: usize, cols: usize, setup: &GridSetup) -> Result<Grid> {
        if rows == 0 || cols == 0 {
            return Err(EngineError::InvalidDimensions { rows, cols });
        }

        let (start, goal) = (setup.start, setup.goal);
        let in_bounds = |p: Position| p.row < rows && p.col < cols;
        if !in_bounds(start) || !in_bounds(goal) {
            return Err(EngineError::InvalidEndpoints {
                start,
                goal,
                reason: "endpoint lies outside the grid",
            });
        }
        if start == goal {
            return Err(EngineError::InvalidEndpoints {
                start,
                goal,
                reason: "start and goal coincide",
            });
        }

        let mut grid = Grid {
            rows,
            cols,
            cells: vec![Cell::FREE; rows * cols],
            start,
            goal,
        };

        for &pos in &setup.obstacles {
            let idx = grid.index_checked(pos)?;
            if pos == start || pos == goal {
                return Err(EngineError::InvalidEndpoints {
                    start,
                    goal,
                    reason: "endpoint is covered by an obstacle",
                });
            }
            grid.cells[idx] = Cell::OBSTACLE;
        }

        let start_idx = grid.index(start);
        let goal_idx = grid.index(goal);
        grid.cells[start_idx].kind = CellKind::Start;
        grid.cells[goal_idx].kind = CellKind::Goal;

        for &(pos, weight) in &setup.weights {
            let idx = grid.index_checked(pos)?;
            let kind = grid.cells[idx].kind;
            if kind != CellKind::Free {
                return Err(EngineError::LockedCell { position: pos, kind });
            }
            if weight == 0 {
                return Err(EngineError::InvalidWeight {
                    position: pos,
                    weight,
                });
            }
            grid.cells[idx].weight = weight;
        }

        Ok(grid)
    }

    /// Generates a reproducible random grid with start at the top-left corner and
    /// goal at the bottom-right corner.
    ///
    /// Every cell other than the endpoints becomes an obstacle with probability
    /// `obstacle_ratio` and a weighted cell with probability `weighted_ratio`.
    /// The result always has a path from start to goal: disconnected layouts are
    /// redrawn a bounded number of times, after which the fewest obstacles that
    /// separate start from goal are removed.
    pub fn random_grid(
        rows: usize,
        cols: usize,
        obstacle_ratio: f64,
        weighted_ratio: f64,
        seed: u64,
    ) -> Result<Grid> {
        check_ratio("obstacle_ratio", obstacle_ratio)?;
        check_ratio("weighted_ratio", weighted_ratio)?;
        if rows == 0 || cols == 0 {
            return Err(EngineError::InvalidDimensions { rows, cols });
        }

        let setup = GridSetup::new(Position::new(0, 0), Position::new(rows - 1, cols - 1));
        let mut grid = Grid::build(rows, cols, &setup)?;
        let mut rng = StdRng::seed_from_u64(seed);

        for attempt in 0..MAX_LAYOUT_ATTEMPTS {
            grid.scatter(&mut rng, obstacle_ratio, weighted_ratio);
            if grid.is_connected() {
                debug!(seed, attempt, "generated connected random grid");
                return Ok(grid);
            }
        }

        let cleared = grid.clear_corridor();
        debug!(seed, cleared, "cleared obstacles to connect random grid");
        Ok(grid)
    }

    fn scatter(&mut self, rng: &mut StdRng, obstacle_ratio: f64, weighted_ratio: f64) {
        for cell in self.cells.iter_mut() {
            if matches!(cell.kind, CellKind::Start | CellKind::Goal) {
                continue;
            }
            let roll: f64 = rng.gen();
            *cell = if roll < obstacle_ratio {
                Cell::OBSTACLE
            } else if roll < obstacle_ratio + weighted_ratio {
                Cell {
                    kind: CellKind::Free,
                    weight: RANDOM_WEIGHTS[rng.gen_range(0..RANDOM_WEIGHTS.len())],
                }
            } else {
                Cell::FREE
            };
        }
    }

    /// Opens a corridor from start to goal through as few obstacles as possible.
    /// Returns the number of obstacles removed.
    fn clear_corridor(&mut self) -> usize {
        let goal = self.goal;
        let corridor = dijkstra(
            &self.start,
            |p| {
                self.adjacent(*p)
                    .map(|n| (n, usize::from(self.cells[self.index(n)].is_obstacle())))
                    .collect::<Vec<_>>()
            },
            |p| *p == goal,
        );

        let Some((path, removed)) = corridor else {
            return 0;
        };
        for pos in path {
            let idx = self.index(pos);
            if self.cells[idx].is_obstacle() {
                self.cells[idx] = Cell::FREE;
            }
        }
        removed
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    /// Number of cells in the grid.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    pub fn cell(&self, pos: Position) -> Result<Cell> {
        self.index_checked(pos).map(|idx| self.cells[idx])
    }

    pub fn kind_of(&self, pos: Position) -> Result<CellKind> {
        self.cell(pos).map(|cell| cell.kind)
    }

    /// Cost of stepping onto `pos`, or `Blocked` for an obstacle.
    pub fn cost_of(&self, pos: Position) -> Result<StepCost> {
        let cell = self.cell(pos)?;
        Ok(if cell.is_obstacle() {
            StepCost::Blocked
        } else {
            StepCost::Weight(cell.weight)
        })
    }

    /// Weight of an in-bounds cell, for callers that already validated `pos`.
    pub(crate) fn weight(&self, pos: Position) -> u64 {
        self.cells[self.index(pos)].weight as u64
    }

    pub(crate) fn is_walkable(&self, pos: Position) -> bool {
        self.in_bounds(pos) && !self.cells[self.index(pos)].is_obstacle()
    }

    /// In-bounds, non-obstacle neighbors of `pos` in the order up, right, down, left.
    pub fn neighbors(&self, pos: Position) -> Vec<Position> {
        self.adjacent(pos)
            .filter(|n| !self.cells[self.index(*n)].is_obstacle())
            .collect()
    }

    /// In-bounds neighbors of `pos`, obstacles included.
    fn adjacent(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        DIRECTIONS.iter().filter_map(move |&(dr, dc)| {
            let row = pos.row.checked_add_signed(dr)?;
            let col = pos.col.checked_add_signed(dc)?;
            (row < self.rows && col < self.cols).then_some(Position { row, col })
        })
    }

    /// Whether the goal can be reached from the start.
    pub fn is_connected(&self) -> bool {
        let goal = self.goal;
        bfs(&self.start, |p| self.neighbors(*p), |p| *p == goal).is_some()
    }

    /// Sum of the weights of every cell entered along `path`.
    pub fn path_cost(&self, path: &[Position]) -> u64 {
        path.iter().skip(1).map(|&p| self.weight(p)).sum()
    }

    /// Sets the weight of a free cell.
    ///
    /// The caller owns any results computed before the edit; the grid keeps no
    /// record that they are stale.
    pub fn set_weight(&mut self, pos: Position, weight: u32) -> Result<()> {
        let idx = self.index_checked(pos)?;
        let kind = self.cells[idx].kind;
        if kind != CellKind::Free {
            return Err(EngineError::LockedCell {
                position: pos,
                kind,
            });
        }
        if weight == 0 {
            return Err(EngineError::InvalidWeight {
                position: pos,
                weight,
            });
        }
        self.cells[idx].weight = weight;
        Ok(())
    }

    /// Advances a free cell to the next value of the weight cycle and returns it.
    pub fn cycle_weight(&mut self, pos: Position) -> Result<u32> {
        let next = next_weight(self.cell(pos)?.weight);
        self.set_weight(pos, next)?;
        Ok(next)
    }

    /// Puts every free cell back to weight 1. Returns whether anything changed.
    pub fn reset_weights(&mut self) -> bool {
        let mut changed = false;
        for cell in self.cells.iter_mut().filter(|c| c.kind == CellKind::Free) {
            if cell.weight != 1 {
                cell.weight = 1;
                changed = true;
            }
        }
        changed
    }

    pub fn has_custom_weights(&self) -> bool {
        self.cells
            .iter()
            .any(|c| c.kind == CellKind::Free && c.weight != 1)
    }

    fn index(&self, pos: Position) -> usize {
        pos.row * self.cols + pos.col
    }

    fn index_checked(&self, pos: Position) -> Result<usize> {
        if self.in_bounds(pos) {
            Ok(self.index(pos))
        } else {
            Err(EngineError::OutOfBounds {
                position: pos,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }
}

fn check_ratio(name: &'static str, value: f64) -> Result<()> {
    if (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::InvalidRatio { name, value })
    }
}

/// ASCII map. Legend: S=Start, G=Goal, #=Obstacle, .=weight 1, digits for
/// heavier cells, X for weight 10 and above.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let cell = self.cells[self.index(Position { row, col })];
                let symbol = match cell.kind {
                    CellKind::Start => 'S',
                    CellKind::Goal => 'G',
                    CellKind::Obstacle => '#',
                    CellKind::Free => match cell.weight {
                        1 => '.',
                        w @ 2..=9 => char::from_digit(w, 10).unwrap_or('?'),
                        _ => 'X',
                    },
                };
                if col > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(rows: usize, cols: usize) -> Grid {
        let setup = GridSetup::new(Position::new(0, 0), Position::new(rows - 1, cols - 1));
        Grid::build(rows, cols, &setup).unwrap()
    }

    #[test]
    fn build_rejects_empty_dimensions() {
        let setup = GridSetup::new(Position::new(0, 0), Position::new(0, 1));
        assert_eq!(
            Grid::build(0, 3, &setup),
            Err(EngineError::InvalidDimensions { rows: 0, cols: 3 })
        );
    }

    #[test]
    fn build_rejects_bad_endpoints() {
        let same = GridSetup::new(Position::new(1, 1), Position::new(1, 1));
        assert!(matches!(
            Grid::build(3, 3, &same),
            Err(EngineError::InvalidEndpoints { .. })
        ));

        let outside = GridSetup::new(Position::new(0, 0), Position::new(3, 0));
        assert!(matches!(
            Grid::build(3, 3, &outside),
            Err(EngineError::InvalidEndpoints { .. })
        ));

        let covered = GridSetup::new(Position::new(0, 0), Position::new(2, 2))
            .with_obstacles([Position::new(2, 2)]);
        assert!(matches!(
            Grid::build(3, 3, &covered),
            Err(EngineError::InvalidEndpoints { .. })
        ));
    }

    #[test]
    fn build_rejects_weights_on_endpoints_and_zero_weights() {
        let on_start = GridSetup::new(Position::new(0, 0), Position::new(2, 2))
            .with_weights([(Position::new(0, 0), 5)]);
        assert!(matches!(
            Grid::build(3, 3, &on_start),
            Err(EngineError::LockedCell {
                kind: CellKind::Start,
                ..
            })
        ));

        let zero = GridSetup::new(Position::new(0, 0), Position::new(2, 2))
            .with_weights([(Position::new(1, 1), 0)]);
        assert!(matches!(
            Grid::build(3, 3, &zero),
            Err(EngineError::InvalidWeight { weight: 0, .. })
        ));
    }

    #[test]
    fn build_rejects_weights_on_obstacles() {
        let setup = GridSetup::new(Position::new(0, 0), Position::new(2, 2))
            .with_obstacles([Position::new(1, 1)])
            .with_weights([(Position::new(1, 1), 3)]);
        assert_eq!(
            Grid::build(3, 3, &setup),
            Err(EngineError::LockedCell {
                position: Position::new(1, 1),
                kind: CellKind::Obstacle,
            })
        );
    }

    #[test]
    fn neighbors_follow_fixed_order_and_skip_obstacles() {
        let grid = open(3, 3);
        let center = Position::new(1, 1);
        assert_eq!(
            grid.neighbors(center),
            vec![
                Position::new(0, 1),
                Position::new(1, 2),
                Position::new(2, 1),
                Position::new(1, 0),
            ]
        );

        let setup = GridSetup::new(Position::new(0, 0), Position::new(2, 2))
            .with_obstacles([Position::new(0, 1)]);
        let grid = Grid::build(3, 3, &setup).unwrap();
        assert_eq!(grid.neighbors(Position::new(0, 0)), vec![Position::new(1, 0)]);
    }

    #[test]
    fn cost_of_reports_weights_blocked_and_out_of_bounds() {
        let setup = GridSetup::new(Position::new(0, 0), Position::new(2, 2))
            .with_obstacles([Position::new(1, 1)])
            .with_weights([(Position::new(0, 2), 5)]);
        let grid = Grid::build(3, 3, &setup).unwrap();

        assert_eq!(grid.cost_of(Position::new(0, 2)), Ok(StepCost::Weight(5)));
        assert_eq!(grid.cost_of(Position::new(1, 1)), Ok(StepCost::Blocked));
        assert!(matches!(
            grid.cost_of(Position::new(5, 0)),
            Err(EngineError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn clone_is_independent() {
        let grid = open(3, 3);
        let mut copy = grid.clone();
        copy.set_weight(Position::new(1, 1), 10).unwrap();
        assert_eq!(grid.cost_of(Position::new(1, 1)), Ok(StepCost::Weight(1)));
        assert_ne!(grid, copy);
    }

    #[test]
    fn random_grid_is_reproducible() {
        let a = Grid::random_grid(12, 9, 0.3, 0.2, 42).unwrap();
        let b = Grid::random_grid(12, 9, 0.3, 0.2, 42).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn random_grid_is_always_connected() {
        for seed in 0..50 {
            let grid = Grid::random_grid(10, 10, 0.6, 0.1, seed).unwrap();
            assert!(grid.is_connected(), "seed {seed} produced a disconnected grid");
            assert_eq!(grid.kind_of(grid.start()), Ok(CellKind::Start));
            assert_eq!(grid.kind_of(grid.goal()), Ok(CellKind::Goal));
        }
    }

    #[test]
    fn dense_random_grid_falls_back_to_clearing_a_corridor() {
        let grid = Grid::random_grid(15, 15, 0.95, 0.0, 7).unwrap();
        assert!(grid.is_connected());
    }

    #[test]
    fn random_grid_rejects_bad_ratios() {
        assert!(matches!(
            Grid::random_grid(5, 5, 1.0, 0.0, 1),
            Err(EngineError::InvalidRatio {
                name: "obstacle_ratio",
                ..
            })
        ));
        assert!(matches!(
            Grid::random_grid(5, 5, 0.1, -0.2, 1),
            Err(EngineError::InvalidRatio {
                name: "weighted_ratio",
                ..
            })
        ));
        assert!(matches!(
            Grid::random_grid(1, 1, 0.1, 0.1, 1),
            Err(EngineError::InvalidEndpoints { .. })
        ));
    }

    #[test]
    fn weight_editing_respects_locked_cells() {
        let setup = GridSetup::new(Position::new(0, 0), Position::new(2, 2))
            .with_obstacles([Position::new(1, 1)]);
        let mut grid = Grid::build(3, 3, &setup).unwrap();

        assert!(matches!(
            grid.set_weight(Position::new(0, 0), 3),
            Err(EngineError::LockedCell {
                kind: CellKind::Start,
                ..
            })
        ));
        assert!(matches!(
            grid.set_weight(Position::new(1, 1), 3),
            Err(EngineError::LockedCell {
                kind: CellKind::Obstacle,
                ..
            })
        ));
        assert!(matches!(
            grid.cycle_weight(Position::new(2, 2)),
            Err(EngineError::LockedCell {
                kind: CellKind::Goal,
                ..
            })
        ));

        assert!(!grid.has_custom_weights());
        assert_eq!(grid.cycle_weight(Position::new(0, 1)), Ok(2));
        assert_eq!(grid.cycle_weight(Position::new(0, 1)), Ok(3));
        assert!(grid.has_custom_weights());
        assert!(grid.reset_weights());
        assert!(!grid.reset_weights());
        assert!(!grid.has_custom_weights());
    }

    #[test]
    fn path_cost_sums_destination_weights() {
        let setup = GridSetup::new(Position::new(0, 0), Position::new(1, 1))
            .with_weights([(Position::new(0, 1), 5)]);
        let grid = Grid::build(2, 2, &setup).unwrap();
        let path = [Position::new(0, 0), Position::new(0, 1), Position::new(1, 1)];
        assert_eq!(grid.path_cost(&path), 6);
        assert_eq!(grid.path_cost(&path[..1]), 0);
    }

    #[test]
    fn display_draws_legend_symbols() {
        let setup = GridSetup::new(Position::new(0, 0), Position::new(1, 2))
            .with_obstacles([Position::new(1, 0)])
            .with_weights([(Position::new(0, 1), 3), (Position::new(0, 2), 10)]);
        let grid = Grid::build(2, 3, &setup).unwrap();
        assert_eq!(grid.to_string(), "S 3 X\n# . G\n");
    }
}
