use crate::algorithms::common::{stop_requested, Heuristic, SearchResult, NEVER_STOP};
use crate::algorithms::Algorithm;
use crate::grid::{Grid, Position};
use rustc_hash::FxHashSet;
use std::sync::atomic::AtomicBool;
use tracing::trace;

/// One level of the explicit depth-first stack.
struct Frame {
    pos: Position,
    cost: u64,
    neighbors: Vec<Position>,
    next: usize,
}

/// Everything the search has examined so far, across all iterations.
struct Trail {
    explored: FxHashSet<Position>,
    visited_order: Vec<Position>,
}

impl Trail {
    fn record(&mut self, pos: Position) {
        if self.explored.insert(pos) {
            self.visited_order.push(pos);
        }
    }
}

/// How one bounded depth-first pass ended.
enum Pass {
    Found(Vec<Position>),
    /// Smallest f-value that exceeded the bound.
    Raise(u64),
    Exhausted,
    Stopped,
}

/// Iterative-deepening A*.
///
/// Each iteration is a depth-first search cut off at an f-bound; the next bound
/// is the smallest f that overflowed the current one. Memory stays proportional
/// to the path length plus one entry per distinct examined position: examined
/// positions accumulate across iterations, and the visitation order records
/// each position the first time any iteration reaches it.
pub fn ida_star(grid: &Grid, start: Position, goal: Position, heuristic: Heuristic) -> SearchResult {
    ida_star_until(grid, start, goal, heuristic, &NEVER_STOP)
}

/// [`ida_star`] that gives up, reporting no path, once `stop` is raised.
pub(crate) fn ida_star_until(
    grid: &Grid,
    start: Position,
    goal: Position,
    heuristic: Heuristic,
    stop: &AtomicBool,
) -> SearchResult {
    let mut trail = Trail {
        explored: FxHashSet::default(),
        visited_order: Vec::new(),
    };
    trail.record(start);

    let mut bound = heuristic(start, goal);
    let mut iterations = 0usize;
    loop {
        iterations += 1;
        match deepen(grid, start, goal, heuristic, bound, stop, &mut trail) {
            Pass::Found(path) => {
                trace!(iterations, bound, "ida* reached goal");
                return SearchResult::found(
                    Algorithm::IdaStar,
                    grid,
                    path,
                    trail.explored.len(),
                    trail.visited_order,
                );
            }
            Pass::Exhausted => {
                trace!(iterations, bound, "ida* exhausted search space");
                return SearchResult::not_found(
                    Algorithm::IdaStar,
                    trail.explored.len(),
                    trail.visited_order,
                );
            }
            Pass::Stopped => {
                trace!(iterations, bound, "ida* stopped");
                return SearchResult::not_found(
                    Algorithm::IdaStar,
                    trail.explored.len(),
                    trail.visited_order,
                );
            }
            Pass::Raise(next) => bound = next,
        }
    }
}

fn deepen(
    grid: &Grid,
    start: Position,
    goal: Position,
    heuristic: Heuristic,
    bound: u64,
    stop: &AtomicBool,
    trail: &mut Trail,
) -> Pass {
    let mut on_path: FxHashSet<Position> = FxHashSet::default();
    on_path.insert(start);
    let mut stack = vec![Frame {
        pos: start,
        cost: 0,
        neighbors: grid.neighbors(start),
        next: 0,
    }];
    let mut next_bound: Option<u64> = None;

    while let Some(frame) = stack.last_mut() {
        if stop_requested(stop) {
            return Pass::Stopped;
        }
        let Some(&next) = frame.neighbors.get(frame.next) else {
            on_path.remove(&frame.pos);
            stack.pop();
            continue;
        };
        frame.next += 1;
        if on_path.contains(&next) {
            continue;
        }

        let cost = frame.cost + grid.weight(next);
        trail.record(next);

        let f = cost + heuristic(next, goal);
        if f > bound {
            next_bound = Some(next_bound.map_or(f, |b| b.min(f)));
            continue;
        }
        if next == goal {
            let mut path: Vec<Position> = stack.iter().map(|frame| frame.pos).collect();
            path.push(next);
            return Pass::Found(path);
        }

        on_path.insert(next);
        stack.push(Frame {
            pos: next,
            cost,
            neighbors: grid.neighbors(next),
            next: 0,
        });
    }

    next_bound.map_or(Pass::Exhausted, Pass::Raise)
}
