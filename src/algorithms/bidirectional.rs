use crate::algorithms::common::{stop_requested, Frontier, SearchResult, NEVER_STOP};
use crate::algorithms::Algorithm;
use crate::grid::{Grid, Position};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::atomic::AtomicBool;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Searching outward from the start.
    Forward,
    /// Searching backward from the goal.
    Backward,
}

/// Cheapest known way to join the two searches: total cost and the position
/// where they meet.
type Meeting = Option<(u64, Position)>;

/// State of one half of the search.
struct Side {
    direction: Direction,
    origin: Position,
    frontier: Frontier,
    costs: FxHashMap<Position, u64>,
    parents: FxHashMap<Position, Position>,
    closed: FxHashSet<Position>,
}

impl Side {
    fn new(direction: Direction, origin: Position) -> Self {
        let mut side = Side {
            direction,
            origin,
            frontier: Frontier::new(),
            costs: FxHashMap::default(),
            parents: FxHashMap::default(),
            closed: FxHashSet::default(),
        };
        side.frontier.push(origin, 0);
        side.costs.insert(origin, 0);
        side
    }

    /// Cost of the cheapest open position, discarding stale queue entries.
    fn peek(&mut self) -> Option<u64> {
        while let Some((cost, pos)) = self.frontier.peek() {
            if self.closed.contains(&pos) || self.costs.get(&pos).is_some_and(|&c| c < cost) {
                self.frontier.pop();
            } else {
                return Some(cost);
            }
        }
        None
    }

    /// Settles the cheapest open position and relaxes its neighbors, recording
    /// a meeting whenever a neighbor has already been reached from the other
    /// side.
    fn expand(
        &mut self,
        grid: &Grid,
        other: &Side,
        best: &mut Meeting,
        visited_order: &mut Vec<Position>,
    ) {
        if self.peek().is_none() {
            return;
        }
        let Some((cost, current)) = self.frontier.pop() else {
            return;
        };
        self.closed.insert(current);

        for neighbor in grid.neighbors(current) {
            // Moves are always priced by the cell entered in start-to-goal order.
            let step = match self.direction {
                Direction::Forward => grid.weight(neighbor),
                Direction::Backward => grid.weight(current),
            };
            let next_cost = cost + step;
            let known = self.costs.get(&neighbor).copied();
            if known.map_or(true, |known| next_cost < known) {
                if known.is_none() {
                    visited_order.push(neighbor);
                }
                self.costs.insert(neighbor, next_cost);
                self.parents.insert(neighbor, current);
                self.frontier.push(neighbor, next_cost);
            }

            if let Some(&other_cost) = other.costs.get(&neighbor) {
                let total = self.costs[&neighbor] + other_cost;
                if best.map_or(true, |(cost, _)| total < cost) {
                    *best = Some((total, neighbor));
                }
            }
        }
    }

    /// Positions from `pos` back to this side's origin, `pos` first.
    fn trace(&self, pos: Position) -> Vec<Position> {
        let mut chain = vec![pos];
        let mut current = pos;
        while current != self.origin {
            match self.parents.get(&current) {
                Some(&parent) => {
                    chain.push(parent);
                    current = parent;
                }
                None => break,
            }
        }
        chain
    }
}

/// Bidirectional uniform-cost search.
///
/// One search grows from the start and one from the goal, taking turns one
/// expansion at a time. Every time the two frontiers touch, the joined route is
/// a candidate; the search stops as soon as the cheapest open positions on both
/// sides together cannot undercut the best candidate, which makes the result a
/// lowest-cost path even on weighted grids. The examined count is the union of
/// everything either side reached.
pub fn bidirectional(grid: &Grid, start: Position, goal: Position) -> SearchResult {
    bidirectional_until(grid, start, goal, &NEVER_STOP)
}

/// [`bidirectional`] that gives up, reporting no path, once `stop` is raised.
pub(crate) fn bidirectional_until(
    grid: &Grid,
    start: Position,
    goal: Position,
    stop: &AtomicBool,
) -> SearchResult {
    let mut forward = Side::new(Direction::Forward, start);
    let mut backward = Side::new(Direction::Backward, goal);
    let mut visited_order = vec![start, goal];
    let mut best: Meeting = None;
    let mut forward_turn = true;

    let mut stopped = false;
    loop {
        if stop_requested(stop) {
            stopped = true;
            break;
        }
        let (Some(top_forward), Some(top_backward)) = (forward.peek(), backward.peek()) else {
            break;
        };
        if best.is_some_and(|(cost, _)| top_forward + top_backward >= cost) {
            break;
        }
        if forward_turn {
            forward.expand(grid, &backward, &mut best, &mut visited_order);
        } else {
            backward.expand(grid, &forward, &mut best, &mut visited_order);
        }
        forward_turn = !forward_turn;
    }

    let explored = forward.costs.len()
        + backward
            .costs
            .keys()
            .filter(|pos| !forward.costs.contains_key(pos))
            .count();

    match best {
        Some((_, meeting)) if !stopped => {
            let mut path = forward.trace(meeting);
            path.reverse();
            path.extend(backward.trace(meeting).into_iter().skip(1));
            SearchResult::found(Algorithm::Bidirectional, grid, path, explored, visited_order)
        }
        _ => SearchResult::not_found(Algorithm::Bidirectional, explored, visited_order),
    }
}
