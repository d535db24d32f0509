use crate::algorithms::Algorithm;
use crate::grid::{Grid, Position};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{self, AtomicBool};
use std::time::Duration;

/// Estimate of the remaining cost between two positions.
pub type Heuristic = fn(Position, Position) -> u64;

/// Manhattan distance. Admissible and consistent on a 4-connected grid whose
/// weights are all at least 1.
pub fn manhattan(from: Position, to: Position) -> u64 {
    from.distance(to)
}

/// Stop signal nobody ever raises, for runs that cannot be interrupted.
pub(crate) static NEVER_STOP: AtomicBool = AtomicBool::new(false);

/// Whether a search should give up at its next checkpoint.
pub(crate) fn stop_requested(stop: &AtomicBool) -> bool {
    stop.load(atomic::Ordering::Relaxed)
}

/// Outcome of running one algorithm once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub algorithm: Algorithm,
    /// Positions from start to goal, both included. Empty on failure.
    pub path: Vec<Position>,
    /// Sum of the weights of the cells entered along `path`. 0 on failure.
    pub cost: u64,
    /// Distinct positions the search examined.
    pub explored_nodes: usize,
    pub duration: Duration,
    pub success: bool,
    /// Positions in the order the search reached them, for replay.
    pub visited_order: Vec<Position>,
    /// Set when the evaluator had to replace the run with a failure.
    pub fault: Option<String>,
}

impl SearchResult {
    pub(crate) fn found(
        algorithm: Algorithm,
        grid: &Grid,
        path: Vec<Position>,
        explored_nodes: usize,
        visited_order: Vec<Position>,
    ) -> Self {
        SearchResult {
            algorithm,
            cost: grid.path_cost(&path),
            path,
            explored_nodes,
            duration: Duration::ZERO,
            success: true,
            visited_order,
            fault: None,
        }
    }

    pub(crate) fn not_found(
        algorithm: Algorithm,
        explored_nodes: usize,
        visited_order: Vec<Position>,
    ) -> Self {
        SearchResult {
            algorithm,
            path: Vec::new(),
            cost: 0,
            explored_nodes,
            duration: Duration::ZERO,
            success: false,
            visited_order,
            fault: None,
        }
    }

    pub(crate) fn faulted(algorithm: Algorithm, reason: String, duration: Duration) -> Self {
        SearchResult {
            duration,
            fault: Some(reason),
            ..SearchResult::not_found(algorithm, 0, Vec::new())
        }
    }

    /// Number of moves along the path.
    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Priority queue entry. Smaller priorities pop first, equal priorities pop in
/// insertion order.
#[derive(Clone, Copy, PartialEq, Eq)]
struct Entry {
    priority: u64,
    seq: u64,
    pos: Position,
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed comparison to make BinaryHeap a min-heap
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-priority frontier with FIFO tie-breaking.
pub(crate) struct Frontier {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl Frontier {
    pub(crate) fn new() -> Self {
        Frontier {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub(crate) fn push(&mut self, pos: Position, priority: u64) {
        self.heap.push(Entry {
            priority,
            seq: self.next_seq,
            pos,
        });
        self.next_seq += 1;
    }

    pub(crate) fn pop(&mut self) -> Option<(u64, Position)> {
        self.heap.pop().map(|e| (e.priority, e.pos))
    }

    pub(crate) fn peek(&self) -> Option<(u64, Position)> {
        self.heap.peek().map(|e| (e.priority, e.pos))
    }
}

/// Walks `parents` back from `goal` to `start` and returns the path in
/// start-to-goal order.
pub(crate) fn reconstruct_path(
    parents: &FxHashMap<Position, Position>,
    start: Position,
    goal: Position,
) -> Vec<Position> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        match parents.get(&current) {
            Some(&parent) => {
                path.push(parent);
                current = parent;
            }
            None => break,
        }
    }
    path.reverse();
    path
}
