//! Lexicographic ranking of search results.

use crate::algorithms::SearchResult;
use crate::error::{EngineError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A single metric results can be ranked by. Smaller is always better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criterion {
    Cost,
    ExploredNodes,
    Duration,
}

impl Criterion {
    pub const ALL: [Criterion; 3] = [Criterion::Cost, Criterion::ExploredNodes, Criterion::Duration];

    pub fn label(&self) -> &'static str {
        match self {
            Criterion::Cost => "Cost",
            Criterion::ExploredNodes => "Nodes explored",
            Criterion::Duration => "Time taken",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Criterion::Cost => "cost",
            Criterion::ExploredNodes => "nodes",
            Criterion::Duration => "time",
        }
    }

    pub fn compare(&self, a: &SearchResult, b: &SearchResult) -> Ordering {
        match self {
            Criterion::Cost => a.cost.cmp(&b.cost),
            Criterion::ExploredNodes => a.explored_nodes.cmp(&b.explored_nodes),
            Criterion::Duration => a.duration.cmp(&b.duration),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Criterion {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cost" => Ok(Criterion::Cost),
            "nodes" | "explored_nodes" | "explored" => Ok(Criterion::ExploredNodes),
            "time" | "duration" => Ok(Criterion::Duration),
            other => Err(EngineError::InvalidPriorityOrder {
                reason: format!("unknown criterion '{other}'"),
            }),
        }
    }
}

/// Ordered triple of distinct criteria; the first is the primary key.
///
/// ```
/// use pathfinding_compare::priority::{Criterion, PriorityOrder};
///
/// let order: PriorityOrder = "time,cost,nodes".parse().unwrap();
/// assert_eq!(order.criteria()[0], Criterion::Duration);
/// assert_eq!(order.to_string(), "Time taken > Cost > Nodes explored");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PriorityOrder([Criterion; 3]);

impl PriorityOrder {
    pub const DEFAULT: PriorityOrder =
        PriorityOrder([Criterion::Cost, Criterion::ExploredNodes, Criterion::Duration]);

    /// Validates that `criteria` names each criterion exactly once.
    pub fn with_order(criteria: &[Criterion]) -> Result<Self> {
        let order: [Criterion; 3] = criteria
            .try_into()
            .map_err(|_| EngineError::InvalidPriorityOrder {
                reason: format!("expected 3 criteria, got {}", criteria.len()),
            })?;
        for (i, criterion) in order.iter().enumerate() {
            if order[..i].contains(criterion) {
                return Err(EngineError::InvalidPriorityOrder {
                    reason: format!("'{}' appears more than once", criterion.key()),
                });
            }
        }
        Ok(PriorityOrder(order))
    }

    pub fn criteria(&self) -> [Criterion; 3] {
        self.0
    }

    /// Moves the criterion at `from` into slot `to`, shifting the others.
    /// Out-of-range indices leave the order as it is.
    pub fn reorder(&self, from: usize, to: usize) -> PriorityOrder {
        if from == to || from >= self.0.len() || to >= self.0.len() {
            return *self;
        }
        let mut criteria = self.0.to_vec();
        let moved = criteria.remove(from);
        criteria.insert(to, moved);
        let mut order = self.0;
        order.copy_from_slice(&criteria);
        PriorityOrder(order)
    }

    /// Lexicographic comparison of two results under this order.
    pub fn compare(&self, a: &SearchResult, b: &SearchResult) -> Ordering {
        self.0
            .iter()
            .map(|criterion| criterion.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl Default for PriorityOrder {
    fn default() -> Self {
        PriorityOrder::DEFAULT
    }
}

impl fmt::Display for PriorityOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [first, second, third] = self.0;
        write!(f, "{first} > {second} > {third}")
    }
}

impl FromStr for PriorityOrder {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let criteria = s
            .split([',', '>'])
            .map(str::parse)
            .collect::<Result<Vec<Criterion>>>()?;
        PriorityOrder::with_order(&criteria)
    }
}
