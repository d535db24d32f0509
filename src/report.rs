use crate::algorithms::SearchResult;
use crate::evaluator::select_best;
use crate::priority::{Criterion, PriorityOrder};
use std::fmt;

/// Printable side-by-side summary of one evaluation.
pub struct ComparisonReport<'a> {
    results: &'a [SearchResult],
    order: PriorityOrder,
}

impl<'a> ComparisonReport<'a> {
    pub fn new(results: &'a [SearchResult], order: PriorityOrder) -> Self {
        ComparisonReport { results, order }
    }

    /// Best successful result on `criterion` alone.
    fn leader(&self, criterion: Criterion) -> Option<&'a SearchResult> {
        self.results
            .iter()
            .filter(|r| r.success)
            .min_by(|a, b| {
                criterion
                    .compare(a, b)
                    .then_with(|| a.algorithm.cmp(&b.algorithm))
            })
    }
}

fn criterion_value(result: &SearchResult, criterion: Criterion) -> String {
    match criterion {
        Criterion::Cost => result.cost.to_string(),
        Criterion::ExploredNodes => result.explored_nodes.to_string(),
        Criterion::Duration => format!("{:.2?}", result.duration),
    }
}

impl fmt::Display for ComparisonReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== ALGORITHM COMPARISON RESULTS ===")?;
        writeln!(f)?;
        writeln!(
            f,
            "{:<18} {:<7} {:>6} {:>7} {:>6} {:>12}  {}",
            "Algorithm", "Success", "Cost", "Nodes", "Steps", "Time", "Notes"
        )?;
        writeln!(f, "{}", "-".repeat(70))?;

        for result in self.results {
            let success = if result.success { "✓" } else { "✗" };
            let (cost, steps) = if result.success {
                (result.cost.to_string(), result.steps().to_string())
            } else {
                ("-".to_string(), "-".to_string())
            };
            writeln!(
                f,
                "{:<18} {:<7} {:>6} {:>7} {:>6} {:>12}  {}",
                result.algorithm.name(),
                success,
                cost,
                result.explored_nodes,
                steps,
                format!("{:.2?}", result.duration),
                result.fault.as_deref().unwrap_or("")
            )?;
        }
        writeln!(f)?;

        writeln!(f, "=== BEST RESULT ({}) ===", self.order)?;
        match select_best(self.results, &self.order) {
            Ok(best) => {
                writeln!(f, "{}", best.algorithm)?;
                writeln!(f, "  • Cost: {}", best.cost)?;
                writeln!(f, "  • Nodes explored: {}", best.explored_nodes)?;
                writeln!(f, "  • Path length: {} steps", best.steps())?;
                writeln!(f, "  • Time taken: {:.2?}", best.duration)?;
            }
            Err(_) => {
                writeln!(f, "No algorithm found a path.")?;
                return Ok(());
            }
        }
        writeln!(f)?;

        writeln!(f, "=== LEADERS ===")?;
        for criterion in Criterion::ALL {
            if let Some(leader) = self.leader(criterion) {
                writeln!(
                    f,
                    "{:<15} {} ({})",
                    format!("{}:", criterion.label()),
                    leader.algorithm,
                    criterion_value(leader, criterion)
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::Algorithm;
    use crate::grid::Position;
    use std::time::Duration;

    fn result(algorithm: Algorithm, success: bool, cost: u64, nodes: usize, micros: u64) -> SearchResult {
        SearchResult {
            algorithm,
            path: if success {
                vec![Position::new(0, 0), Position::new(0, 1)]
            } else {
                Vec::new()
            },
            cost,
            explored_nodes: nodes,
            duration: Duration::from_micros(micros),
            success,
            visited_order: Vec::new(),
            fault: None,
        }
    }

    #[test]
    fn lists_every_algorithm_and_the_winner() {
        let results = vec![
            result(Algorithm::Bfs, true, 9, 40, 30),
            result(Algorithm::GreedyBestFirst, true, 12, 10, 5),
            result(Algorithm::AStar, true, 9, 20, 50),
        ];
        let text = ComparisonReport::new(&results, PriorityOrder::DEFAULT).to_string();

        for name in ["BFS", "Greedy Best-First", "A*"] {
            assert!(text.contains(name), "missing {name}");
        }
        assert!(text.contains("=== BEST RESULT (Cost > Nodes explored > Time taken) ===\nA*\n"));
        assert!(text.contains("Nodes explored: Greedy Best-First (10)"));
        assert!(text.contains("Cost:           BFS (9)"));
    }

    #[test]
    fn says_so_when_nothing_succeeded() {
        let mut faulted = result(Algorithm::Dfs, false, 0, 0, 0);
        faulted.fault = Some("DFS faulted: boom".to_string());
        let results = vec![result(Algorithm::Bfs, false, 0, 6, 4), faulted];

        let text = ComparisonReport::new(&results, PriorityOrder::DEFAULT).to_string();
        assert!(text.contains("No algorithm found a path."));
        assert!(text.contains("DFS faulted: boom"));
        assert!(!text.contains("=== LEADERS ==="));
    }
}
