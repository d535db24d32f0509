//! Concurrent evaluation of every search strategy against one grid.
//!
//! Each algorithm runs as its own task on a dedicated `rayon` pool with a
//! private clone of the grid. Results are gathered over a channel, re-sorted
//! into canonical algorithm order and ranked with a [`PriorityOrder`].
//!
//! Every evaluation owns a stop flag that is raised when it returns, whether
//! it finished, hit its deadline or was cancelled. Searches that can run long
//! watch that flag, so abandoned tasks give their worker back to the pool.

use crate::algorithms::{Algorithm, SearchResult};
use crate::error::{EngineError, Result};
use crate::grid::{Grid, Position};
use crate::priority::PriorityOrder;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How often the join wakes up to look at the cancel flag.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

type Job = Box<dyn FnOnce(&AtomicBool) -> SearchResult + Send + 'static>;

/// Raises the evaluation's stop flag on every way out of [`Evaluator::collect`].
struct StopOnDrop(Arc<AtomicBool>);

impl Drop for StopOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Which algorithms to run and how.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatorConfig {
    /// Algorithms to run, kept in canonical order without duplicates.
    pub algorithms: Vec<Algorithm>,
    /// Minimum worker count. The pool never has fewer threads than
    /// algorithms, so every task can start at once.
    pub workers: usize,
    /// Per-evaluation deadline; anything unfinished by then is reported as a
    /// failure.
    pub timeout: Option<Duration>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        EvaluatorConfig {
            algorithms: Algorithm::ALL.to_vec(),
            workers: available.max(Algorithm::ALL.len()),
            timeout: None,
        }
    }
}

impl EvaluatorConfig {
    pub fn with_algorithms<I: IntoIterator<Item = Algorithm>>(mut self, algorithms: I) -> Self {
        let mut algorithms: Vec<Algorithm> = algorithms.into_iter().collect();
        algorithms.sort();
        algorithms.dedup();
        self.algorithms = algorithms;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn pool_size(&self) -> usize {
        self.workers.max(self.algorithms.len()).max(1)
    }
}

/// Results of one evaluation together with the order they are ranked by.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// One entry per configured algorithm, in canonical order.
    pub results: Vec<SearchResult>,
    pub order: PriorityOrder,
}

impl Evaluation {
    /// The winning result under the current order.
    pub fn best(&self) -> Result<&SearchResult> {
        select_best(&self.results, &self.order)
    }

    /// Switches to a new priority order without rerunning anything.
    pub fn rerank(&mut self, order: PriorityOrder) -> Result<&SearchResult> {
        self.order = order;
        self.best()
    }

    pub fn result(&self, algorithm: Algorithm) -> Option<&SearchResult> {
        self.results.iter().find(|r| r.algorithm == algorithm)
    }

    pub fn successes(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }
}

/// Picks the successful result that sorts first under `order`. Results that
/// tie on every criterion fall back to canonical algorithm order.
pub fn select_best<'a>(results: &'a [SearchResult], order: &PriorityOrder) -> Result<&'a SearchResult> {
    results
        .iter()
        .filter(|r| r.success)
        .min_by(|a, b| {
            order
                .compare(a, b)
                .then_with(|| a.algorithm.cmp(&b.algorithm))
        })
        .ok_or(EngineError::NoPathFound)
}

pub struct Evaluator {
    config: EvaluatorConfig,
    pool: ThreadPool,
    cancel: Option<Arc<AtomicBool>>,
}

impl Evaluator {
    pub fn new(config: EvaluatorConfig) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.pool_size())
            .thread_name(|i| format!("search-worker-{i}"))
            .build()?;
        Ok(Evaluator {
            config,
            pool,
            cancel: None,
        })
    }

    /// Attaches a flag that aborts the evaluation once set. Tasks already
    /// running are told to stop and their results are dropped.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Runs every configured algorithm between the grid's own endpoints and
    /// ranks the outcome.
    pub fn evaluate(&self, grid: &Grid, order: PriorityOrder) -> Result<Evaluation> {
        let results = self.evaluate_all(grid, grid.start(), grid.goal())?;
        let evaluation = Evaluation { results, order };
        match evaluation.best() {
            Ok(best) => info!(
                best = best.algorithm.name(),
                cost = best.cost,
                explored = best.explored_nodes,
                %order,
                "evaluation complete"
            ),
            Err(_) => info!(%order, "evaluation complete, no algorithm reached the goal"),
        }
        Ok(evaluation)
    }

    /// Runs every configured algorithm from `start` to `goal`, each on its
    /// own clone of `grid`. The output is in canonical algorithm order.
    pub fn evaluate_all(&self, grid: &Grid, start: Position, goal: Position) -> Result<Vec<SearchResult>> {
        validate_endpoints(grid, start, goal)?;
        info!(
            rows = grid.rows(),
            cols = grid.cols(),
            %start,
            %goal,
            algorithms = self.config.algorithms.len(),
            "evaluating"
        );

        let jobs = self
            .config
            .algorithms
            .iter()
            .map(|&algorithm| {
                let snapshot = grid.clone();
                let job: Job = Box::new(move |stop: &AtomicBool| {
                    algorithm.run_until(&snapshot, start, goal, stop)
                });
                (algorithm, job)
            })
            .collect();
        self.collect(jobs)
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn collect(&self, jobs: Vec<(Algorithm, Job)>) -> Result<Vec<SearchResult>> {
        let expected: Vec<Algorithm> = jobs.iter().map(|(algorithm, _)| *algorithm).collect();
        let deadline = self.config.timeout.map(|timeout| Instant::now() + timeout);
        let (tx, rx) = mpsc::channel();
        let stop = StopOnDrop(Arc::new(AtomicBool::new(false)));

        for (algorithm, job) in jobs {
            if self.cancelled() {
                warn!(algorithm = algorithm.name(), "cancelled before dispatch");
                return Err(EngineError::Cancelled);
            }
            let tx = tx.clone();
            let stop = Arc::clone(&stop.0);
            self.pool.spawn(move || {
                let started = Instant::now();
                let result = run_isolated(algorithm, || job(stop.as_ref()))
                    .unwrap_or_else(|fault| {
                        let reason = fault.to_string();
                        warn!(%reason, "algorithm faulted");
                        SearchResult::faulted(algorithm, reason, started.elapsed())
                    });
                // The receiver is gone if the evaluation timed out or was cancelled.
                let _ = tx.send(result);
            });
            debug!(algorithm = algorithm.name(), "dispatched");
        }
        drop(tx);

        let mut results: Vec<SearchResult> = Vec::with_capacity(expected.len());
        let mut timed_out = false;
        while results.len() < expected.len() {
            if self.cancelled() {
                warn!(finished = results.len(), "cancelled while waiting for results");
                return Err(EngineError::Cancelled);
            }
            let wait = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        timed_out = true;
                        break;
                    }
                    (deadline - now).min(POLL_INTERVAL)
                }
                None => POLL_INTERVAL,
            };
            match rx.recv_timeout(wait) {
                Ok(result) => results.push(result),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        for &algorithm in &expected {
            if results.iter().any(|r| r.algorithm == algorithm) {
                continue;
            }
            let (reason, duration) = match (timed_out, self.config.timeout) {
                (true, Some(timeout)) => (format!("timed out after {timeout:?}"), timeout),
                _ => ("worker exited without reporting".to_string(), Duration::ZERO),
            };
            warn!(algorithm = algorithm.name(), %reason, "no result");
            let fault = EngineError::AlgorithmFault { algorithm, reason };
            results.push(SearchResult::faulted(algorithm, fault.to_string(), duration));
        }

        results.sort_by_key(|r| r.algorithm);
        Ok(results)
    }
}

fn validate_endpoints(grid: &Grid, start: Position, goal: Position) -> Result<()> {
    for pos in [start, goal] {
        if !grid.in_bounds(pos) {
            return Err(EngineError::OutOfBounds {
                position: pos,
                rows: grid.rows(),
                cols: grid.cols(),
            });
        }
    }
    let reason = if start == goal {
        Some("start and goal coincide")
    } else if !grid.is_walkable(start) || !grid.is_walkable(goal) {
        Some("endpoint is an obstacle")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(EngineError::InvalidEndpoints { start, goal, reason }),
        None => Ok(()),
    }
}

/// Runs `job`, turning a panic into an [`EngineError::AlgorithmFault`].
pub(crate) fn run_isolated<F>(algorithm: Algorithm, job: F) -> Result<SearchResult>
where
    F: FnOnce() -> SearchResult,
{
    panic::catch_unwind(AssertUnwindSafe(job)).map_err(|payload| EngineError::AlgorithmFault {
        algorithm,
        reason: panic_message(payload.as_ref()),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSetup;
    use crate::priority::Criterion;

    fn open_grid() -> Grid {
        Grid::build(5, 5, &GridSetup::new(Position::new(0, 0), Position::new(4, 4))).unwrap()
    }

    fn evaluator() -> Evaluator {
        Evaluator::new(EvaluatorConfig::default()).unwrap()
    }

    fn fake(algorithm: Algorithm, cost: u64, nodes: usize, millis: u64) -> SearchResult {
        SearchResult {
            algorithm,
            path: vec![Position::new(0, 0)],
            cost,
            explored_nodes: nodes,
            duration: Duration::from_millis(millis),
            success: true,
            visited_order: Vec::new(),
            fault: None,
        }
    }

    #[test]
    fn results_come_back_in_canonical_order() {
        let results = evaluator()
            .evaluate_all(&open_grid(), Position::new(0, 0), Position::new(4, 4))
            .unwrap();
        let order: Vec<Algorithm> = results.iter().map(|r| r.algorithm).collect();
        assert_eq!(order, Algorithm::ALL.to_vec());
        assert!(results.iter().all(|r| r.success));
    }

    #[test]
    fn config_subset_runs_only_those_algorithms() {
        let config = EvaluatorConfig::default()
            .with_algorithms([Algorithm::AStar, Algorithm::Bfs, Algorithm::AStar])
            .with_workers(1);
        assert_eq!(config.algorithms, vec![Algorithm::Bfs, Algorithm::AStar]);
        assert_eq!(config.pool_size(), 2);

        let evaluation = Evaluator::new(config)
            .unwrap()
            .evaluate(&open_grid(), PriorityOrder::DEFAULT)
            .unwrap();
        assert_eq!(evaluation.results.len(), 2);
        assert!(evaluation.result(Algorithm::Dfs).is_none());
        assert_eq!(evaluation.successes(), 2);
    }

    #[test]
    fn rejects_bad_endpoints() {
        let grid = Grid::build(
            3,
            3,
            &GridSetup::new(Position::new(0, 0), Position::new(2, 2))
                .with_obstacles([Position::new(1, 1)]),
        )
        .unwrap();
        let evaluator = evaluator();
        assert!(matches!(
            evaluator.evaluate_all(&grid, Position::new(0, 0), Position::new(3, 0)),
            Err(EngineError::OutOfBounds { .. })
        ));
        assert!(matches!(
            evaluator.evaluate_all(&grid, Position::new(1, 1), Position::new(2, 2)),
            Err(EngineError::InvalidEndpoints { .. })
        ));
        assert!(matches!(
            evaluator.evaluate_all(&grid, Position::new(2, 2), Position::new(2, 2)),
            Err(EngineError::InvalidEndpoints { .. })
        ));
    }

    #[test]
    fn panicking_algorithm_does_not_take_down_siblings() {
        let evaluator = evaluator();
        let snapshot = open_grid();
        let panicking: Job =
            Box::new(|_: &AtomicBool| -> SearchResult { panic!("frontier corrupted") });
        let healthy: Job = Box::new(move |_: &AtomicBool| {
            Algorithm::Bfs.run(&snapshot, snapshot.start(), snapshot.goal())
        });
        let jobs = vec![(Algorithm::Dfs, panicking), (Algorithm::Bfs, healthy)];

        let results = evaluator.collect(jobs).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].algorithm, Algorithm::Bfs);
        assert!(results[0].success);

        let faulted = &results[1];
        assert_eq!(faulted.algorithm, Algorithm::Dfs);
        assert!(!faulted.success);
        assert!(faulted.path.is_empty());
        assert_eq!(faulted.cost, 0);
        assert!(faulted.fault.as_deref().unwrap().contains("frontier corrupted"));
    }

    #[test]
    fn slow_algorithms_time_out() {
        let config = EvaluatorConfig::default().with_timeout(Duration::from_millis(50));
        let evaluator = Evaluator::new(config).unwrap();
        let observed = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&observed);
        let slow: Job = Box::new(move |stop: &AtomicBool| {
            let started = Instant::now();
            while !stop.load(Ordering::Relaxed) && started.elapsed() < Duration::from_secs(2) {
                std::thread::sleep(Duration::from_millis(5));
            }
            seen.store(stop.load(Ordering::Relaxed), Ordering::Relaxed);
            fake(Algorithm::IdaStar, 1, 1, 0)
        });
        let quick: Job = Box::new(|_: &AtomicBool| fake(Algorithm::AStar, 8, 9, 1));
        let jobs = vec![(Algorithm::IdaStar, slow), (Algorithm::AStar, quick)];

        let results = evaluator.collect(jobs).unwrap();
        assert!(results[0].success);
        assert_eq!(results[1].algorithm, Algorithm::IdaStar);
        assert!(!results[1].success);
        assert!(results[1].fault.as_deref().unwrap().contains("timed out"));

        // The abandoned task is told to stop instead of sleeping out its two seconds.
        let waiting = Instant::now();
        while !observed.load(Ordering::Relaxed) && waiting.elapsed() < Duration::from_secs(1) {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(observed.load(Ordering::Relaxed));
    }

    #[test]
    fn repeated_timeouts_leave_workers_free_for_later_evaluations() {
        let config = EvaluatorConfig::default()
            .with_workers(7)
            .with_timeout(Duration::from_millis(200));
        let evaluator = Evaluator::new(config).unwrap();
        let grid = Grid::random_grid(28, 28, 0.2, 0.3, 1).unwrap();

        for round in 0..8 {
            let evaluation = evaluator.evaluate(&grid, PriorityOrder::DEFAULT).unwrap();
            let bfs = evaluation.result(Algorithm::Bfs).unwrap();
            assert!(bfs.success, "round {round}: {:?}", bfs.fault);
            assert!(bfs.fault.is_none());
        }
    }

    #[test]
    fn cancel_flag_aborts_the_evaluation() {
        let cancel = Arc::new(AtomicBool::new(true));
        let evaluator = evaluator().with_cancel(cancel.clone());
        assert_eq!(
            evaluator.evaluate(&open_grid(), PriorityOrder::DEFAULT).unwrap_err(),
            EngineError::Cancelled
        );

        cancel.store(false, Ordering::Relaxed);
        assert!(evaluator.evaluate(&open_grid(), PriorityOrder::DEFAULT).is_ok());
    }

    #[test]
    fn select_best_skips_failures_and_breaks_full_ties_canonically() {
        let mut failed = fake(Algorithm::Bfs, 0, 0, 0);
        failed.success = false;
        let results = vec![
            failed,
            fake(Algorithm::UniformCost, 8, 20, 3),
            fake(Algorithm::AStar, 8, 20, 3),
        ];

        let best = select_best(&results, &PriorityOrder::DEFAULT).unwrap();
        assert_eq!(best.algorithm, Algorithm::UniformCost);
        // Asking again gives the same answer.
        assert_eq!(select_best(&results, &PriorityOrder::DEFAULT).unwrap(), best);
    }

    #[test]
    fn select_best_without_successes_is_no_path() {
        let mut failed = fake(Algorithm::Bfs, 0, 3, 0);
        failed.success = false;
        assert_eq!(
            select_best(&[failed], &PriorityOrder::DEFAULT),
            Err(EngineError::NoPathFound)
        );
        assert_eq!(select_best(&[], &PriorityOrder::DEFAULT), Err(EngineError::NoPathFound));
    }

    #[test]
    fn rerank_changes_winner_without_rerunning() {
        let mut evaluation = Evaluation {
            results: vec![
                fake(Algorithm::UniformCost, 8, 25, 9),
                fake(Algorithm::GreedyBestFirst, 10, 12, 1),
            ],
            order: PriorityOrder::DEFAULT,
        };
        assert_eq!(evaluation.best().unwrap().algorithm, Algorithm::UniformCost);

        let time_first =
            PriorityOrder::with_order(&[Criterion::Duration, Criterion::Cost, Criterion::ExploredNodes])
                .unwrap();
        assert_eq!(
            evaluation.rerank(time_first).unwrap().algorithm,
            Algorithm::GreedyBestFirst
        );
        assert_eq!(evaluation.order, time_first);
    }

    #[test]
    fn isolated_run_reports_string_payloads() {
        let fault = run_isolated(Algorithm::Bfs, || panic!("{} went wrong", "something")).unwrap_err();
        assert_eq!(
            fault,
            EngineError::AlgorithmFault {
                algorithm: Algorithm::Bfs,
                reason: "something went wrong".to_string()
            }
        );
    }
}
