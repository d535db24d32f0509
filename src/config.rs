use crate::algorithms::Algorithm;
use crate::error::Result;
use crate::evaluator::EvaluatorConfig;
use crate::grid::Grid;
use crate::presets::preset;
use crate::priority::PriorityOrder;
use clap::Parser;
use std::time::Duration;
use tracing::info;

/// Runs every search algorithm on one grid and compares them.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Named layout to use instead of a random grid (see --list-presets)
    #[arg(long)]
    pub preset: Option<String>,

    #[arg(long, default_value_t = 10)]
    pub rows: usize,

    #[arg(long, default_value_t = 10)]
    pub cols: usize,

    /// Share of cells turned into obstacles, in [0, 1)
    #[arg(long, default_value_t = 0.2)]
    pub obstacle_ratio: f64,

    /// Share of cells given a weight above 1, in [0, 1)
    #[arg(long, default_value_t = 0.1)]
    pub weighted_ratio: f64,

    /// Seed for the random grid; a fresh one is drawn when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Ranking criteria, most important first
    #[arg(long, default_value = "cost,nodes,time")]
    pub priority: PriorityOrder,

    /// Comma-separated subset of algorithms to run
    #[arg(long, value_delimiter = ',')]
    pub algorithms: Vec<Algorithm>,

    /// Give up on algorithms still running after this many milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    #[arg(long)]
    pub workers: Option<usize>,

    #[arg(long, default_value_t = false)]
    pub show_grid: bool,

    #[arg(long, default_value_t = false)]
    pub list_presets: bool,

    /// Only print the best result
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

impl Config {
    /// The preset named by `--preset`, or a random grid from the size, ratio
    /// and seed options.
    pub fn build_grid(&self) -> Result<Grid> {
        if let Some(name) = &self.preset {
            return preset(name);
        }
        let seed = self.seed.unwrap_or_else(rand::random);
        info!(seed, rows = self.rows, cols = self.cols, "generating random grid");
        Grid::random_grid(
            self.rows,
            self.cols,
            self.obstacle_ratio,
            self.weighted_ratio,
            seed,
        )
    }

    pub fn evaluator_config(&self) -> EvaluatorConfig {
        let mut config = EvaluatorConfig::default();
        if !self.algorithms.is_empty() {
            config = config.with_algorithms(self.algorithms.iter().copied());
        }
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if let Some(ms) = self.timeout_ms {
            config = config.with_timeout(Duration::from_millis(ms));
        }
        config
    }
}
