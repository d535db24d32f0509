//! Runs a family of grid search algorithms side by side on the same weighted
//! grid and picks a winner under a configurable ranking.
//!
//! ```
//! use pathfinding_compare::{preset, Evaluator, EvaluatorConfig, PriorityOrder};
//!
//! let grid = preset("5x5").unwrap();
//! let evaluator = Evaluator::new(EvaluatorConfig::default()).unwrap();
//! let evaluation = evaluator.evaluate(&grid, PriorityOrder::DEFAULT).unwrap();
//! assert_eq!(evaluation.results.len(), 7);
//! assert_eq!(evaluation.best().unwrap().cost, 8);
//! ```

pub mod algorithms;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod grid;
pub mod presets;
pub mod priority;
pub mod report;
pub mod weights;

pub use algorithms::{Algorithm, SearchResult};
pub use error::{EngineError, Result};
pub use evaluator::{select_best, Evaluation, Evaluator, EvaluatorConfig};
pub use grid::{Cell, CellKind, Grid, GridSetup, Position, StepCost};
pub use presets::{preset, preset_names};
pub use priority::{Criterion, PriorityOrder};
pub use report::ComparisonReport;
