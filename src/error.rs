use crate::algorithms::Algorithm;
use crate::grid::{CellKind, Position};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Everything the engine can refuse to do.
///
/// Construction errors abort the requested operation. `AlgorithmFault` is
/// never returned from an evaluation; it only describes why a single
/// algorithm's result was marked as failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid grid dimensions {rows}x{cols}: rows and cols must both be at least 1")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("invalid endpoints start={start} goal={goal}: {reason}")]
    InvalidEndpoints {
        start: Position,
        goal: Position,
        reason: &'static str,
    },

    #[error("position {position} is outside the {rows}x{cols} grid")]
    OutOfBounds {
        position: Position,
        rows: usize,
        cols: usize,
    },

    #[error("cell {position} is locked ({kind:?})")]
    LockedCell { position: Position, kind: CellKind },

    #[error("invalid weight {weight} at {position}: weights must be at least 1")]
    InvalidWeight { position: Position, weight: u32 },

    #[error("invalid {name} {value}: must lie in [0, 1)")]
    InvalidRatio { name: &'static str, value: f64 },

    #[error("invalid priority order: {reason}")]
    InvalidPriorityOrder { reason: String },

    #[error("unknown preset '{0}'")]
    UnknownPreset(String),

    #[error("no algorithm found a path")]
    NoPathFound,

    #[error("{algorithm} faulted: {reason}")]
    AlgorithmFault { algorithm: Algorithm, reason: String },

    #[error("evaluation cancelled")]
    Cancelled,

    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),
}

impl From<rayon::ThreadPoolBuildError> for EngineError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        EngineError::WorkerPool(err.to_string())
    }
}
