//! Fixed, named grid layouts.

use crate::error::{EngineError, Result};
use crate::grid::{Grid, GridSetup, Position};

/// Names accepted by [`preset`], in display order.
pub const PRESET_NAMES: [&str; 5] = ["5x5", "10x10", "15x15", "Maze", "Weighted"];

pub fn preset_names() -> &'static [&'static str] {
    &PRESET_NAMES
}

/// Builds a fresh copy of the named layout. Names match case-insensitively.
pub fn preset(name: &str) -> Result<Grid> {
    let p = Position::new;
    let (rows, cols, setup) = match name.trim().to_ascii_lowercase().as_str() {
        "5x5" => (
            5,
            5,
            GridSetup::new(p(0, 0), p(4, 4)).with_obstacles([p(1, 1), p(1, 2), p(2, 1)]),
        ),
        "10x10" => (
            10,
            10,
            GridSetup::new(p(0, 0), p(9, 9)).with_obstacles([
                p(3, 3),
                p(3, 4),
                p(3, 5),
                p(4, 5),
                p(5, 5),
                p(6, 5),
                p(7, 5),
            ]),
        ),
        "15x15" => (
            15,
            15,
            // A horizontal wall crossed by a vertical one.
            GridSetup::new(p(0, 0), p(14, 14))
                .with_obstacles((1..14).map(|col| p(5, col)))
                .with_obstacles((3..12).map(|row| p(row, 7))),
        ),
        "maze" => (
            10,
            10,
            GridSetup::new(p(0, 0), p(9, 9))
                .with_obstacles((1..9).map(|col| p(1, col)))
                .with_obstacles((2..9).map(|row| p(row, 1)))
                .with_obstacles((2..9).map(|col| p(8, col)))
                .with_obstacles((2..9).map(|row| p(row, 8))),
        ),
        "weighted" => (
            8,
            8,
            GridSetup::new(p(0, 0), p(7, 7))
                .with_obstacles([p(3, 3), p(3, 4), p(4, 3)])
                .with_weights([
                    (p(1, 1), 3),
                    (p(2, 2), 3),
                    (p(2, 5), 4),
                    (p(5, 2), 2),
                    (p(6, 6), 5),
                ]),
        ),
        _ => return Err(EngineError::UnknownPreset(name.to_string())),
    };
    Grid::build(rows, cols, &setup)
}
