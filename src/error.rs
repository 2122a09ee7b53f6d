//! Error types for engine construction.
//!
//! Runtime anomalies inside a tick are not errors: out-of-bounds grid access
//! panics and empty cells are a normal terminal case for every traversal.

use thiserror::Error;

/// Rejected [`PuzzleConfig`](crate::config::PuzzleConfig) values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("board must be at least 1x1, got {width}x{height}")]
    EmptyBoard { width: usize, height: usize },
    #[error("delete count must be at least 2, got {0}")]
    DeleteCountTooSmall(usize),
    #[error("delete count {count} cannot fit on a {width}x{height} board")]
    DeleteCountTooLarge {
        count: usize,
        width: usize,
        height: usize,
    },
    #[error("palette size must be within 2..=6, got {0}")]
    PaletteSize(usize),
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f32 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PuzzleError {
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("layout is {found_width}x{found_height}, board is {width}x{height}")]
    LayoutSize {
        width: usize,
        height: usize,
        found_width: usize,
        found_height: usize,
    },
    #[error("unknown piece colour {0:?} in layout")]
    UnknownColor(char),
}
