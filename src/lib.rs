//! Cascadetui engine: the match-cascade core of a drag-to-swap match-3 puzzle.
//!
//! One [`Puzzle::tick`] per frame runs the phase machine
//! (select → move → judge → clear → drop → judge …) and then advances every
//! animating piece once. Rendering and input live outside: the host feeds a
//! [`TickInput`] in world coordinates and drains [`PieceEvent`]s.
//!
//! ```
//! use cascadetui::{Phase, Puzzle, PuzzleConfig, TickInput, Point};
//! use std::time::Duration;
//!
//! let mut puzzle = Puzzle::new(PuzzleConfig { seed: Some(1), ..PuzzleConfig::default() })?;
//! assert!(puzzle.find_all_matches().is_none());
//! let phase = puzzle.tick(&TickInput::hover(Point::new(0.0, 0.0)), Duration::from_millis(16));
//! assert_eq!(phase, Phase::Select);
//! # Ok::<(), cascadetui::PuzzleError>(())
//! ```

pub mod board;
pub mod cascade;
pub mod config;
pub mod error;
pub mod event;
pub mod grid;
pub mod matcher;
pub mod piece;
pub mod puzzle;
pub mod selection;

pub use board::Board;
pub use config::{PuzzleConfig, RecheckPolicy};
pub use error::{ConfigError, PuzzleError};
pub use event::PieceEvent;
pub use grid::{Grid, Pos};
pub use matcher::{MatchDetector, MatchSet};
pub use piece::{Layer, Piece, PieceColor, PieceId, PieceState, Point};
pub use puzzle::{Phase, Puzzle, PuzzleStats};
pub use selection::{SelectionController, TickInput};
