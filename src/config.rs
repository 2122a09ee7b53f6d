//! Engine configuration, fixed at construction.

use crate::error::ConfigError;
use std::time::Duration;

/// Where the Death phase looks for its next batch of matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecheckPolicy {
    /// Drain the swap route queue first, then fall back to a board scan.
    #[default]
    RouteFirst,
    /// Ignore the route queue and always scan the whole board.
    BoardOnly,
}

/// Board size and tuning constants for one [`Puzzle`](crate::Puzzle).
#[derive(Debug, Clone, PartialEq)]
pub struct PuzzleConfig {
    pub width: usize,
    pub height: usize,
    /// Minimum run length that clears.
    pub delete_count: usize,
    /// Pause between deletion batches.
    pub delete_time: Duration,
    /// Starting speed for spawn and gravity moves (world units per second).
    pub init_move_speed: f32,
    /// Starting speed of a piece displaced by a swap.
    pub normal_move_speed: f32,
    /// Starting speed of a released piece returning to its cell.
    pub release_move_speed: f32,
    /// Number of playable colours drawn from [`PieceColor::PLAYABLE`](crate::PieceColor::PLAYABLE).
    pub palette_size: usize,
    /// Distance between neighbouring cell centres in world units.
    pub piece_pitch: f32,
    /// RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub recheck: RecheckPolicy,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            width: 6,
            height: 5,
            delete_count: 3,
            delete_time: Duration::from_millis(500),
            init_move_speed: 1.0,
            normal_move_speed: 5.0,
            release_move_speed: 10.0,
            palette_size: 6,
            piece_pitch: 1.05,
            seed: None,
            recheck: RecheckPolicy::RouteFirst,
        }
    }
}

impl PuzzleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyBoard {
                width: self.width,
                height: self.height,
            });
        }
        if self.delete_count < 2 {
            return Err(ConfigError::DeleteCountTooSmall(self.delete_count));
        }
        if self.delete_count > self.width && self.delete_count > self.height {
            return Err(ConfigError::DeleteCountTooLarge {
                count: self.delete_count,
                width: self.width,
                height: self.height,
            });
        }
        if !(2..=6).contains(&self.palette_size) {
            return Err(ConfigError::PaletteSize(self.palette_size));
        }
        for (name, value) in [
            ("init_move_speed", self.init_move_speed),
            ("normal_move_speed", self.normal_move_speed),
            ("release_move_speed", self.release_move_speed),
            ("piece_pitch", self.piece_pitch),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        Ok(())
    }

    /// World-space height above which a held piece is released.
    pub fn top_boundary(&self) -> f32 {
        self.piece_pitch * self.height as f32
    }
}
