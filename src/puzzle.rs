//! Puzzle: the phase machine sequencing selection, judging, deletion and cascades.

use crate::board::Board;
use crate::cascade::{self, Spawner};
use crate::config::{PuzzleConfig, RecheckPolicy};
use crate::error::PuzzleError;
use crate::event::PieceEvent;
use crate::grid::{Grid, Pos};
use crate::matcher::{MatchDetector, MatchSet};
use crate::piece::{PieceColor, Point};
use crate::selection::{SelectionController, TickInput};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Inert: ticks do no work.
    None,
    #[default]
    Select,
    Move,
    Judge,
    Death,
    Down,
    /// Inert: the puzzle is over.
    End,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "paused",
            Self::Select => "select",
            Self::Move => "move",
            Self::Judge => "judge",
            Self::Death => "clear",
            Self::Down => "drop",
            Self::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PuzzleStats {
    /// Pieces sent to `Clearing`.
    pub cleared: u64,
    /// Deletion batches.
    pub batches: u64,
    /// Judge passes after a drop that found new matches.
    pub cascades: u64,
    /// Boards generated before the first match-free one.
    pub board_attempts: u64,
}

#[derive(Debug, Clone)]
pub struct Puzzle {
    config: PuzzleConfig,
    board: Board,
    matcher: MatchDetector,
    selection: SelectionController,
    spawner: Spawner,
    phase: Phase,
    parked: Option<Phase>,
    death_timer: Duration,
    /// Set on entering Down, consumed by the next Judge.
    after_drop: bool,
    stats: PuzzleStats,
}

impl Puzzle {
    /// Random match-free board, every piece dropping in from above.
    pub fn new(config: PuzzleConfig) -> Result<Self, PuzzleError> {
        let mut puzzle = Self::empty(config)?;
        puzzle.generate_stable_board();
        Ok(puzzle)
    }

    /// Fixed board from colour letters (`R B G Y P H`, `.` empty), top row first.
    /// Pieces start idle in their cells; existing matches are kept.
    pub fn from_layout(config: PuzzleConfig, rows: &[&str]) -> Result<Self, PuzzleError> {
        let mut puzzle = Self::empty(config)?;
        let (width, height) = (puzzle.config.width, puzzle.config.height);
        let found_width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        if rows.len() != height || rows.iter().any(|r| r.chars().count() != width) {
            return Err(PuzzleError::LayoutSize {
                width,
                height,
                found_width,
                found_height: rows.len(),
            });
        }
        let pitch = puzzle.config.piece_pitch;
        for (row, line) in rows.iter().enumerate() {
            let y = height - 1 - row;
            for (x, c) in line.chars().enumerate() {
                if c == '.' {
                    continue;
                }
                let color = PieceColor::from_char(c).ok_or(PuzzleError::UnknownColor(c))?;
                let piece = puzzle
                    .spawner
                    .spawn_with(color, Pos::new(x, y), Point::of_cell(x, y, pitch));
                puzzle.board.place(piece);
            }
        }
        puzzle.stats.board_attempts = 1;
        Ok(puzzle)
    }

    fn empty(config: PuzzleConfig) -> Result<Self, PuzzleError> {
        config.validate()?;
        Ok(Self {
            board: Board::new(config.width, config.height, config.piece_pitch),
            matcher: MatchDetector::new(config.delete_count),
            selection: SelectionController::new(&config),
            spawner: Spawner::new(config.seed, config.palette_size),
            phase: Phase::Select,
            parked: None,
            death_timer: Duration::ZERO,
            after_drop: false,
            stats: PuzzleStats::default(),
            config,
        })
    }

    fn fill_board(&mut self) {
        let (width, height) = (self.config.width, self.config.height);
        let pitch = self.config.piece_pitch;
        for x in 0..width {
            for y in 0..height {
                let cell = Pos::new(x, y);
                let piece = self.spawner.spawn(cell, Point::of_cell(x, y + height, pitch));
                self.board.place(piece);
                self.board.move_piece(cell, self.config.init_move_speed);
            }
        }
    }

    /// Regenerates the whole board until no match exists.
    fn generate_stable_board(&mut self) {
        let mut attempts = 1u64;
        self.fill_board();
        while self.matcher.find_all_matches(self.board.grid()).is_some() {
            self.board.discard();
            attempts += 1;
            if attempts % 10_000 == 0 {
                warn!(attempts, "still looking for a match-free board");
            }
            self.fill_board();
        }
        self.stats.board_attempts = attempts;
        info!(
            width = self.config.width,
            height = self.config.height,
            attempts,
            "board ready"
        );
    }

    pub fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn grid(&self) -> &Grid {
        self.board.grid()
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn stats(&self) -> PuzzleStats {
        self.stats
    }

    /// Commands issued since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<PieceEvent> {
        self.board.take_events()
    }

    pub fn find_matches(&self, seed: Pos) -> MatchSet {
        self.matcher.find_matches(self.board.grid(), seed)
    }

    pub fn find_all_matches(&self) -> Option<MatchSet> {
        self.matcher.find_all_matches(self.board.grid())
    }

    /// Parks the machine in `None`; pieces keep animating.
    /// A held piece is released first and the board is judged on resume.
    pub fn suspend(&mut self) {
        if matches!(self.phase, Phase::None | Phase::End) {
            return;
        }
        let parked = if self.phase == Phase::Move {
            self.selection.release(&mut self.board);
            Phase::Judge
        } else {
            self.phase
        };
        self.parked = Some(parked);
        self.set_phase(Phase::None);
    }

    pub fn resume(&mut self) {
        if let Some(phase) = self.parked.take() {
            self.set_phase(phase);
        }
    }

    pub fn end(&mut self) {
        self.parked = None;
        self.set_phase(Phase::End);
    }

    /// Judges the board on the next tick without waiting for a move.
    pub fn request_judge(&mut self) {
        if self.phase == Phase::Select {
            self.set_phase(Phase::Judge);
        }
    }

    fn set_phase(&mut self, next: Phase) {
        if next != self.phase {
            debug!(from = ?self.phase, to = ?next, "phase");
            self.phase = next;
        }
    }

    /// Runs the current phase once, then advances every active piece.
    pub fn tick(&mut self, input: &TickInput, dt: Duration) -> Phase {
        let next = match self.phase {
            Phase::None | Phase::End => self.phase,
            Phase::Select => {
                if self.selection.select(&mut self.board, input) {
                    Phase::Move
                } else {
                    Phase::Select
                }
            }
            Phase::Move => {
                if self.selection.drag(&mut self.board, input) {
                    Phase::Judge
                } else {
                    Phase::Move
                }
            }
            Phase::Judge => self.judge(),
            Phase::Death => {
                if self.step_death(dt) {
                    self.drop_columns();
                    Phase::Down
                } else {
                    Phase::Death
                }
            }
            Phase::Down => {
                if self.board.is_settled() {
                    Phase::Judge
                } else {
                    Phase::Down
                }
            }
        };
        self.set_phase(next);
        self.board.update_pieces(dt.as_secs_f32(), input.point);
        self.phase
    }

    fn judge(&mut self) -> Phase {
        let after_drop = std::mem::take(&mut self.after_drop);
        if self.find_all_matches().is_some() {
            if after_drop {
                self.stats.cascades += 1;
            }
            Phase::Death
        } else {
            self.selection.clear_route();
            Phase::Select
        }
    }

    /// One Death tick. True once nothing is left to clear.
    fn step_death(&mut self, dt: Duration) -> bool {
        self.death_timer += dt;
        if self.death_timer <= self.config.delete_time {
            return false;
        }
        self.death_timer = Duration::ZERO;

        let routed = match self.config.recheck {
            RecheckPolicy::RouteFirst => self.selection.pop_route(),
            RecheckPolicy::BoardOnly => {
                self.selection.clear_route();
                None
            }
        };
        if let Some(pos) = routed {
            let found = self.find_matches(pos);
            if !self.clear_batch(&found, "route") {
                self.death_timer = self.config.delete_time;
            }
            return false;
        }

        match self.find_all_matches() {
            Some(found) => {
                if !self.clear_batch(&found, "board") {
                    self.death_timer = self.config.delete_time;
                }
                false
            }
            None if self.board.has_clearing() => {
                // Let the last batch finish before anything falls.
                self.death_timer = self.config.delete_time;
                false
            }
            None => true,
        }
    }

    /// Sends every matched piece to `Clearing`. False when nothing changed.
    fn clear_batch(&mut self, found: &MatchSet, source: &'static str) -> bool {
        let cleared = found
            .iter()
            .filter(|&&pos| self.board.clear_piece(pos))
            .count();
        if cleared == 0 {
            return false;
        }
        self.stats.cleared += cleared as u64;
        self.stats.batches += 1;
        debug!(cleared, source, batch = self.stats.batches, "clearing batch");
        true
    }

    fn drop_columns(&mut self) {
        let report = cascade::run(&mut self.board, &mut self.spawner, self.config.init_move_speed);
        debug!(survivors = report.survivors, spawned = report.spawned, "cascade");
        self.after_drop = true;
    }
}
