//! Cascadetui: drag-to-swap match-3 puzzle in the terminal.

mod app;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use cascadetui::{PuzzleConfig, RecheckPolicy};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::{fmt, prelude::*};

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path, args.verbose)?;
    }
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let config = args.puzzle_config();
    config.validate()?;
    let mut app = App::new(config, theme, args.tick_rate)?;
    app.run()?;
    Ok(())
}

/// Log to a file; the terminal belongs to the board. `RUST_LOG` overrides `-v`.
fn init_logging(path: &Path, verbose: u8) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    let level = match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(filter)
        .init();
    Ok(())
}

/// Drag-to-swap match-3 puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "cascadetui",
    version,
    about = "Drag-to-swap match-3 puzzle in the terminal. Line up three of a colour to clear them; the rest falls and may chain.",
    long_about = "Cascadetui is a terminal match-3 puzzle.\n\n\
        Press a piece with the left mouse button and drag it across the board: every piece it \
        passes over swaps into the cell it just left. Release to settle the board. Runs of three \
        or more of one colour, horizontally or vertically, are cleared; pieces above fall and new \
        ones drop in, which can chain into further clears.\n\n\
        CONTROLS:\n  Mouse drag  Move a piece   Drag above the board  Cancel\n  P / Space   Pause          R  Restart            Q / Esc  Quit\n\n\
        Use --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Board width in cells.
    #[arg(long, default_value = "6", value_name = "COLS")]
    pub width: usize,

    /// Board height in cells.
    #[arg(long, default_value = "5", value_name = "ROWS")]
    pub height: usize,

    /// Shortest run of one colour that clears.
    #[arg(long, default_value = "3", value_name = "N")]
    pub delete_count: usize,

    /// Pause between deletion batches, in ms.
    #[arg(long, default_value = "500", value_name = "MS")]
    pub delete_time_ms: u64,

    /// Number of piece colours in play (2..=6).
    #[arg(long, default_value = "6", value_name = "N")]
    pub colors: usize,

    /// Starting speed of falling pieces, in world units per tick (grows by one each tick).
    #[arg(long, default_value = "1.0", value_name = "SPEED")]
    pub fall_speed: f32,

    /// Speed of pieces displaced by a drag.
    #[arg(long, default_value = "5.0", value_name = "SPEED")]
    pub swap_speed: f32,

    /// Speed of the released piece returning to its cell.
    #[arg(long, default_value = "10.0", value_name = "SPEED")]
    pub release_speed: f32,

    /// Seed for piece colours; random if not set.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Which cells are rechecked first after a move.
    #[arg(long, default_value = "route-first")]
    pub recheck: Recheck,

    /// Game ticks per second.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub tick_rate: f64,

    /// Write logs to this file (off when not set).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log verbosity: -v debug, -vv trace.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    fn puzzle_config(&self) -> PuzzleConfig {
        PuzzleConfig {
            width: self.width,
            height: self.height,
            delete_count: self.delete_count,
            delete_time: Duration::from_millis(self.delete_time_ms),
            init_move_speed: self.fall_speed,
            normal_move_speed: self.swap_speed,
            release_move_speed: self.release_speed,
            palette_size: self.colors,
            seed: self.seed,
            recheck: self.recheck.into(),
            ..PuzzleConfig::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Recheck {
    /// Swapped cells first, then the whole board.
    #[default]
    RouteFirst,
    /// Always scan the whole board.
    BoardOnly,
}

impl From<Recheck> for RecheckPolicy {
    fn from(r: Recheck) -> Self {
        match r {
            Recheck::RouteFirst => Self::RouteFirst,
            Recheck::BoardOnly => Self::BoardOnly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_puzzle_config() {
        let args = Args::parse_from(["cascadetui"]);
        assert_eq!(args.puzzle_config(), PuzzleConfig::default());
    }

    #[test]
    fn test_flags_reach_puzzle_config() {
        let args = Args::parse_from([
            "cascadetui",
            "--width",
            "8",
            "--delete-count",
            "4",
            "--delete-time-ms",
            "250",
            "--seed",
            "9",
            "--recheck",
            "board-only",
            "-vv",
        ]);
        let config = args.puzzle_config();
        assert_eq!(config.width, 8);
        assert_eq!(config.delete_count, 4);
        assert_eq!(config.delete_time, Duration::from_millis(250));
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.recheck, RecheckPolicy::BoardOnly);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_palette_aliases() {
        let args = Args::parse_from(["cascadetui", "--palette", "colourblind"]);
        assert_eq!(args.palette, Palette::Colorblind);
    }
}
