//! App: terminal init, main loop, tick and input handling.

use crate::input::{Action, PointerTracker, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, BoardGeometry};
use anyhow::Result;
use cascadetui::{Phase, PieceEvent, Puzzle, PuzzleConfig};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

pub struct App {
    config: PuzzleConfig,
    theme: Theme,
    puzzle: Puzzle,
    pointer: PointerTracker,
    /// Board placement from the last frame; None until drawn or while the terminal is too small.
    geometry: Option<BoardGeometry>,
    tick_interval: Duration,
}

impl App {
    pub fn new(config: PuzzleConfig, theme: Theme, tick_rate: f64) -> Result<Self> {
        let puzzle = Puzzle::new(config.clone())?;
        Ok(Self {
            config,
            theme,
            puzzle,
            pointer: PointerTracker::default(),
            geometry: None,
            tick_interval: Duration::from_secs_f64(1.0 / tick_rate.max(1.0)),
        })
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let mut terminal = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;
        terminal.show_cursor()?;

        let stats = self.puzzle.stats();
        info!(cleared = stats.cleared, batches = stats.batches, cascades = stats.cascades, "session over");
        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let mut last_tick = Instant::now();
        loop {
            terminal.draw(|f| {
                self.geometry = ui::draw(f, &self.puzzle, &self.theme);
            })?;

            let timeout = self.tick_interval.saturating_sub(last_tick.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            if !self.apply_action(key_to_action(key))? {
                                self.puzzle.end();
                                return Ok(());
                            }
                        }
                        Event::Mouse(mouse) => self.pointer.handle(mouse),
                        _ => {}
                    }
                }
            }

            if last_tick.elapsed() >= self.tick_interval {
                last_tick = Instant::now();
                self.tick();
            }
        }
    }

    /// Returns false to quit.
    fn apply_action(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::Quit => return Ok(false),
            Action::Pause => {
                if self.puzzle.phase() == Phase::None {
                    self.puzzle.resume();
                } else {
                    self.puzzle.suspend();
                }
            }
            Action::Restart => {
                debug!("restart");
                self.puzzle = Puzzle::new(self.config.clone())?;
                self.pointer.reset();
            }
            Action::None => {}
        }
        Ok(true)
    }

    fn tick(&mut self) {
        let input = self.pointer.sample(self.geometry.as_ref());
        self.puzzle.tick(&input, self.tick_interval);
        for event in self.puzzle.take_events() {
            present(&event);
        }
    }
}

/// Every redraw reads piece state straight from the grid, so events only feed the log.
fn present(event: &PieceEvent) {
    trace!(id = event.id().0, ?event, "piece");
}
