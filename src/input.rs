//! Key bindings and mouse sampling.

use crate::ui::BoardGeometry;
use cascadetui::{Point, TickInput};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use std::collections::VecDeque;

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Pause,
    Restart,
    Quit,
    None,
}

/// Map key event to an app action. Supports plain and Ctrl-modified keys.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    match code {
        KeyCode::Char('c') if modifiers == KeyModifiers::CONTROL => Action::Quit,
        KeyCode::Char('q') | KeyCode::Esc if no_mod => Action::Quit,
        KeyCode::Char('p') | KeyCode::Char(' ') if no_mod => Action::Pause,
        KeyCode::Char('r') if no_mod => Action::Restart,
        _ => Action::None,
    }
}

/// Where the pointer is reported before it has ever been over a drawn board.
const OFF_BOARD: Point = Point::new(-1000.0, -1000.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Press,
    Release,
}

/// Collects left-button mouse events between ticks and turns them into one
/// [`TickInput`] per tick.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    /// Last terminal cell the pointer was seen at.
    cell: Option<(u16, u16)>,
    /// Last world point reported while a board was on screen.
    point: Point,
    /// Button edges in arrival order, one delivered per tick.
    edges: VecDeque<Edge>,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self {
            cell: None,
            point: OFF_BOARD,
            edges: VecDeque::new(),
        }
    }
}

impl PointerTracker {
    pub fn handle(&mut self, ev: MouseEvent) {
        match ev.kind {
            MouseEventKind::Down(MouseButton::Left) => self.edges.push_back(Edge::Press),
            MouseEventKind::Up(MouseButton::Left) => self.edges.push_back(Edge::Release),
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {}
            _ => return,
        }
        self.cell = Some((ev.column, ev.row));
    }

    /// Sample for one tick. Edges that pile up within a tick are replayed in
    /// order over the following ticks. Without a board on screen the last
    /// known point is repeated.
    pub fn sample(&mut self, geometry: Option<&BoardGeometry>) -> TickInput {
        if let (Some((col, row)), Some(g)) = (self.cell, geometry) {
            self.point = g.to_world(col, row);
        }
        let edge = self.edges.pop_front();
        TickInput {
            pointer_down: edge == Some(Edge::Press),
            pointer_up: edge == Some(Edge::Release),
            point: self.point,
        }
    }

    /// Forget pending presses, e.g. after a restart.
    pub fn reset(&mut self) {
        self.edges.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_key_bindings() {
        let key = |code| KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press);
        assert_eq!(key_to_action(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::Esc)), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::Char('p'))), Action::Pause);
        assert_eq!(key_to_action(key(KeyCode::Char('r'))), Action::Restart);
        assert_eq!(key_to_action(key(KeyCode::Char('x'))), Action::None);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ctrl_c), Action::Quit);
    }

    #[test]
    fn test_press_and_release_in_one_tick_are_split() {
        let mut tracker = PointerTracker::default();
        tracker.handle(mouse(MouseEventKind::Down(MouseButton::Left), 3, 3));
        tracker.handle(mouse(MouseEventKind::Up(MouseButton::Left), 3, 3));
        let first = tracker.sample(None);
        assert!(first.pointer_down && !first.pointer_up);
        let second = tracker.sample(None);
        assert!(!second.pointer_down && second.pointer_up);
        let third = tracker.sample(None);
        assert!(!third.pointer_down && !third.pointer_up);
    }

    #[test]
    fn test_other_buttons_are_ignored() {
        let mut tracker = PointerTracker::default();
        tracker.handle(mouse(MouseEventKind::Down(MouseButton::Right), 1, 1));
        let input = tracker.sample(None);
        assert!(!input.pointer_down);
        assert_eq!(tracker.cell, None);
    }

    #[test]
    fn test_release_then_press_in_one_tick_keep_their_order() {
        let mut tracker = PointerTracker::default();
        tracker.handle(mouse(MouseEventKind::Up(MouseButton::Left), 3, 3));
        tracker.handle(mouse(MouseEventKind::Down(MouseButton::Left), 3, 3));
        let first = tracker.sample(None);
        assert!(!first.pointer_down && first.pointer_up);
        let second = tracker.sample(None);
        assert!(second.pointer_down && !second.pointer_up);
    }

    #[test]
    fn test_pointer_off_board_without_geometry() {
        let mut tracker = PointerTracker::default();
        tracker.handle(mouse(MouseEventKind::Moved, 10, 10));
        let input = tracker.sample(None);
        assert_eq!(input.point, OFF_BOARD);
    }

    #[test]
    fn test_last_point_kept_while_board_is_hidden() {
        let geometry = BoardGeometry::new(ratatui::layout::Rect::new(10, 5, 24, 12), 5, 1.05);
        let mut tracker = PointerTracker::default();
        tracker.handle(mouse(MouseEventKind::Drag(MouseButton::Left), 11, 15));
        let shown = tracker.sample(Some(&geometry));
        assert_eq!(shown.point, geometry.to_world(11, 15));

        tracker.handle(mouse(MouseEventKind::Drag(MouseButton::Left), 2, 2));
        let hidden = tracker.sample(None);
        assert_eq!(hidden.point, shown.point);
        assert!(hidden.point.x.is_finite() && hidden.point.y.is_finite());
    }
}
