//! Board: the grid plus the active set and the command log.
//!
//! Every piece command goes through here so the active set and the
//! emitted [`PieceEvent`]s always agree with the piece states.

use crate::event::PieceEvent;
use crate::grid::{Grid, Pos};
use crate::piece::{Layer, Piece, PieceId, PieceState, Point};
use std::collections::BTreeSet;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct Board {
    grid: Grid,
    /// Pieces mid-animation (moving, selected or clearing).
    active: BTreeSet<PieceId>,
    events: Vec<PieceEvent>,
    pitch: f32,
}

impl Board {
    pub fn new(width: usize, height: usize, pitch: f32) -> Self {
        Self {
            grid: Grid::new(width, height),
            active: BTreeSet::new(),
            events: Vec::new(),
            pitch,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, id: PieceId) -> bool {
        self.active.contains(&id)
    }

    /// Nothing left animating.
    pub fn is_settled(&self) -> bool {
        self.active.is_empty()
    }

    pub fn has_clearing(&self) -> bool {
        self.grid
            .pieces()
            .any(|p| p.state() == PieceState::Clearing)
    }

    pub fn take_events(&mut self) -> Vec<PieceEvent> {
        std::mem::take(&mut self.events)
    }

    /// Puts a freshly spawned piece on the grid at its stored cell.
    pub fn place(&mut self, piece: Piece) {
        let (id, color, at, cell) = (piece.id(), piece.color(), piece.position(), piece.cell());
        self.events.push(PieceEvent::Spawned { id, at });
        self.events.push(PieceEvent::SetColor { id, color });
        let previous = self.grid.set(cell, Some(piece));
        debug_assert!(previous.is_none(), "spawned onto occupied cell {cell}");
    }

    /// Commands the piece at `pos` toward its cell at `speed`.
    pub fn move_piece(&mut self, pos: Pos, speed: f32) {
        let pitch = self.pitch;
        if let Some(piece) = self.grid.get_mut(pos) {
            piece.move_to(pos, speed, pitch);
            let id = piece.id();
            self.active.insert(id);
            self.events.push(PieceEvent::MoveTo { id, target: pos, speed });
        }
    }

    pub fn catch(&mut self, pos: Pos) -> Option<PieceId> {
        let piece = self.grid.get_mut(pos)?;
        piece.select();
        let id = piece.id();
        self.active.insert(id);
        self.events.push(PieceEvent::FollowPointer { id });
        self.events.push(PieceEvent::Layer { id, layer: Layer::Front });
        trace!(%pos, ?id, "caught");
        Some(id)
    }

    /// Sends a held piece back to its logical cell.
    pub fn release(&mut self, pos: Pos, speed: f32) {
        self.move_piece(pos, speed);
        if let Some(piece) = self.grid.get(pos) {
            let id = piece.id();
            self.events.push(PieceEvent::Layer { id, layer: Layer::Normal });
            trace!(%pos, ?id, "released");
        }
    }

    /// Starts the clear animation. False for empty or already clearing cells.
    pub fn clear_piece(&mut self, pos: Pos) -> bool {
        let Some(piece) = self.grid.get_mut(pos) else {
            return false;
        };
        if piece.state() == PieceState::Clearing {
            return false;
        }
        piece.clear();
        let id = piece.id();
        self.active.insert(id);
        self.events.push(PieceEvent::Clear { id });
        self.events.push(PieceEvent::Layer { id, layer: Layer::Back });
        true
    }

    pub fn swap(&mut self, a: Pos, b: Pos) {
        self.grid.swap(a, b);
        trace!(%a, %b, "swapped");
    }

    /// Cell of the first hittable piece under `point`. Selected and clearing pieces are skipped.
    pub fn hit_test(&self, point: Point) -> Option<Pos> {
        self.grid
            .pieces()
            .find(|p| {
                !matches!(p.state(), PieceState::Selected | PieceState::Clearing)
                    && p.contains(point)
            })
            .map(Piece::cell)
    }

    /// Advances every active piece once. Pieces back at `Idle` leave the active
    /// set; finished clears leave the grid. Returns the number removed.
    pub fn update_pieces(&mut self, dt: f32, pointer: Point) -> usize {
        let mut removed = Vec::new();
        for piece in self.grid.pieces_mut() {
            let id = piece.id();
            if !self.active.contains(&id) {
                continue;
            }
            piece.update(dt, pointer);
            if !piece.is_active() {
                self.active.remove(&id);
                if piece.is_cleared() {
                    removed.push(piece.cell());
                }
            }
        }
        for pos in &removed {
            if let Some(piece) = self.grid.take(*pos) {
                self.events.push(PieceEvent::Removed { id: piece.id() });
            }
        }
        removed.len()
    }

    /// Drops every piece, tracked id and pending event.
    pub fn discard(&mut self) {
        self.grid.clear();
        self.active.clear();
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::PieceColor;

    const DT: f32 = 1.0 / 60.0;

    fn board_with(cells: &[(usize, usize, u64)]) -> Board {
        let mut board = Board::new(3, 3, 1.0);
        for &(x, y, id) in cells {
            board.place(Piece::new(
                PieceId(id),
                PieceColor::Red,
                Pos::new(x, y),
                Point::of_cell(x, y, 1.0),
            ));
        }
        board.take_events();
        board
    }

    #[test]
    fn test_place_emits_spawn_and_colour() {
        let mut board = Board::new(2, 2, 1.0);
        let piece = Piece::new(PieceId(4), PieceColor::Blue, Pos::new(1, 0), Point::new(1.0, 3.0));
        board.place(piece);
        assert_eq!(
            board.take_events(),
            vec![
                PieceEvent::Spawned { id: PieceId(4), at: Point::new(1.0, 3.0) },
                PieceEvent::SetColor { id: PieceId(4), color: PieceColor::Blue },
            ]
        );
        assert!(board.is_settled());
    }

    #[test]
    fn test_move_tracks_until_arrival() {
        let mut board = board_with(&[(0, 2, 1)]);
        let piece = board.grid_mut().take(Pos::new(0, 2)).unwrap();
        board.grid_mut().set(Pos::new(0, 0), Some(piece));
        board.move_piece(Pos::new(0, 0), 1.0);
        assert!(board.is_active(PieceId(1)));
        for _ in 0..200 {
            board.update_pieces(DT, Point::default());
        }
        assert!(board.is_settled());
        assert_eq!(board.grid().get(Pos::new(0, 0)).unwrap().position(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_cleared_piece_leaves_grid() {
        let mut board = board_with(&[(1, 1, 9)]);
        assert!(board.clear_piece(Pos::new(1, 1)));
        assert!(!board.clear_piece(Pos::new(1, 1)));
        assert!(board.has_clearing());
        let mut removed = 0;
        for _ in 0..20 {
            removed += board.update_pieces(DT, Point::default());
        }
        assert_eq!(removed, 1);
        assert!(!board.grid().is_occupied(Pos::new(1, 1)));
        assert!(board.take_events().contains(&PieceEvent::Removed { id: PieceId(9) }));
    }

    #[test]
    fn test_hit_test_skips_selected_and_clearing() {
        let mut board = board_with(&[(0, 0, 1), (1, 0, 2)]);
        assert_eq!(board.hit_test(Point::new(0.1, 0.2)), Some(Pos::new(0, 0)));
        board.catch(Pos::new(0, 0));
        assert_eq!(board.hit_test(Point::new(0.1, 0.2)), None);
        board.clear_piece(Pos::new(1, 0));
        assert_eq!(board.hit_test(Point::new(1.0, 0.0)), None);
        assert_eq!(board.hit_test(Point::new(2.0, 2.0)), None);
    }
}
