//! Selection: catching a piece, dragging it across neighbours, releasing it.

use crate::board::Board;
use crate::config::PuzzleConfig;
use crate::grid::Pos;
use crate::piece::{PieceId, PieceState, Point};
use std::collections::VecDeque;
use tracing::trace;

/// Pointer state sampled once per tick, in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickInput {
    /// Pressed during this tick.
    pub pointer_down: bool,
    /// Released during this tick.
    pub pointer_up: bool,
    pub point: Point,
}

impl TickInput {
    pub const fn hover(point: Point) -> Self {
        Self {
            pointer_down: false,
            pointer_up: false,
            point,
        }
    }

    pub const fn press(point: Point) -> Self {
        Self {
            pointer_down: true,
            pointer_up: false,
            point,
        }
    }

    pub const fn release(point: Point) -> Self {
        Self {
            pointer_down: false,
            pointer_up: true,
            point,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Held {
    id: PieceId,
    cell: Pos,
}

#[derive(Debug, Clone)]
pub struct SelectionController {
    held: Option<Held>,
    /// Cells touched by swaps, oldest first.
    route: VecDeque<Pos>,
    normal_speed: f32,
    release_speed: f32,
    top_boundary: f32,
}

impl SelectionController {
    pub fn new(config: &PuzzleConfig) -> Self {
        Self {
            held: None,
            route: VecDeque::new(),
            normal_speed: config.normal_move_speed,
            release_speed: config.release_move_speed,
            top_boundary: config.top_boundary(),
        }
    }

    pub fn is_holding(&self) -> bool {
        self.held.is_some()
    }

    pub fn held(&self) -> Option<(PieceId, Pos)> {
        self.held.map(|h| (h.id, h.cell))
    }

    pub fn route(&self) -> impl Iterator<Item = Pos> + '_ {
        self.route.iter().copied()
    }

    pub(crate) fn push_route(&mut self, pos: Pos) {
        self.route.push_back(pos);
    }

    pub fn pop_route(&mut self) -> Option<Pos> {
        self.route.pop_front()
    }

    pub fn clear_route(&mut self) {
        self.route.clear();
    }

    /// True once a piece has been caught.
    pub fn select(&mut self, board: &mut Board, input: &TickInput) -> bool {
        if !input.pointer_down {
            return false;
        }
        let Some(cell) = board.hit_test(input.point) else {
            return false;
        };
        let Some(id) = board.catch(cell) else {
            return false;
        };
        self.held = Some(Held { id, cell });
        true
    }

    /// Swaps with any idle piece under the pointer; true once the held piece is released.
    pub fn drag(&mut self, board: &mut Board, input: &TickInput) -> bool {
        let Some(mut held) = self.held else {
            return true;
        };

        if let Some(other) = board.hit_test(input.point) {
            let idle = board
                .grid()
                .get(other)
                .is_some_and(|p| p.state() == PieceState::Idle);
            if other != held.cell && idle {
                board.swap(held.cell, other);
                board.move_piece(held.cell, self.normal_speed);
                self.push_route(held.cell);
                trace!(from = %held.cell, to = %other, "drag swap");
                held.cell = other;
                self.held = Some(held);
            }
        }

        let flicked = board
            .grid()
            .get(held.cell)
            .is_some_and(|p| p.position().y > self.top_boundary);
        if input.pointer_up || flicked {
            self.release(board);
        }
        !self.is_holding()
    }

    /// Drops the held piece: its cell joins the route and it heads home.
    /// False when nothing was held.
    pub fn release(&mut self, board: &mut Board) -> bool {
        let Some(held) = self.held.take() else {
            return false;
        };
        self.push_route(held.cell);
        board.release(held.cell, self.release_speed);
        true
    }
}
