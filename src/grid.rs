//! Grid: `width x height` cells, each empty or holding one piece.
//! `y = 0` is the bottom row; gravity pulls toward it.

use crate::piece::{Piece, PieceId};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Neighbour by a signed offset; `None` below zero. Upper bounds are the grid's concern.
    pub fn offset(self, dx: isize, dy: isize) -> Option<Self> {
        Some(Self::new(
            self.x.checked_add_signed(dx)?,
            self.y.checked_add_signed(dy)?,
        ))
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    /// Row-major, `cells[y * width + x]`.
    cells: Vec<Option<Piece>>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Panics on out-of-bounds: callers validate coordinates first.
    #[inline]
    fn index(&self, pos: Pos) -> usize {
        assert!(
            self.contains(pos),
            "cell {pos} outside {}x{} grid",
            self.width,
            self.height
        );
        pos.y * self.width + pos.x
    }

    #[inline]
    pub fn get(&self, pos: Pos) -> Option<&Piece> {
        self.cells[self.index(pos)].as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, pos: Pos) -> Option<&mut Piece> {
        let i = self.index(pos);
        self.cells[i].as_mut()
    }

    #[inline]
    pub fn is_occupied(&self, pos: Pos) -> bool {
        self.get(pos).is_some()
    }

    /// Puts `piece` at `pos` (updating its stored cell) and returns the previous occupant.
    pub fn set(&mut self, pos: Pos, piece: Option<Piece>) -> Option<Piece> {
        let i = self.index(pos);
        let piece = piece.map(|mut p| {
            p.set_cell(pos);
            p
        });
        std::mem::replace(&mut self.cells[i], piece)
    }

    pub fn take(&mut self, pos: Pos) -> Option<Piece> {
        let i = self.index(pos);
        self.cells[i].take()
    }

    /// Exchanges occupants and their stored cells. Purely logical: no motion is commanded.
    pub fn swap(&mut self, a: Pos, b: Pos) {
        let (ia, ib) = (self.index(a), self.index(b));
        self.cells.swap(ia, ib);
        if let Some(p) = self.cells[ia].as_mut() {
            p.set_cell(a);
        }
        if let Some(p) = self.cells[ib].as_mut() {
            p.set_cell(b);
        }
    }

    /// All coordinates, bottom row first, left to right.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let (w, h) = (self.width, self.height);
        (0..h).flat_map(move |y| (0..w).map(move |x| Pos::new(x, y)))
    }

    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.cells.iter().flatten()
    }

    pub fn pieces_mut(&mut self) -> impl Iterator<Item = &mut Piece> {
        self.cells.iter_mut().flatten()
    }

    pub fn locate(&self, id: PieceId) -> Option<Pos> {
        self.pieces().find(|p| p.id() == id).map(Piece::cell)
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = None);
    }

    /// Colour letters, top row first; `.` for empty.
    pub fn rows(&self) -> Vec<String> {
        (0..self.height)
            .rev()
            .map(|y| {
                (0..self.width)
                    .map(|x| {
                        self.get(Pos::new(x, y))
                            .map_or('.', |p| p.color().as_char())
                    })
                    .collect()
            })
            .collect()
    }
}
