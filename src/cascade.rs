//! Cascade: gravity compaction per column and refill from above the board.

use crate::board::Board;
use crate::grid::{Grid, Pos};
use crate::piece::{Piece, PieceColor, PieceId, Point};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Allocates piece ids and draws random playable colours.
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: StdRng,
    next_id: u64,
    palette_size: usize,
}

impl Spawner {
    pub fn new(seed: Option<u64>, palette_size: usize) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng,
            next_id: 0,
            palette_size: palette_size.clamp(1, PieceColor::PLAYABLE.len()),
        }
    }

    pub fn next_id(&mut self) -> PieceId {
        self.next_id += 1;
        PieceId(self.next_id)
    }

    pub fn next_color(&mut self) -> PieceColor {
        PieceColor::PLAYABLE[self.rng.random_range(0..self.palette_size)]
    }

    /// New idle piece for `cell`, drawn at `from`.
    pub fn spawn(&mut self, cell: Pos, from: Point) -> Piece {
        let color = self.next_color();
        self.spawn_with(color, cell, from)
    }

    pub fn spawn_with(&mut self, color: PieceColor, cell: Pos, from: Point) -> Piece {
        Piece::new(self.next_id(), color, cell, from)
    }
}

/// Empty cells directly below `pos`, stopping at the first piece or the floor.
pub fn seek_down(grid: &Grid, pos: Pos) -> usize {
    (0..pos.y)
        .rev()
        .take_while(|&y| !grid.is_occupied(Pos::new(pos.x, y)))
        .count()
}

/// Drops every piece in `column` onto the one below, bottom to top.
/// Returns the number of pieces left in the column.
pub fn compact(board: &mut Board, column: usize, speed: f32) -> usize {
    let height = board.grid().height();
    let mut survivors = 0;
    for y in 0..height {
        let from = Pos::new(column, y);
        if !board.grid().is_occupied(from) {
            continue;
        }
        survivors += 1;
        let gap = seek_down(board.grid(), from);
        if gap == 0 {
            continue;
        }
        let to = Pos::new(column, y - gap);
        let piece = board.grid_mut().take(from);
        board.grid_mut().set(to, piece);
        board.move_piece(to, speed);
    }
    survivors
}

/// Spawns pieces above the board for rows `survivors..height` and drops them in.
/// Returns the number spawned.
pub fn fill(
    board: &mut Board,
    spawner: &mut Spawner,
    column: usize,
    survivors: usize,
    speed: f32,
) -> usize {
    let height = board.grid().height();
    let pitch = board.pitch();
    let missing = height.saturating_sub(survivors);
    for j in 0..missing {
        let cell = Pos::new(column, survivors + j);
        let from = Point::of_cell(column, height + j, pitch);
        board.place(spawner.spawn(cell, from));
        board.move_piece(cell, speed);
    }
    missing
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CascadeReport {
    pub survivors: usize,
    pub spawned: usize,
}

/// Compacts and refills every column.
pub fn run(board: &mut Board, spawner: &mut Spawner, speed: f32) -> CascadeReport {
    let mut report = CascadeReport::default();
    for column in 0..board.grid().width() {
        let survivors = compact(board, column, speed);
        let spawned = fill(board, spawner, column, survivors, speed);
        if spawned > 0 {
            debug!(column, survivors, spawned, "column refilled");
        }
        report.survivors += survivors;
        report.spawned += spawned;
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_board(height: usize, occupied: &[usize]) -> (Board, Spawner) {
        let mut board = Board::new(1, height, 1.0);
        let mut spawner = Spawner::new(Some(7), 6);
        for &y in occupied {
            let piece = spawner.spawn(Pos::new(0, y), Point::of_cell(0, y, 1.0));
            board.place(piece);
        }
        board.take_events();
        (board, spawner)
    }

    fn ids_bottom_up(board: &Board) -> Vec<Option<PieceId>> {
        (0..board.grid().height())
            .map(|y| board.grid().get(Pos::new(0, y)).map(Piece::id))
            .collect()
    }

    #[test]
    fn test_seek_down() {
        let (board, _) = column_board(5, &[0, 3]);
        assert_eq!(seek_down(board.grid(), Pos::new(0, 3)), 2);
        assert_eq!(seek_down(board.grid(), Pos::new(0, 0)), 0);
        assert_eq!(seek_down(board.grid(), Pos::new(0, 4)), 0);
    }

    #[test]
    fn test_compact_keeps_order() {
        let (mut board, _) = column_board(5, &[1, 3, 4]);
        assert_eq!(compact(&mut board, 0, 1.0), 3);
        assert_eq!(
            ids_bottom_up(&board),
            vec![Some(PieceId(1)), Some(PieceId(2)), Some(PieceId(3)), None, None]
        );
        assert_eq!(board.active_count(), 3);
        for y in 0..3 {
            assert_eq!(board.grid().get(Pos::new(0, y)).unwrap().cell(), Pos::new(0, y));
        }
    }

    #[test]
    fn test_compact_full_column_is_noop() {
        let (mut board, _) = column_board(3, &[0, 1, 2]);
        assert_eq!(compact(&mut board, 0, 1.0), 3);
        assert!(board.is_settled());
        assert!(board.take_events().is_empty());
    }

    #[test]
    fn test_fill_spawns_above_board() {
        let (mut board, mut spawner) = column_board(4, &[0]);
        assert_eq!(fill(&mut board, &mut spawner, 0, 1, 1.0), 3);
        for y in 1..4 {
            let piece = board.grid().get(Pos::new(0, y)).unwrap();
            assert_eq!(piece.position(), Point::of_cell(0, 4 + y - 1, 1.0));
            assert_ne!(piece.color(), PieceColor::None);
        }
        assert_eq!(board.active_count(), 3);
    }

    #[test]
    fn test_compact_then_fill_occupies_every_row() {
        let patterns: [&[usize]; 5] = [&[], &[2], &[0, 4], &[1, 2, 3], &[0, 1, 2, 3, 4]];
        for pattern in patterns {
            let (mut board, mut spawner) = column_board(5, pattern);
            let survivors = compact(&mut board, 0, 1.0);
            fill(&mut board, &mut spawner, 0, survivors, 1.0);
            let ids: Vec<_> = ids_bottom_up(&board).into_iter().flatten().collect();
            assert_eq!(ids.len(), 5);
            let mut unique = ids.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), 5);
        }
    }

    #[test]
    fn test_palette_size_limits_colours() {
        let mut spawner = Spawner::new(Some(1), 2);
        for _ in 0..100 {
            let c = spawner.next_color();
            assert!(matches!(c, PieceColor::Red | PieceColor::Blue));
        }
    }
}
