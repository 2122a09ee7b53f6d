//! Piece: colour, logical cell, presentation position and lifecycle.

use crate::grid::Pos;

/// Half the side of a piece's square hit box, in world units.
pub const HIT_HALF_EXTENT: f32 = 0.5;

/// A clearing piece is finished once its scale drops below this.
const CLEAR_MIN_SCALE: f32 = 0.1;
/// Scale lost per 1/60 s while clearing.
const CLEAR_SHRINK_PER_FRAME: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PieceId(pub u64);

/// Piece colours. `None` is the sentinel and never spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PieceColor {
    #[default]
    None,
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Heart,
}

impl PieceColor {
    pub const PLAYABLE: [Self; 6] = [
        Self::Red,
        Self::Blue,
        Self::Green,
        Self::Yellow,
        Self::Purple,
        Self::Heart,
    ];

    /// Index into [`Self::PLAYABLE`], `None` for the sentinel.
    pub fn index(self) -> Option<usize> {
        Self::PLAYABLE.iter().position(|&c| c == self)
    }

    /// Layout letter: R B G Y P H.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'R' => Some(Self::Red),
            'B' => Some(Self::Blue),
            'G' => Some(Self::Green),
            'Y' => Some(Self::Yellow),
            'P' => Some(Self::Purple),
            'H' => Some(Self::Heart),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::None => '.',
            Self::Red => 'R',
            Self::Blue => 'B',
            Self::Green => 'G',
            Self::Yellow => 'Y',
            Self::Purple => 'P',
            Self::Heart => 'H',
        }
    }
}

/// World-space point. Cell `(x, y)` is centred at `(x * pitch, y * pitch)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Centre of a (possibly off-board) cell.
    pub fn of_cell(x: usize, y: usize, pitch: f32) -> Self {
        Self::new(x as f32 * pitch, y as f32 * pitch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PieceState {
    #[default]
    Idle,
    Moving,
    Selected,
    Clearing,
}

/// Draw-order hint for the presentation side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Back,
    Normal,
    Front,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    id: PieceId,
    color: PieceColor,
    cell: Pos,
    state: PieceState,
    position: Point,
    target: Point,
    speed: f32,
    scale: f32,
    /// Reached `Idle` from `Clearing`: remove instead of keeping.
    cleared: bool,
}

impl Piece {
    pub fn new(id: PieceId, color: PieceColor, cell: Pos, position: Point) -> Self {
        Self {
            id,
            color,
            cell,
            state: PieceState::Idle,
            position,
            target: position,
            speed: 0.0,
            scale: 1.0,
            cleared: false,
        }
    }

    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn color(&self) -> PieceColor {
        self.color
    }

    pub fn cell(&self) -> Pos {
        self.cell
    }

    pub fn state(&self) -> PieceState {
        self.state
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn target(&self) -> Point {
        self.target
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    /// Tracked for completion: anything but `Idle`.
    pub fn is_active(&self) -> bool {
        self.state != PieceState::Idle
    }

    pub fn layer(&self) -> Layer {
        match self.state {
            PieceState::Selected => Layer::Front,
            PieceState::Clearing => Layer::Back,
            PieceState::Idle | PieceState::Moving => Layer::Normal,
        }
    }

    pub(crate) fn set_cell(&mut self, cell: Pos) {
        self.cell = cell;
    }

    /// Re-arms target and speed when already moving.
    pub(crate) fn move_to(&mut self, cell: Pos, speed: f32, pitch: f32) {
        debug_assert!(self.state != PieceState::Clearing, "clearing piece cannot move");
        self.state = PieceState::Moving;
        self.cell = cell;
        self.speed = speed;
        self.target = Point::of_cell(cell.x, cell.y, pitch);
    }

    pub(crate) fn select(&mut self) {
        self.state = PieceState::Selected;
    }

    pub(crate) fn clear(&mut self) {
        self.state = PieceState::Clearing;
    }

    /// One animation step. `dt` is in seconds; `pointer` is only read while selected.
    pub fn update(&mut self, dt: f32, pointer: Point) {
        match self.state {
            PieceState::Idle => {}
            PieceState::Moving => {
                if self.position == self.target {
                    self.state = PieceState::Idle;
                    return;
                }
                self.speed += 1.0;
                let step = self.speed * dt;
                self.position.x = approach(self.position.x, self.target.x, step);
                self.position.y = approach(self.position.y, self.target.y, step);
            }
            PieceState::Selected => self.position = pointer,
            PieceState::Clearing => {
                self.scale -= CLEAR_SHRINK_PER_FRAME * dt * 60.0;
                if self.scale < CLEAR_MIN_SCALE {
                    self.cleared = true;
                    self.state = PieceState::Idle;
                }
            }
        }
    }

    /// Square hit box around the presentation position.
    pub fn contains(&self, point: Point) -> bool {
        (point.x - self.position.x).abs() <= HIT_HALF_EXTENT
            && (point.y - self.position.y).abs() <= HIT_HALF_EXTENT
    }
}

/// Step toward `target`, snapping onto it instead of overshooting.
fn approach(now: f32, target: f32, step: f32) -> f32 {
    if now > target {
        (now - step).max(target)
    } else {
        (now + step).min(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn piece_at(x: usize, y: usize) -> Piece {
        Piece::new(PieceId(1), PieceColor::Red, Pos::new(x, y), Point::of_cell(x, y, 1.0))
    }

    #[test]
    fn test_moving_snaps_to_target_then_idles() {
        let mut p = piece_at(0, 5);
        p.move_to(Pos::new(0, 0), 1.0, 1.0);
        assert_eq!(p.state(), PieceState::Moving);
        let mut ticks = 0;
        while p.state() == PieceState::Moving {
            p.update(DT, Point::default());
            ticks += 1;
            assert!(ticks < 1000, "piece never arrived");
        }
        assert_eq!(p.position(), Point::new(0.0, 0.0));
        assert_eq!(p.state(), PieceState::Idle);
        assert!(!p.is_cleared());
    }

    #[test]
    fn test_move_to_rearms_while_moving() {
        let mut p = piece_at(2, 2);
        p.move_to(Pos::new(3, 2), 5.0, 1.0);
        p.update(DT, Point::default());
        p.move_to(Pos::new(2, 2), 10.0, 1.0);
        assert_eq!(p.cell(), Pos::new(2, 2));
        assert_eq!(p.target(), Point::new(2.0, 2.0));
        assert_eq!(p.state(), PieceState::Moving);
    }

    #[test]
    fn test_selected_follows_pointer() {
        let mut p = piece_at(1, 1);
        p.select();
        p.update(DT, Point::new(4.2, -0.3));
        assert_eq!(p.position(), Point::new(4.2, -0.3));
        assert_eq!(p.layer(), Layer::Front);
    }

    #[test]
    fn test_clearing_reaches_terminal() {
        let mut p = piece_at(0, 0);
        p.clear();
        assert!(p.is_active());
        for _ in 0..5 {
            p.update(DT, Point::default());
        }
        assert_eq!(p.state(), PieceState::Clearing);
        assert!(p.scale() < 0.6);
        for _ in 0..6 {
            p.update(DT, Point::default());
        }
        assert!(p.is_cleared());
        assert!(!p.is_active());
    }

    #[test]
    fn test_hit_box() {
        let p = piece_at(2, 1);
        assert!(p.contains(Point::new(2.4, 0.6)));
        assert!(!p.contains(Point::new(2.6, 1.0)));
    }

    #[test]
    fn test_colour_letters() {
        for color in PieceColor::PLAYABLE {
            assert_eq!(PieceColor::from_char(color.as_char()), Some(color));
        }
        assert_eq!(PieceColor::from_char('.'), None);
        assert_eq!(PieceColor::None.index(), None);
        assert_eq!(PieceColor::Heart.index(), Some(5));
    }
}
