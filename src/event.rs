//! Commands the engine issues to the presentation side.

use crate::grid::Pos;
use crate::piece::{Layer, PieceColor, PieceId, Point};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PieceEvent {
    /// New piece at a world position (usually above the board).
    Spawned { id: PieceId, at: Point },
    SetColor { id: PieceId, color: PieceColor },
    MoveTo { id: PieceId, target: Pos, speed: f32 },
    FollowPointer { id: PieceId },
    Layer { id: PieceId, layer: Layer },
    Clear { id: PieceId },
    /// Clear animation finished; the piece left the grid.
    Removed { id: PieceId },
}

impl PieceEvent {
    pub fn id(&self) -> PieceId {
        match *self {
            Self::Spawned { id, .. }
            | Self::SetColor { id, .. }
            | Self::MoveTo { id, .. }
            | Self::FollowPointer { id }
            | Self::Layer { id, .. }
            | Self::Clear { id }
            | Self::Removed { id } => id,
        }
    }
}
