//! Match detection: per-axis runs from a seed, merged transitively through
//! perpendicular runs that branch off any member.

use crate::grid::{Grid, Pos};
use crate::piece::{PieceColor, PieceState};
use std::collections::{BTreeSet, HashSet};

/// Matched coordinates, deduplicated.
pub type MatchSet = BTreeSet<Pos>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn perpendicular(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    fn delta(self, forward: bool) -> (isize, isize) {
        let d = if forward { 1 } else { -1 };
        match self {
            Self::Horizontal => (d, 0),
            Self::Vertical => (0, d),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchDetector {
    delete_count: usize,
}

impl MatchDetector {
    pub fn new(delete_count: usize) -> Self {
        Self { delete_count }
    }

    /// Colour that takes part in matching: empty and clearing cells have none.
    fn color_at(grid: &Grid, pos: Pos) -> Option<PieceColor> {
        grid.get(pos)
            .filter(|p| p.state() != PieceState::Clearing)
            .map(|p| p.color())
    }

    /// Contiguous same-colour cells through `seed` along `axis`, seed first.
    /// Empty when the seed itself has no matchable piece.
    pub fn run(&self, grid: &Grid, seed: Pos, axis: Axis) -> Vec<Pos> {
        let Some(color) = Self::color_at(grid, seed) else {
            return Vec::new();
        };
        let mut run = vec![seed];
        for forward in [true, false] {
            let (dx, dy) = axis.delta(forward);
            let mut cur = seed;
            while let Some(next) = cur.offset(dx, dy).filter(|&p| grid.contains(p)) {
                if Self::color_at(grid, next) != Some(color) {
                    break;
                }
                run.push(next);
                cur = next;
            }
        }
        run
    }

    /// Every cell matched from `seed`: qualifying runs on both axes, plus the
    /// perpendicular runs reachable from their members, recursively.
    pub fn find_matches(&self, grid: &Grid, seed: Pos) -> MatchSet {
        let mut found = MatchSet::new();
        if Self::color_at(grid, seed).is_none() {
            return found;
        }
        let mut expanded: HashSet<(Pos, Axis)> = HashSet::new();
        let mut stack = vec![(seed, Axis::Vertical), (seed, Axis::Horizontal)];
        while let Some((origin, axis)) = stack.pop() {
            if !expanded.insert((origin, axis)) {
                continue;
            }
            let run = self.run(grid, origin, axis);
            if run.len() < self.delete_count {
                continue;
            }
            found.extend(run.iter().copied());
            stack.extend(
                run.into_iter()
                    .filter(|&p| p != origin)
                    .map(|p| (p, axis.perpendicular())),
            );
        }
        found
    }

    /// First non-empty match in row-major order from the bottom row.
    pub fn find_all_matches(&self, grid: &Grid) -> Option<MatchSet> {
        grid.positions()
            .filter(|&pos| grid.is_occupied(pos))
            .map(|pos| self.find_matches(grid, pos))
            .find(|found| !found.is_empty())
    }
}
