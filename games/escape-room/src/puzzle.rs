use escape_engine::{Countdown, Rng};
use glam::Vec2;

use crate::board::{Shuffle, TileBoard};

/// Delay between solving the board and reporting completion (seconds).
pub const COMPLETE_DELAY: f32 = 1.5;

/// Result of clicking a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Not adjacent to the empty cell, or the board is already solved.
    Rejected,
    Moved,
    /// This move solved the board.
    Solved,
}

/// The sliding-tile challenge: board, win detection and the delayed completion.
pub struct PuzzleChallenge {
    size: usize,
    board: TileBoard,
    trail: Vec<usize>,
    solved: bool,
    completion: Option<Countdown>,
    moves: u32,
}

impl PuzzleChallenge {
    pub fn new(size: usize, rng: &mut Rng) -> Self {
        let Shuffle { board, trail } = TileBoard::shuffled(size, rng);
        Self {
            size,
            board,
            trail,
            solved: false,
            completion: None,
            moves: 0,
        }
    }

    /// Discard the current board (and any pending completion) for a fresh shuffle.
    pub fn reset(&mut self, rng: &mut Rng) {
        *self = Self::new(self.size, rng);
        log::debug!("puzzle reset: {:?}", self.board.cells());
    }

    pub fn board(&self) -> &TileBoard {
        &self.board
    }

    /// Sentinel positions recorded while shuffling this board.
    pub fn shuffle_trail(&self) -> &[usize] {
        &self.trail
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Slide the tile at `index`. Solved boards are inert.
    pub fn click(&mut self, index: usize) -> MoveOutcome {
        if self.solved || !self.board.apply_move(index) {
            return MoveOutcome::Rejected;
        }
        self.moves += 1;
        if self.board.is_solved() {
            self.solved = true;
            self.completion = Some(Countdown::new(COMPLETE_DELAY));
            log::info!("puzzle solved in {} moves", self.moves);
            return MoveOutcome::Solved;
        }
        MoveOutcome::Moved
    }

    /// Advance the completion delay. Returns true once, when it elapses.
    pub fn update(&mut self, dt: f32) -> bool {
        self.completion.as_mut().is_some_and(|c| c.tick(dt))
    }
}

/// Screen placement of the tile grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PuzzleLayout {
    pub origin: Vec2,
    pub tile_size: f32,
}

impl PuzzleLayout {
    /// Grid of `size`×`size` tiles centred in a world of the given dimensions.
    pub fn centered(size: usize, tile_size: f32, world_w: f32, world_h: f32) -> Self {
        let span = size as f32 * tile_size;
        Self {
            origin: Vec2::new((world_w - span) / 2.0, (world_h - span) / 2.0),
            tile_size,
        }
    }

    /// Convert world coordinates to a cell index.
    pub fn cell_at(&self, pos: Vec2, size: usize) -> Option<usize> {
        let local = (pos - self.origin) / self.tile_size;
        let (gx, gy) = (local.x.floor() as i32, local.y.floor() as i32);
        let n = size as i32;
        if gx >= 0 && gx < n && gy >= 0 && gy < n {
            Some(gy as usize * size + gx as usize)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(puzzle: &mut PuzzleChallenge) -> MoveOutcome {
        let trail: Vec<usize> = puzzle.shuffle_trail().to_vec();
        for &cell in trail.iter().rev() {
            if puzzle.click(cell) == MoveOutcome::Solved {
                return MoveOutcome::Solved;
            }
        }
        MoveOutcome::Rejected
    }

    #[test]
    fn replaying_trail_solves_and_completes_once() {
        let mut rng = Rng::new(11);
        let mut puzzle = PuzzleChallenge::new(3, &mut rng);
        assert_eq!(solve(&mut puzzle), MoveOutcome::Solved);
        assert!(puzzle.is_solved());

        assert!(!puzzle.update(1.0));
        assert!(puzzle.update(0.6));
        assert!(!puzzle.update(5.0));
    }

    #[test]
    fn solved_board_rejects_clicks() {
        let mut rng = Rng::new(11);
        let mut puzzle = PuzzleChallenge::new(3, &mut rng);
        solve(&mut puzzle);
        assert!(puzzle.is_solved());
        let sentinel = puzzle.board().sentinel_index();
        for cell in puzzle.board().neighbors(sentinel) {
            assert_eq!(puzzle.click(cell), MoveOutcome::Rejected);
        }
    }

    #[test]
    fn reset_discards_pending_completion() {
        let mut rng = Rng::new(11);
        let mut puzzle = PuzzleChallenge::new(3, &mut rng);
        solve(&mut puzzle);
        puzzle.reset(&mut rng);
        assert!(!puzzle.is_solved());
        assert_eq!(puzzle.moves(), 0);
        assert!(!puzzle.update(10.0));
    }

    #[test]
    fn layout_maps_pointer_to_cell() {
        let layout = PuzzleLayout::centered(3, 96.0, 800.0, 600.0);
        assert_eq!(layout.origin, Vec2::new(256.0, 156.0));
        assert_eq!(layout.cell_at(Vec2::new(260.0, 160.0), 3), Some(0));
        assert_eq!(layout.cell_at(Vec2::new(256.0 + 96.0 * 2.5, 156.0 + 96.0 * 1.5), 3), Some(5));
        assert_eq!(layout.cell_at(Vec2::new(250.0, 160.0), 3), None);
        assert_eq!(layout.cell_at(Vec2::new(260.0, 156.0 + 96.0 * 3.0), 3), None);
    }
}
