use escape_engine::Rng;

/// Value of the empty cell.
pub const SENTINEL: u8 = 0;

/// Largest side length. Bigger boards no longer fit the world with full-size tiles.
pub const MAX_GRID_SIZE: usize = 6;

/// Number of random sentinel moves applied by `TileBoard::shuffled`.
pub const SHUFFLE_MOVES: usize = 150;

/// Row-major NxN sliding-tile board.
/// Holds one sentinel and a permutation of 1..N²-1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileBoard {
    size: usize,
    cells: Vec<u8>,
}

/// A shuffled board plus the sentinel positions it passed through.
///
/// `trail[k]` is where the sentinel sat before shuffle step k. Clicking the
/// trail in reverse order walks the board back to the solved layout.
#[derive(Debug, Clone)]
pub struct Shuffle {
    pub board: TileBoard,
    pub trail: Vec<usize>,
}

impl TileBoard {
    /// The solved layout [1, 2, ..., N²-1, 0]. `size` is clamped to 1..=`MAX_GRID_SIZE`.
    pub fn solved(size: usize) -> Self {
        let size = size.clamp(1, MAX_GRID_SIZE);
        let n = size * size;
        let cells = (0..n).map(|i| ((i + 1) % n) as u8).collect();
        Self { size, cells }
    }

    /// Solved board scrambled by `SHUFFLE_MOVES` legal sentinel moves.
    pub fn shuffled(size: usize, rng: &mut Rng) -> Shuffle {
        Self::shuffled_with(size, SHUFFLE_MOVES, rng)
    }

    /// Scramble with an explicit move count. Every step swaps the sentinel with
    /// a grid neighbour other than the cell it just left, so the result is
    /// reachable from the solved layout by construction.
    pub fn shuffled_with(size: usize, moves: usize, rng: &mut Rng) -> Shuffle {
        let mut board = Self::solved(size);
        let mut trail = Vec::with_capacity(moves);
        let mut previous: Option<usize> = None;

        for _ in 0..moves {
            let empty = board.sentinel_index();
            let options: Vec<usize> = board
                .neighbors(empty)
                .into_iter()
                .filter(|&n| Some(n) != previous)
                .collect();
            let Some(&next) = rng.pick(&options) else {
                break;
            };
            board.cells.swap(empty, next);
            trail.push(empty);
            previous = Some(empty);
        }

        Shuffle { board, trail }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Index of the empty cell.
    pub fn sentinel_index(&self) -> usize {
        self.cells
            .iter()
            .position(|&v| v == SENTINEL)
            .unwrap_or(self.cells.len() - 1)
    }

    fn row_col(&self, index: usize) -> (usize, usize) {
        (index / self.size, index % self.size)
    }

    /// Up/down/left/right cells of `index` that lie inside the grid.
    pub fn neighbors(&self, index: usize) -> Vec<usize> {
        let (row, col) = self.row_col(index);
        let mut out = Vec::with_capacity(4);
        if row > 0 {
            out.push(index - self.size);
        }
        if row + 1 < self.size {
            out.push(index + self.size);
        }
        if col > 0 {
            out.push(index - 1);
        }
        if col + 1 < self.size {
            out.push(index + 1);
        }
        out
    }

    /// True if `index` is exactly one grid step from the sentinel.
    pub fn is_movable(&self, index: usize) -> bool {
        if index >= self.cells.len() {
            return false;
        }
        let (row, col) = self.row_col(index);
        let (er, ec) = self.row_col(self.sentinel_index());
        row.abs_diff(er) + col.abs_diff(ec) == 1
    }

    /// Slide the tile at `index` into the empty cell.
    /// Returns false and leaves the board untouched for illegal moves.
    pub fn apply_move(&mut self, index: usize) -> bool {
        if !self.is_movable(index) {
            return false;
        }
        let empty = self.sentinel_index();
        self.cells.swap(index, empty);
        true
    }

    /// Every cell i holds i+1 and the last cell holds the sentinel.
    pub fn is_solved(&self) -> bool {
        let last = self.cells.len() - 1;
        self.cells.iter().enumerate().all(|(i, &v)| {
            if i == last {
                v == SENTINEL
            } else {
                v as usize == i + 1
            }
        })
    }
}
