use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Side length of the board.
pub const SIZE: usize = 4;
/// Number of cells on the board.
pub const CELLS: usize = SIZE * SIZE;
/// Tile value that wins the game.
pub const DEFAULT_TARGET: Tile = 2048;
/// Chance that a spawned tile is a 4 instead of a 2.
pub const FOUR_PROBABILITY: f64 = 0.1;
/// Largest tile a 4x4 board can produce (2^17).
pub const MAX_TILE: Tile = 1 << 17;

pub type Tile = u32;
pub type Score = u64;
pub type Line = [Tile; SIZE];

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("unknown direction: {0:?}")]
    UnknownMove(String),
    #[error("invalid tile {value} at cell {idx}: must be 0 or a power of two from 2 to 131072")]
    InvalidTile { idx: usize, value: Tile },
}

/// Accepts direction names, browser key names (`ArrowLeft`) and the
/// usual wasd / vi letters.
impl FromStr for Move {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "arrowup" | "w" | "k" => Ok(Move::Up),
            "down" | "arrowdown" | "s" | "j" => Ok(Move::Down),
            "left" | "arrowleft" | "a" | "h" => Ok(Move::Left),
            "right" | "arrowright" | "d" | "l" => Ok(Move::Right),
            _ => Err(EngineError::UnknownMove(s.to_string())),
        }
    }
}

/// Outcome of compacting and merging a single line towards index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMove {
    pub line: Line,
    /// Sum of the values produced by merges.
    pub score: Score,
    /// Slots holding a tile produced by a merge.
    pub merged: [bool; SIZE],
}

/// Outcome of sliding the whole board in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveResult {
    pub board: Board,
    pub score: Score,
    /// True iff at least one row/column changed.
    pub moved: bool,
    /// Row-major mask of cells holding a freshly merged tile.
    pub merged: [bool; CELLS],
}

/// A 4x4 2048 board as 16 row-major tile values (0 = empty).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board([Tile; CELLS]);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board([0; CELLS]);

    /// Build a board from rows without validating tile values.
    pub fn from_rows(rows: [[Tile; SIZE]; SIZE]) -> Self {
        let mut cells = [0; CELLS];
        for (r, row) in rows.iter().enumerate() {
            cells[r * SIZE..(r + 1) * SIZE].copy_from_slice(row);
        }
        Board(cells)
    }

    /// Build a board from rows, rejecting values that are not 0 or a power of
    /// two between 2 and [`MAX_TILE`].
    pub fn try_from_rows(rows: [[Tile; SIZE]; SIZE]) -> Result<Self, EngineError> {
        let board = Board::from_rows(rows);
        for (idx, &value) in board.0.iter().enumerate() {
            if value != 0 && (value < 2 || value > MAX_TILE || !value.is_power_of_two()) {
                return Err(EngineError::InvalidTile { idx, value });
            }
        }
        Ok(board)
    }

    pub fn rows(&self) -> [[Tile; SIZE]; SIZE] {
        let mut rows = [[0; SIZE]; SIZE];
        for (r, row) in rows.iter_mut().enumerate() {
            row.copy_from_slice(&self.0[r * SIZE..(r + 1) * SIZE]);
        }
        rows
    }

    /// Row-major cell values.
    #[inline]
    pub fn cells(&self) -> &[Tile; CELLS] {
        &self.0
    }

    /// Value at row-major index `idx` (0 if empty).
    #[inline]
    pub fn tile_value(&self, idx: usize) -> Tile {
        self.0[idx]
    }

    /// Return the result of sliding/merging tiles in `dir` (no random insert).
    ///
    /// ```
    /// use web_2048::engine::{Board, Move};
    /// let b = Board::from_rows([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
    /// let r = b.shift(Move::Left);
    /// assert_eq!(r.board.rows()[0], [4, 0, 0, 0]);
    /// assert_eq!(r.score, 4);
    /// assert!(r.moved);
    /// ```
    pub fn shift(self, dir: Move) -> MoveResult {
        let mut board = self;
        let mut score = 0;
        let mut moved = false;
        let mut merged = [false; CELLS];
        for lane in 0..SIZE {
            let original = self.line(dir, lane);
            let result = move_line(original);
            if result.line != original {
                moved = true;
            }
            score += result.score;
            for pos in 0..SIZE {
                let idx = cell_index(dir, lane, pos);
                board.0[idx] = result.line[pos];
                merged[idx] = result.merged[pos];
            }
        }
        MoveResult { board, score, moved, merged }
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a random empty cell.
    /// A full board is returned unchanged.
    ///
    /// ```
    /// use web_2048::engine::Board;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    #[inline]
    pub fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        self.with_random_tile_p(rng, FOUR_PROBABILITY)
    }

    /// Like `with_random_tile` with an explicit chance of spawning a 4.
    pub fn with_random_tile_p<R: Rng + ?Sized>(self, rng: &mut R, four_probability: f64) -> Self {
        self.spawn_tile(rng, four_probability)
            .map_or(self, |(board, _)| board)
    }

    /// Place a random tile and report the index it landed on, or `None` if the board is full.
    pub fn spawn_tile<R: Rng + ?Sized>(self, rng: &mut R, four_probability: f64) -> Option<(Board, usize)> {
        let empty = self.empty_cells();
        if empty.is_empty() {
            return None;
        }
        let idx = empty[rng.gen_range(0..empty.len())];
        let mut board = self;
        board.0[idx] = generate_random_tile(rng, four_probability);
        Some((board, idx))
    }

    /// Perform a move then insert a random tile if the move changed the board.
    pub fn make_move<R: Rng + ?Sized>(self, direction: Move, rng: &mut R) -> Self {
        let result = self.shift(direction);
        if result.moved { result.board.with_random_tile(rng) } else { self }
    }

    /// Row-major indices of the empty cells.
    pub fn empty_cells(&self) -> Vec<usize> {
        (0..CELLS).filter(|&idx| self.0[idx] == 0).collect()
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(&self) -> usize {
        self.0.iter().filter(|&&v| v == 0).count()
    }

    /// True iff the board is full and no two neighbours are equal.
    pub fn is_terminal(&self) -> bool {
        if self.0.contains(&0) {
            return false;
        }
        for row in 0..SIZE {
            for col in 0..SIZE {
                let current = self.0[row * SIZE + col];
                if col + 1 < SIZE && self.0[row * SIZE + col + 1] == current {
                    return false;
                }
                if row + 1 < SIZE && self.0[(row + 1) * SIZE + col] == current {
                    return false;
                }
            }
        }
        true
    }

    /// True iff any cell holds exactly `target`.
    #[inline]
    pub fn has_reached(&self, target: Tile) -> bool {
        self.0.contains(&target)
    }

    /// Return the highest tile value present on the board (0 when empty).
    #[inline]
    pub fn highest_tile(&self) -> Tile {
        self.0.iter().copied().max().unwrap_or(0)
    }

    /// Sum of all tile values.
    pub fn total(&self) -> u64 {
        self.0.iter().map(|&v| u64::from(v)).sum()
    }

    /// Line `lane` read in the order tiles travel towards, so that index 0
    /// is the wall `dir` pushes against.
    fn line(&self, dir: Move, lane: usize) -> Line {
        let mut line = [0; SIZE];
        for (pos, slot) in line.iter_mut().enumerate() {
            *slot = self.0[cell_index(dir, lane, pos)];
        }
        line
    }
}

/// Maps position `pos` of oriented line `lane` back to a row-major index.
#[inline]
fn cell_index(dir: Move, lane: usize, pos: usize) -> usize {
    match dir {
        Move::Left => lane * SIZE + pos,
        Move::Right => lane * SIZE + (SIZE - 1 - pos),
        Move::Up => pos * SIZE + lane,
        Move::Down => (SIZE - 1 - pos) * SIZE + lane,
    }
}

/// Compact a line towards index 0 and merge equal neighbours once, leftmost pair first.
///
/// ```
/// use web_2048::engine::move_line;
/// let m = move_line([2, 2, 2, 2]);
/// assert_eq!(m.line, [4, 4, 0, 0]);
/// assert_eq!(m.score, 8);
/// ```
pub fn move_line(line: Line) -> LineMove {
    let mut out = LineMove { line: [0; SIZE], score: 0, merged: [false; SIZE] };
    let mut tiles = line.into_iter().filter(|&v| v != 0).peekable();
    let mut slot = 0;
    while let Some(tile) = tiles.next() {
        if tiles.next_if_eq(&tile).is_some() {
            let value = tile.saturating_mul(2);
            out.line[slot] = value;
            out.merged[slot] = true;
            out.score += Score::from(value);
        } else {
            out.line[slot] = tile;
        }
        slot += 1;
    }
    out
}

/// Slide/merge tiles in the given direction. No randomness.
pub fn move_grid(board: Board, direction: Move) -> MoveResult {
    board.shift(direction)
}

/// Insert a random tile with the default 2/4 odds.
pub fn place_random_tile<R: Rng + ?Sized>(board: Board, rng: &mut R) -> Board {
    board.with_random_tile(rng)
}

/// True if no move in any direction can change the board.
pub fn is_terminal(board: Board) -> bool {
    board.is_terminal()
}

pub fn has_reached_target(board: Board, target: Tile) -> bool {
    board.has_reached(target)
}

fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R, four_probability: f64) -> Tile {
    if rng.gen::<f64>() < four_probability { 4 } else { 2 }
}

fn format_val(val: Tile) -> String {
    match val {
        0 => String::from("       "),
        x => format!("{:^7}", x),
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:?})", self.rows())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for (r, row) in self.rows().iter().enumerate() {
            if r > 0 {
                writeln!(f, "-------------------------------")?;
            }
            let cells: Vec<String> = row.iter().map(|&v| format_val(v)).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

impl From<[[Tile; SIZE]; SIZE]> for Board {
    fn from(rows: [[Tile; SIZE]; SIZE]) -> Self {
        Board::from_rows(rows)
    }
}
