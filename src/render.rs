//! Presentation helpers shared by the browser handle and the terminal.

use serde::Serialize;
use std::fmt::Write as _;

use crate::engine::{Board, Score, Tile, CELLS, SIZE};
use crate::game::{Action, GameState, Status};
use crate::highlight::Highlights;

/// CSS class for a tile value: `tile-2` .. `tile-2048`, `tile-super` above that.
pub fn tile_class(value: Tile) -> String {
    if value <= 2048 {
        format!("tile-{value}")
    } else {
        "tile-super".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileView {
    pub index: usize,
    pub row: usize,
    pub col: usize,
    pub value: Tile,
    pub class: String,
    pub spawned: bool,
    pub merged: bool,
}

/// Everything the page needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameView {
    pub rows: [[Tile; SIZE]; SIZE],
    /// Non-empty cells only.
    pub tiles: Vec<TileView>,
    pub score: Score,
    pub best: Score,
    pub status: Status,
    pub won: bool,
    pub game_over: bool,
    /// Score equals the best score (shown on the game-over notice).
    pub new_best: bool,
}

impl GameView {
    pub fn build(state: &GameState, highlights: Option<&Highlights>) -> Self {
        let board = state.board();
        let tiles = (0..CELLS)
            .filter(|&idx| board.tile_value(idx) != 0)
            .map(|idx| {
                let value = board.tile_value(idx);
                TileView {
                    index: idx,
                    row: idx / SIZE,
                    col: idx % SIZE,
                    value,
                    class: tile_class(value),
                    spawned: highlights.is_some_and(|h| h.is_spawned(idx)),
                    merged: highlights.is_some_and(|h| h.is_merged(idx)),
                }
            })
            .collect();
        GameView {
            rows: board.rows(),
            tiles,
            score: state.score(),
            best: state.best(),
            status: state.status(),
            won: state.is_won(),
            game_over: state.is_over(),
            new_best: state.score() > 0 && state.score() == state.best(),
        }
    }
}

/// Text board with `*` beside a spawned tile and `+` beside a merged one.
pub fn render_board(board: &Board, highlights: &Highlights) -> String {
    let mut out = String::new();
    for row in 0..SIZE {
        if row > 0 {
            let _ = writeln!(out, "{}", "-".repeat(SIZE * 8 - 1));
        }
        let cells: Vec<String> = (0..SIZE)
            .map(|col| {
                let idx = row * SIZE + col;
                let mark = if highlights.is_spawned(idx) {
                    '*'
                } else if highlights.is_merged(idx) {
                    '+'
                } else {
                    ' '
                };
                let text = match board.tile_value(idx) {
                    0 => String::new(),
                    v => v.to_string(),
                };
                format!("{text:>5}{mark} ")
            })
            .collect();
        let _ = writeln!(out, "{}", cells.join("|"));
    }
    out
}

pub fn status_line(state: &GameState) -> String {
    let mut line = format!("score {}  best {}", state.score(), state.best());
    match state.status() {
        Status::Playing => {}
        Status::Won => {
            let _ = write!(line, "  -- you reached {}! [c]ontinue or [r]eset", state.rules().target);
        }
        Status::GameOver => {
            line.push_str("  -- game over, [r]eset to try again");
            if state.score() > 0 && state.score() == state.best() {
                line.push_str(" (new best score!)");
            }
        }
    }
    line
}

/// Feedback for an input the game ignored.
pub fn ignored_line(action: Action, state: &GameState) -> String {
    match (action, state.status()) {
        (Action::Move(dir), Status::Playing) => format!("blocked: nothing moves {dir}  ({})", status_line(state)),
        (Action::KeepPlaying, Status::Playing) => format!("nothing to continue  ({})", status_line(state)),
        _ => status_line(state),
    }
}
