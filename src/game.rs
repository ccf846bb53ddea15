//! Game state machine.
//!
//! A [`GameState`] is an immutable snapshot. Every input goes through
//! [`GameState::apply`], which returns the next snapshot together with an
//! [`Outcome`] describing what happened. Nothing is mutated in place, so
//! the view layer can diff consecutive states freely.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::engine::{Board, EngineError, Move, MoveResult, Score, Tile, DEFAULT_TARGET, FOUR_PROBABILITY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Playing,
    /// Target tile reached; moves are still accepted.
    Won,
    /// No move can change the board. Only `Reset` is accepted.
    GameOver,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Playing => "playing",
            Status::Won => "won",
            Status::GameOver => "game over",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Move(Move),
    Reset,
    /// Dismiss the win notice and keep playing.
    KeepPlaying,
}

impl From<Move> for Action {
    fn from(m: Move) -> Self {
        Action::Move(m)
    }
}

impl FromStr for Action {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reset" | "new" | "r" | "n" => Ok(Action::Reset),
            "continue" | "keep" | "c" => Ok(Action::KeepPlaying),
            _ => s.parse().map(Action::Move),
        }
    }
}

/// Parameters of a game that stay fixed across resets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rules {
    pub target: Tile,
    pub initial_tiles: usize,
    pub four_probability: f64,
}

impl Default for Rules {
    fn default() -> Self {
        Rules { target: DEFAULT_TARGET, initial_tiles: 2, four_probability: FOUR_PROBABILITY }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// The input had no effect.
    Ignored,
    Moved {
        result: MoveResult,
        /// Cell the new random tile landed on.
        spawned: Option<usize>,
    },
    Reset,
    Resumed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: GameState,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    board: Board,
    score: Score,
    best: Score,
    status: Status,
    /// Latched the first time the target appears so the win fires once per game.
    target_reached: bool,
    rules: Rules,
}

impl GameState {
    /// Fresh game seeded with `rules.initial_tiles` random tiles.
    pub fn new<R: Rng + ?Sized>(rules: Rules, best: Score, rng: &mut R) -> Self {
        let mut board = Board::EMPTY;
        for _ in 0..rules.initial_tiles {
            board = board.with_random_tile_p(rng, rules.four_probability);
        }
        GameState::from_board(rules, board, 0, best)
    }

    /// Resume from a known board. The win latch is set if the target is already on it.
    pub fn from_board(rules: Rules, board: Board, score: Score, best: Score) -> Self {
        let status = if board.is_terminal() { Status::GameOver } else { Status::Playing };
        GameState {
            board,
            score,
            best: best.max(score),
            status,
            target_reached: board.has_reached(rules.target),
            rules,
        }
    }

    pub fn board(&self) -> Board { self.board }
    pub fn score(&self) -> Score { self.score }
    pub fn best(&self) -> Score { self.best }
    pub fn status(&self) -> Status { self.status }
    pub fn rules(&self) -> Rules { self.rules }
    pub fn target_reached(&self) -> bool { self.target_reached }
    pub fn is_won(&self) -> bool { self.status == Status::Won }
    pub fn is_over(&self) -> bool { self.status == Status::GameOver }

    /// Compute the state that follows `action`.
    pub fn apply<R: Rng + ?Sized>(&self, action: Action, rng: &mut R) -> Transition {
        let transition = match action {
            Action::Reset => Transition {
                state: GameState::new(self.rules, self.best, rng),
                outcome: Outcome::Reset,
            },
            Action::KeepPlaying if self.status == Status::Won => Transition {
                state: GameState { status: Status::Playing, ..self.clone() },
                outcome: Outcome::Resumed,
            },
            Action::KeepPlaying => self.ignored(),
            Action::Move(_) if self.status == Status::GameOver => self.ignored(),
            Action::Move(dir) => self.advance(dir, rng),
        };
        log::debug!(
            "{:?} -> {}: score={} status={}",
            action,
            outcome_name(&transition.outcome),
            transition.state.score,
            transition.state.status
        );
        transition
    }

    fn advance<R: Rng + ?Sized>(&self, dir: Move, rng: &mut R) -> Transition {
        let result = self.board.shift(dir);
        if !result.moved {
            return self.ignored();
        }
        let (board, spawned) = match result.board.spawn_tile(rng, self.rules.four_probability) {
            Some((board, idx)) => (board, Some(idx)),
            None => (result.board, None),
        };
        let score = self.score + result.score;
        let mut status = self.status;
        let mut target_reached = self.target_reached;
        if !target_reached && board.has_reached(self.rules.target) {
            target_reached = true;
            status = Status::Won;
        }
        if board.is_terminal() {
            status = Status::GameOver;
        }
        Transition {
            state: GameState {
                board,
                score,
                best: self.best.max(score),
                status,
                target_reached,
                rules: self.rules,
            },
            outcome: Outcome::Moved { result, spawned },
        }
    }

    fn ignored(&self) -> Transition {
        Transition { state: self.clone(), outcome: Outcome::Ignored }
    }
}

fn outcome_name(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Ignored => "ignored",
        Outcome::Moved { .. } => "moved",
        Outcome::Reset => "reset",
        Outcome::Resumed => "resumed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(2048)
    }

    #[test]
    fn new_game_has_two_tiles() {
        let mut rng = rng();
        let state = GameState::new(Rules::default(), 100, &mut rng);
        assert_eq!(state.board().count_empty(), 14);
        assert_eq!(state.score(), 0);
        assert_eq!(state.best(), 100);
        assert_eq!(state.status(), Status::Playing);
    }

    #[test]
    fn move_adds_score_and_spawns() {
        let mut rng = rng();
        let board = Board::from_rows([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let state = GameState::from_board(Rules::default(), board, 10, 12);
        let t = state.apply(Action::Move(Move::Left), &mut rng);
        assert_eq!(t.state.score(), 14);
        assert_eq!(t.state.best(), 14);
        assert_eq!(t.state.board().count_empty(), 14);
        assert_eq!(t.state.board().tile_value(0), 4);
        match t.outcome {
            Outcome::Moved { result, spawned: Some(idx) } => {
                assert_eq!(result.score, 4);
                assert_eq!(result.board.tile_value(idx), 0);
                assert_ne!(t.state.board().tile_value(idx), 0);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn noop_move_is_ignored() {
        let mut rng = rng();
        let board = Board::from_rows([[2, 4, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let state = GameState::from_board(Rules::default(), board, 0, 0);
        let t = state.apply(Action::Move(Move::Left), &mut rng);
        assert_eq!(t.outcome, Outcome::Ignored);
        assert_eq!(t.state, state);
    }

    #[test]
    fn best_never_decreases() {
        let mut rng = rng();
        let board = Board::from_rows([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let state = GameState::from_board(Rules::default(), board, 0, 500);
        let t = state.apply(Action::Move(Move::Left), &mut rng);
        assert_eq!(t.state.best(), 500);
    }

    #[test]
    fn win_fires_once() {
        let mut rng = rng();
        let board = Board::from_rows([[1024, 1024, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let state = GameState::from_board(Rules::default(), board, 0, 0);
        let t = state.apply(Action::Move(Move::Left), &mut rng);
        assert_eq!(t.state.status(), Status::Won);
        assert!(t.state.target_reached());

        // still won while the notice is up, moves keep working
        let moved = t.state.apply(Action::Move(Move::Right), &mut rng);
        assert!(matches!(moved.outcome, Outcome::Moved { .. }));
        assert_eq!(moved.state.status(), Status::Won);

        let resumed = moved.state.apply(Action::KeepPlaying, &mut rng);
        assert_eq!(resumed.outcome, Outcome::Resumed);
        assert_eq!(resumed.state.status(), Status::Playing);

        let again = resumed.state.apply(Action::Move(Move::Left), &mut rng);
        assert!(again.state.board().has_reached(2048));
        assert_eq!(again.state.status(), Status::Playing);
    }

    #[test]
    fn keep_playing_outside_won_is_ignored() {
        let mut rng = rng();
        let state = GameState::new(Rules::default(), 0, &mut rng);
        assert_eq!(state.apply(Action::KeepPlaying, &mut rng).outcome, Outcome::Ignored);
    }

    #[test]
    fn game_over_blocks_moves_until_reset() {
        let mut rng = rng();
        // one merge left: 2,2 in the corner; everything else is locked
        let board = Board::from_rows([[2, 2, 8, 16], [32, 64, 128, 256], [8, 16, 32, 64], [128, 256, 512, 1024]]);
        let state = GameState::from_board(Rules { four_probability: 0.0, ..Rules::default() }, board, 0, 0);
        let t = state.apply(Action::Move(Move::Left), &mut rng);
        // [4,8,16,x] with x spawned as 2 in the last column of row 0
        assert_eq!(t.state.board().rows()[0], [4, 8, 16, 2]);
        assert_eq!(t.state.status(), Status::GameOver);

        for dir in Move::ALL {
            let blocked = t.state.apply(Action::Move(dir), &mut rng);
            assert_eq!(blocked.outcome, Outcome::Ignored);
        }

        let reset = t.state.apply(Action::Reset, &mut rng);
        assert_eq!(reset.outcome, Outcome::Reset);
        assert_eq!(reset.state.status(), Status::Playing);
        assert_eq!(reset.state.score(), 0);
        assert_eq!(reset.state.best(), t.state.best());
        assert!(!reset.state.target_reached());
    }

    #[test]
    fn game_over_overrides_win() {
        let mut rng = rng();
        let rules = Rules { target: 8, four_probability: 0.0, ..Rules::default() };
        let board = Board::from_rows([[4, 4, 16, 32], [64, 128, 256, 512], [16, 32, 64, 128], [256, 512, 1024, 2048]]);
        let state = GameState::from_board(rules, board, 0, 0);
        let t = state.apply(Action::Move(Move::Left), &mut rng);
        assert_eq!(t.state.board().rows()[0], [8, 16, 32, 2]);
        assert!(t.state.target_reached());
        assert_eq!(t.state.status(), Status::GameOver);
    }

    #[test]
    fn parses_actions() {
        assert_eq!("reset".parse::<Action>(), Ok(Action::Reset));
        assert_eq!("c".parse::<Action>(), Ok(Action::KeepPlaying));
        assert_eq!("ArrowDown".parse::<Action>(), Ok(Action::Move(Move::Down)));
        assert!("jump".parse::<Action>().is_err());
    }
}
