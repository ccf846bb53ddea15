//! web-2048: a 2048 game engine and state machine for the browser
//!
//! This crate provides:
//! - A 4x4 `Board` type with pure move/merge, spawn and terminal checks (`engine`)
//! - A reducer-style game state machine with win/game-over handling (`game`)
//! - Best-score persistence over a small key-value store trait (`store`, `session`)
//! - View helpers for spawn/merge highlights and tile classes (`highlight`, `render`)
//! - `wasm-bindgen` bindings behind the `wasm` feature (`wasm`)
//!
//! Quick start:
//! ```
//! use web_2048::engine::Move;
//! use web_2048::game::{Action, GameState, Rules};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let state = GameState::new(Rules::default(), 0, &mut rng);
//! let next = state.apply(Action::Move(Move::Left), &mut rng).state;
//! assert!(next.score() >= state.score());
//! ```
//!
//! Full loop with persistence:
//! ```
//! use web_2048::config::GameConfig;
//! use web_2048::engine::Move;
//! use web_2048::game::Action;
//! use web_2048::session::Session;
//! use web_2048::store::MemoryStore;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut session = Session::new(&GameConfig::default(), MemoryStore::new(), StdRng::seed_from_u64(7));
//! let mut moves = 0;
//! while !session.state().is_over() && moves < 8 {
//!     session.apply(Action::Move(Move::ALL[moves % 4]));
//!     moves += 1;
//! }
//! assert!(session.state().best() >= session.state().score());
//! ```
//!
pub mod config;
pub mod engine;
pub mod game;
pub mod highlight;
pub mod render;
pub mod session;
pub mod store;
#[cfg(feature = "wasm")]
pub mod wasm;
