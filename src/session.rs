use rand::Rng;

use crate::config::GameConfig;
use crate::engine::Score;
use crate::game::{Action, GameState, Outcome, Status};
use crate::store::{load_best, save_best, KeyValueStore};

/// One player's game: the current state, its RNG and the best-score store.
///
/// The best score is read from the store once, when the session starts, and
/// written back each time a move pushes the score past it.
pub struct Session<S, R> {
    state: GameState,
    store: S,
    rng: R,
    key: String,
}

impl<S, R> Session<S, R> {
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: KeyValueStore, R: Rng> Session<S, R> {
    pub fn new(config: &GameConfig, store: S, mut rng: R) -> Self {
        let best = load_best(&store, &config.storage_key);
        log::info!("starting session, best score {best}");
        let state = GameState::new(config.rules(), best, &mut rng);
        Session { state, store, rng, key: config.storage_key.clone() }
    }

    /// Feed one input through the state machine and replace the current state.
    pub fn apply(&mut self, action: Action) -> Outcome {
        let transition = self.state.apply(action, &mut self.rng);
        let previous_best = self.state.best();
        let previous_status = self.state.status();
        self.state = transition.state;

        if self.state.best() > previous_best {
            self.persist_best(self.state.best());
        }
        if self.state.status() != previous_status {
            match self.state.status() {
                Status::Won => log::info!("reached {} with score {}", self.state.rules().target, self.state.score()),
                Status::GameOver => log::info!("game over with score {}", self.state.score()),
                Status::Playing => {}
            }
        }
        transition.outcome
    }

    fn persist_best(&mut self, best: Score) {
        if let Err(e) = save_best(&mut self.store, &self.key, best) {
            log::warn!("could not store best score {best}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Move;
    use crate::store::{MemoryStore, BEST_SCORE_KEY};
    use rand::{rngs::StdRng, SeedableRng};

    /// A store whose writes always fail.
    struct ReadOnly(MemoryStore);

    impl KeyValueStore for ReadOnly {
        fn get(&self, key: &str) -> Result<Option<String>, crate::store::StoreError> {
            self.0.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), crate::store::StoreError> {
            Err(crate::store::StoreError::Unavailable("read only".into()))
        }
    }

    fn play_until_scored<S: KeyValueStore>(session: &mut Session<S, StdRng>) {
        for dir in Move::ALL.iter().cycle().take(400) {
            session.apply(Action::Move(*dir));
            if session.state().score() > 0 || session.state().is_over() {
                break;
            }
        }
    }

    #[test]
    fn reads_stored_best_once() {
        let mut store = MemoryStore::new();
        store.set(BEST_SCORE_KEY, "300").unwrap();
        let session = Session::new(&GameConfig::default(), store, StdRng::seed_from_u64(1));
        assert_eq!(session.state().best(), 300);
        assert_eq!(session.state().score(), 0);
    }

    #[test]
    fn writes_best_when_exceeded() {
        let mut session = Session::new(&GameConfig::default(), MemoryStore::new(), StdRng::seed_from_u64(9));
        play_until_scored(&mut session);
        let score = session.state().score();
        assert!(score > 0);
        assert_eq!(load_best(session.store(), BEST_SCORE_KEY), score);
    }

    #[test]
    fn lower_scores_do_not_overwrite_best() {
        let mut store = MemoryStore::new();
        store.set(BEST_SCORE_KEY, "1000000").unwrap();
        let mut session = Session::new(&GameConfig::default(), store, StdRng::seed_from_u64(9));
        play_until_scored(&mut session);
        assert_eq!(session.store().get(BEST_SCORE_KEY).unwrap().as_deref(), Some("1000000"));
        assert_eq!(session.state().best(), 1_000_000);
    }

    #[test]
    fn best_survives_reset() {
        let mut session = Session::new(&GameConfig::default(), MemoryStore::new(), StdRng::seed_from_u64(4));
        play_until_scored(&mut session);
        let best = session.state().best();
        assert_eq!(session.apply(Action::Reset), Outcome::Reset);
        assert_eq!(session.state().score(), 0);
        assert_eq!(session.state().best(), best);
    }

    #[test]
    fn failed_write_keeps_playing() {
        let mut session = Session::new(&GameConfig::default(), ReadOnly(MemoryStore::new()), StdRng::seed_from_u64(9));
        play_until_scored(&mut session);
        assert!(session.state().score() > 0);
        assert_eq!(session.state().best(), session.state().score());
    }

    #[test]
    fn uses_configured_key() {
        let config = GameConfig { storage_key: "custom".into(), ..GameConfig::default() };
        let mut session = Session::new(&config, MemoryStore::new(), StdRng::seed_from_u64(9));
        play_until_scored(&mut session);
        assert!(session.store().get("custom").unwrap().is_some());
        assert!(session.store().get(BEST_SCORE_KEY).unwrap().is_none());
    }
}
