//! Browser bindings. The page owns a [`GameHandle`], forwards key presses
//! and button clicks as command strings, and redraws from `view()`.

use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

use crate::config::GameConfig;
use crate::game::Action;
use crate::highlight::Annotation;
use crate::render::GameView;
use crate::session::Session;
use crate::store::{KeyValueStore, MemoryStore, StoreError};

/// `window.localStorage`, or an in-memory map when storage is blocked.
pub enum BrowserStore {
    Local(web_sys::Storage),
    Memory(MemoryStore),
}

impl BrowserStore {
    pub fn open() -> Self {
        match web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
            Some(storage) => BrowserStore::Local(storage),
            None => BrowserStore::Memory(MemoryStore::new()),
        }
    }
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            BrowserStore::Local(storage) => storage
                .get_item(key)
                .map_err(|e| StoreError::Unavailable(format!("{e:?}"))),
            BrowserStore::Memory(m) => m.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        match self {
            BrowserStore::Local(storage) => storage
                .set_item(key, value)
                .map_err(|e| StoreError::Unavailable(format!("{e:?}"))),
            BrowserStore::Memory(m) => m.set(key, value),
        }
    }
}

#[wasm_bindgen]
pub struct GameHandle {
    session: Session<BrowserStore, StdRng>,
    annotation: Annotation,
    highlight_ms: u32,
}

/// Start a game. Pass a seed for a reproducible board, or nothing for a random one.
#[wasm_bindgen]
pub fn new_game(seed: Option<u64>) -> GameHandle {
    console_error_panic_hook::set_once();
    let config = GameConfig::default();
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    GameHandle {
        session: Session::new(&config, BrowserStore::open(), rng),
        annotation: Annotation::default(),
        highlight_ms: config.highlight_ms,
    }
}

#[wasm_bindgen]
impl GameHandle {
    /// Apply `left`/`right`/`up`/`down` (or `ArrowLeft` ...), `reset` or
    /// `continue`. Returns whether anything changed.
    #[wasm_bindgen]
    pub fn command(&mut self, input: &str) -> Result<bool, JsValue> {
        let action: Action = input.parse().map_err(|e| JsValue::from_str(&format!("{e}")))?;
        let outcome = self.session.apply(action);
        Ok(self.annotation.record(&outcome, js_sys::Date::now()))
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.session.apply(Action::Reset);
        self.annotation = Annotation::default();
    }

    #[wasm_bindgen]
    pub fn keep_playing(&mut self) {
        self.session.apply(Action::KeepPlaying);
    }

    #[wasm_bindgen]
    pub fn score(&self) -> f64 {
        self.session.state().score() as f64
    }

    #[wasm_bindgen]
    pub fn best(&self) -> f64 {
        self.session.state().best() as f64
    }

    #[wasm_bindgen]
    pub fn is_game_over(&self) -> bool {
        self.session.state().is_over()
    }

    #[wasm_bindgen]
    pub fn is_won(&self) -> bool {
        self.session.state().is_won()
    }

    /// Milliseconds the page should wait before redrawing without highlights.
    #[wasm_bindgen]
    pub fn highlight_ms(&self) -> u32 {
        self.highlight_ms
    }

    /// Board, scores, flags and the still-live highlights as a JS object.
    #[wasm_bindgen]
    pub fn view(&self) -> Result<JsValue, JsValue> {
        let highlights = self.annotation.active(js_sys::Date::now(), self.highlight_ms);
        let view = GameView::build(self.session.state(), highlights);
        serde_wasm_bindgen::to_value(&view)
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize view: {e}")))
    }
}
