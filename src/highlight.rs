//! View-only markers for freshly spawned and merged cells.
//!
//! Highlights are derived from a transition's [`Outcome`] and never feed
//! back into the game state. They expire on their own after a short delay.

use serde::Serialize;

use crate::engine::CELLS;
use crate::game::Outcome;

/// Row-major cell indices to animate after a move.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Highlights {
    pub spawned: Vec<usize>,
    pub merged: Vec<usize>,
}

impl Highlights {
    pub fn from_outcome(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Moved { result, spawned } => Highlights {
                spawned: spawned.iter().copied().collect(),
                merged: (0..CELLS).filter(|&idx| result.merged[idx]).collect(),
            },
            Outcome::Ignored | Outcome::Reset | Outcome::Resumed => Highlights::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty() && self.merged.is_empty()
    }

    pub fn is_spawned(&self, idx: usize) -> bool {
        self.spawned.contains(&idx)
    }

    pub fn is_merged(&self, idx: usize) -> bool {
        self.merged.contains(&idx)
    }
}

/// Highlights stamped with the time they were produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotation {
    highlights: Highlights,
    issued_at_ms: f64,
}

impl Annotation {
    pub fn new(highlights: Highlights, now_ms: f64) -> Self {
        Annotation { highlights, issued_at_ms: now_ms }
    }

    /// Restamp with the highlights of `outcome`. An ignored input leaves the
    /// current highlights and their clock alone. Returns whether it restamped.
    pub fn record(&mut self, outcome: &Outcome, now_ms: f64) -> bool {
        if *outcome == Outcome::Ignored {
            return false;
        }
        *self = Annotation::new(Highlights::from_outcome(outcome), now_ms);
        true
    }

    /// The highlights while younger than `ttl_ms`, nothing afterwards.
    pub fn active(&self, now_ms: f64, ttl_ms: u32) -> Option<&Highlights> {
        let live = now_ms - self.issued_at_ms < f64::from(ttl_ms);
        (live && !self.highlights.is_empty()).then_some(&self.highlights)
    }
}
