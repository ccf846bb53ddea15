use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::engine::{Tile, CELLS};
use crate::game::Rules;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Game settings. Every field has a default, so an empty TOML file is valid.
///
/// ```toml
/// target = 4096
/// four_probability = 0.1
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameConfig {
    /// Tile value that wins the game.
    #[serde(default = "defaults::target")]
    pub target: Tile,
    /// Tiles placed on a fresh board.
    #[serde(default = "defaults::initial_tiles")]
    pub initial_tiles: usize,
    /// Chance that a spawned tile is a 4.
    #[serde(default = "defaults::four_probability")]
    pub four_probability: f64,
    /// Key the best score is persisted under.
    #[serde(default = "defaults::storage_key")]
    pub storage_key: String,
    /// How long spawn/merge highlights stay visible.
    #[serde(default = "defaults::highlight_ms")]
    pub highlight_ms: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            target: defaults::target(),
            initial_tiles: defaults::initial_tiles(),
            four_probability: defaults::four_probability(),
            storage_key: defaults::storage_key(),
            highlight_ms: defaults::highlight_ms(),
        }
    }
}

impl GameConfig {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = std::fs::File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target < 2 || !self.target.is_power_of_two() {
            return Err(ConfigError::Invalid(format!(
                "target must be a power of two >= 2, got {}",
                self.target
            )));
        }
        if self.initial_tiles > CELLS {
            return Err(ConfigError::Invalid(format!(
                "initial_tiles must be at most {CELLS}, got {}",
                self.initial_tiles
            )));
        }
        if !(0.0..=1.0).contains(&self.four_probability) {
            return Err(ConfigError::Invalid(format!(
                "four_probability must be within [0, 1], got {}",
                self.four_probability
            )));
        }
        if self.storage_key.is_empty() {
            return Err(ConfigError::Invalid("storage_key must not be empty".into()));
        }
        Ok(())
    }

    pub fn rules(&self) -> Rules {
        Rules {
            target: self.target,
            initial_tiles: self.initial_tiles,
            four_probability: self.four_probability,
        }
    }
}

mod defaults {
    use crate::engine::{Tile, DEFAULT_TARGET, FOUR_PROBABILITY};
    use crate::store::BEST_SCORE_KEY;

    pub fn target() -> Tile { DEFAULT_TARGET }
    pub fn initial_tiles() -> usize { 2 }
    pub fn four_probability() -> f64 { FOUR_PROBABILITY }
    pub fn storage_key() -> String { BEST_SCORE_KEY.to_string() }
    pub fn highlight_ms() -> u32 { 200 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, GameConfig::default());
        assert_eq!(cfg.rules(), Rules::default());
        assert_eq!(cfg.storage_key, "2048-best-score");
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = GameConfig::from_toml_str("target = 4096\nfour_probability = 0.25\n").unwrap();
        assert_eq!(cfg.target, 4096);
        assert_eq!(cfg.rules().four_probability, 0.25);
        assert_eq!(cfg.initial_tiles, 2);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(GameConfig::from_toml_str("target = 1000"), Err(ConfigError::Invalid(_))));
        assert!(matches!(GameConfig::from_toml_str("four_probability = 1.5"), Err(ConfigError::Invalid(_))));
        assert!(matches!(GameConfig::from_toml_str("initial_tiles = 17"), Err(ConfigError::Invalid(_))));
        assert!(matches!(GameConfig::from_toml_str("storage_key = \"\""), Err(ConfigError::Invalid(_))));
        assert!(matches!(GameConfig::from_toml_str("colour = \"red\""), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"highlight_ms = 350\n").unwrap();
        let cfg = GameConfig::from_toml(file.path()).unwrap();
        assert_eq!(cfg.highlight_ms, 350);
    }
}
