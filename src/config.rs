use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// How timed resolutions (combat hits, turn hand-over) are completed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pacing {
    /// Resolve at once; used by headless runs and tests
    #[default]
    Immediate,
    /// Park in a pending state until the caller calls `resume`
    Deferred,
}

/// Rule constants and presentation hints for one engine session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for deck shuffles; `None` picks one at random
    pub seed: Option<u64>,
    pub shuffle_decks: bool,
    pub max_energy: u32,
    pub deploys_per_turn: u32,
    pub opening_hand: usize,
    pub max_hand: usize,
    /// Turns before fatigue damage starts growing
    pub fatigue_grace_turns: u32,
    pub pacing: Pacing,
    pub combat_delay_ms: u64,
    pub turn_overlay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            seed: None,
            shuffle_decks: true,
            max_energy: 10,
            deploys_per_turn: 3,
            opening_hand: 4,
            max_hand: 8,
            fatigue_grace_turns: 5,
            pacing: Pacing::Immediate,
            combat_delay_ms: 350,
            turn_overlay_ms: 500,
        }
    }
}

impl EngineConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_hand == 0 {
            return Err(ConfigError::Invalid("max_hand must be at least 1".to_string()));
        }
        if self.opening_hand > self.max_hand {
            return Err(ConfigError::Invalid(format!(
                "opening_hand {} exceeds max_hand {}",
                self.opening_hand, self.max_hand
            )));
        }
        Ok(())
    }

    /// Same config with a fixed seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
