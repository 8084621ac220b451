pub mod card;
pub mod config;
pub mod game;
pub mod rng;
pub mod simulation;

pub use config::{ConfigError, EngineConfig, Pacing};
pub use game::{ActionError, Engine, GameSetup};

#[cfg(test)]
mod integration_tests;
