pub mod decisions;
pub mod deck;
pub mod engine;

pub use decisions::{Action, DecisionEngine};
pub use deck::{parse_deck, parse_deck_file, DeckError};
pub use engine::{run_game, GameResult, MAX_TURNS};
