pub mod combat;
pub mod death;
pub mod deploy;
pub mod effects;
pub mod engine;
pub mod error;
pub mod events;
pub mod input;
pub mod movement;
pub mod player;
pub mod progression;
pub mod state;
pub mod synergy;
pub mod terrain;
pub mod titan;
pub mod turns;
pub mod unit;
pub mod zones;

#[cfg(test)]
pub(crate) mod testutil;

pub use engine::{Engine, GameSetup};
pub use error::{ActionError, SetupError};
pub use events::{AnimationKind, EventSink, GameEvent, NumberKind};
pub use player::{PlayerState, Titan};
pub use state::{Board, GameState, Pending, Phase, Selection, Target};
pub use terrain::{builtin_map, GameMap, MapError, Pos, Terrain, Tile, COLS, MAP_COUNT, ROWS};
pub use unit::UnitInstance;
pub use zones::{Deck, Graveyard, Hand};
