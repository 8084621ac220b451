pub mod abilities;
pub mod database;
pub mod types;
pub mod veteran;

pub use abilities::{parse_spell_text, AbilityRegistry, Effect, GameError, Trigger};
pub use database::{CardDatabase, CardDatabaseError};
pub use types::{
    CardDefinition, CardType, Element, Keyword, Race, StatusKind, TargetKind, TitanDefinition,
};
pub use veteran::{migrate_text, VeteranEffect};
