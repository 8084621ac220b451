//! Semantic events for presentation layers, and the context rules run in.

use crate::card::{AbilityRegistry, CardDatabase};
use crate::config::EngineConfig;
use crate::game::state::GameState;
use crate::game::terrain::Pos;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberKind {
    Damage,
    Heal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    Deploy,
    Move,
    Attack,
    Death,
    Spell,
}

/// Something a renderer, audio layer or relay may want to show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    Log {
        message: String,
    },
    FloatingNumber {
        pos: Pos,
        amount: i32,
        kind: NumberKind,
    },
    TitanNumber {
        player: usize,
        amount: i32,
        kind: NumberKind,
    },
    VeteranPromoted {
        pos: Pos,
        level: u8,
    },
    Animation {
        kind: AnimationKind,
        tiles: Vec<Pos>,
    },
    Sfx {
        name: String,
    },
    TurnTransition {
        turn: u32,
        player: usize,
    },
    Victory {
        winner: usize,
    },
}

/// Observer for engine events
pub trait EventSink {
    fn on_event(&mut self, event: &GameEvent);
}

impl<F: FnMut(&GameEvent)> EventSink for F {
    fn on_event(&mut self, event: &GameEvent) {
        self(event)
    }
}

/// Everything a rule needs besides the state it mutates
pub struct Ctx<'a> {
    pub db: &'a CardDatabase,
    pub abilities: &'a AbilityRegistry,
    pub config: &'a EngineConfig,
    pub events: &'a mut Vec<GameEvent>,
}

impl Ctx<'_> {
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Append to the game log and announce it
    pub fn log(&mut self, state: &mut GameState, message: impl Into<String>) {
        let message = message.into();
        log::debug!("[turn {}] {}", state.turn, message);
        state.log.push(message.clone());
        self.events.push(GameEvent::Log { message });
    }

    pub fn sfx(&mut self, name: &str) {
        self.events.push(GameEvent::Sfx {
            name: name.to_string(),
        });
    }

    pub fn animate(&mut self, kind: AnimationKind, tiles: Vec<Pos>) {
        self.events.push(GameEvent::Animation { kind, tiles });
    }
}
