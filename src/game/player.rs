use crate::card::{Race, TitanDefinition};
use crate::game::zones::{Deck, Graveyard, Hand};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A player's hero: its definition plus per-game counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Titan {
    pub def: TitanDefinition,
    pub kills: u32,
    pub active_used: bool,
    pub ultimate_used: bool,
}

impl Titan {
    pub fn new(def: TitanDefinition) -> Self {
        Titan {
            def,
            kills: 0,
            active_used: false,
            ultimate_used: false,
        }
    }

    pub fn ultimate_ready(&self) -> bool {
        !self.ultimate_used && self.kills >= self.def.ultimate_kills
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub titan: Titan,
    pub hp: i32,
    pub energy: u32,
    pub hand: Hand,
    pub deck: Deck,
    pub graveyard: Graveyard,
    /// Races whose five-unit surge has already fired
    pub surged_races: BTreeSet<Race>,
}

impl PlayerState {
    pub fn new(titan: TitanDefinition, deck: Deck) -> Self {
        PlayerState {
            hp: titan.hp,
            titan: Titan::new(titan),
            energy: 0,
            hand: Hand::new(),
            deck,
            graveyard: Graveyard::new(),
            surged_races: BTreeSet::new(),
        }
    }

    pub fn max_hp(&self) -> i32 {
        self.titan.def.hp
    }

    pub fn is_defeated(&self) -> bool {
        self.hp <= 0
    }
}
