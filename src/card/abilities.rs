use crate::card::types::{Element, Race};
use crate::game::terrain::Terrain;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur while resolving ability content
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Unknown card: {0}")]
    UnknownCard(String),
    #[error("No free tile next to {0}")]
    NoFreeTile(String),
    #[error("Ability needs a target: {0}")]
    MissingTarget(String),
}

/// Moments at which id-keyed content is looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    Battlecry,
    Deathrattle,
    Inspire,
    OnKill,
    EndOfTurn,
    Arise,
    FirstStrike,
    Aura,
    Spell,
    TitanPassive,
    TitanActive,
    TitanUltimate,
    RaceSurge,
}

/// Effect descriptors. Everything a card, titan or synergy can do is one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    NoOp,
    /// Summon a token on a free tile next to the source
    SummonToken { token_id: String },
    /// Summon a token on the chosen tile
    SummonAt { token_id: String },
    DrawCards { count: u32 },
    HealAdjacentAllies { amount: i32 },
    DamageAdjacent { amount: i32 },
    PoisonAdjacentEnemies { amount: i32, turns: u32 },
    ReturnToHand,
    /// Per-turn attack buff on the source unit
    BuffSelf { atk: i32 },
    /// Permanent attack gain on the source unit
    GainAttack { atk: i32 },
    HealTitan { amount: i32 },
    DamageEnemyTitan { amount: i32 },
    DamageUnit { amount: i32 },
    HealUnit { amount: i32 },
    FreezeUnit { damage: i32 },
    PoisonUnit { amount: i32, turns: u32 },
    BuffUnit { atk: i32 },
    DamageAllEnemies { amount: i32 },
    HealAllAllies { amount: i32 },
    FreezeAllEnemies,
    RecastLastSpell,
    RiseAgain { hp: i32 },
    BonusDamage { amount: i32 },
    RangeAura { amount: u32 },
    SpellDiscount,
    TerrainAura { terrain: Terrain, atk: i32 },
    ElementMoveBonus { element: Element, amount: u32 },
}

/// Registry for looking up effects by trigger and content id.
///
/// Missing entries resolve to [`Effect::NoOp`], so partial content never breaks a match.
#[derive(Debug, Clone)]
pub struct AbilityRegistry {
    effects: HashMap<(Trigger, String), Effect>,
}

impl AbilityRegistry {
    /// Create a registry holding the built-in card and titan effects
    pub fn new() -> Self {
        let mut registry = AbilityRegistry::empty();
        registry.register_standard_abilities();
        registry
    }

    /// Create a registry with nothing in it
    pub fn empty() -> Self {
        AbilityRegistry {
            effects: HashMap::new(),
        }
    }

    fn register_standard_abilities(&mut self) {
        use Effect::*;
        use Trigger::*;

        // Battlecries
        self.register(Battlecry, "goblin_warchief", SummonToken { token_id: "goblin_grunt".into() });
        self.register(Battlecry, "elven_sage", DrawCards { count: 1 });
        self.register(Battlecry, "temple_cleric", HealAdjacentAllies { amount: 2 });

        // Deathrattles
        self.register(Deathrattle, "magma_golem", DamageAdjacent { amount: 2 });
        self.register(Deathrattle, "mirror_sprite", ReturnToHand);
        self.register(Deathrattle, "plague_rat", PoisonAdjacentEnemies { amount: 1, turns: 2 });

        // Inspire
        self.register(Inspire, "war_drummer", BuffSelf { atk: 1 });
        self.register(Inspire, "spirit_caller", HealTitan { amount: 1 });

        // Unit passives
        self.register(OnKill, "orc_berserker", GainAttack { atk: 1 });
        self.register(EndOfTurn, "healing_shrine", HealAdjacentAllies { amount: 2 });
        self.register(EndOfTurn, "druid_of_the_grove", HealAdjacentAllies { amount: 1 });
        self.register(Arise, "risen_champion", RiseAgain { hp: 1 });
        self.register(FirstStrike, "goblin_raider", BonusDamage { amount: 2 });
        self.register(Aura, "watchtower", RangeAura { amount: 1 });
        self.register(Aura, "arcane_sanctum", SpellDiscount);

        // Spells
        self.register(Spell, "fireball", DamageUnit { amount: 4 });
        self.register(Spell, "ice_shard", FreezeUnit { damage: 1 });
        self.register(Spell, "healing_light", HealUnit { amount: 4 });
        self.register(Spell, "venom_vial", PoisonUnit { amount: 2, turns: 3 });
        self.register(Spell, "battle_hymn", BuffUnit { atk: 2 });

        // Titans
        self.register(TitanPassive, "pyra", TerrainAura { terrain: Terrain::Volcano, atk: 1 });
        self.register(TitanPassive, "thalassa", ElementMoveBonus { element: Element::Water, amount: 1 });
        self.register(TitanPassive, "sylvara", TerrainAura { terrain: Terrain::Forest, atk: 1 });
        self.register(TitanPassive, "arcanus", SpellDiscount);
        self.register(TitanPassive, "morthis", TerrainAura { terrain: Terrain::Swamp, atk: 1 });

        self.register(TitanActive, "pyra", DamageUnit { amount: 2 });
        self.register(TitanActive, "thalassa", HealUnit { amount: 3 });
        self.register(TitanActive, "sylvara", SummonAt { token_id: "sapling".into() });
        self.register(TitanActive, "arcanus", RecastLastSpell);
        self.register(TitanActive, "morthis", PoisonUnit { amount: 1, turns: 3 });

        self.register(TitanUltimate, "pyra", DamageAllEnemies { amount: 3 });
        self.register(TitanUltimate, "thalassa", FreezeAllEnemies);
        self.register(TitanUltimate, "sylvara", HealAllAllies { amount: 3 });
        self.register(TitanUltimate, "arcanus", DrawCards { count: 3 });
        self.register(TitanUltimate, "morthis", DamageEnemyTitan { amount: 5 });

        // Five-of-a-race surges
        self.register(RaceSurge, Race::Goblin.name(), DamageEnemyTitan { amount: 3 });
        self.register(RaceSurge, Race::Elf.name(), DrawCards { count: 2 });
    }

    /// Register an effect for a trigger and content id
    pub fn register(&mut self, trigger: Trigger, id: &str, effect: Effect) {
        self.effects.insert((trigger, id.to_string()), effect);
    }

    /// Get the effect registered for a trigger and id, if any
    pub fn get(&self, trigger: Trigger, id: &str) -> Option<&Effect> {
        self.effects.get(&(trigger, id.to_string()))
    }

    /// Get the effect for a trigger and id, falling back to a no-op
    pub fn resolve(&self, trigger: Trigger, id: &str) -> Effect {
        self.get(trigger, id).cloned().unwrap_or(Effect::NoOp)
    }
}

impl Default for AbilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Fallback for spells without a registered effect: read "deal N damage" and
/// "draw N" out of the card text.
pub fn parse_spell_text(description: &str, targeted: bool) -> Vec<Effect> {
    let words: Vec<String> = description
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();

    let mut effects = Vec::new();
    for (i, word) in words.iter().enumerate() {
        match word.as_str() {
            "deal" | "deals" => {
                let amount = words.get(i + 1).and_then(|w| w.parse::<i32>().ok());
                let is_damage = words.get(i + 2).map(|w| w == "damage").unwrap_or(false);
                if let (Some(amount), true) = (amount, is_damage) {
                    effects.push(if targeted {
                        Effect::DamageUnit { amount }
                    } else {
                        Effect::DamageEnemyTitan { amount }
                    });
                }
            }
            "draw" | "draws" => {
                let count = match words.get(i + 1).map(|w| w.as_str()) {
                    Some("a") | Some("one") => Some(1),
                    Some(w) => w.parse::<u32>().ok(),
                    None => None,
                };
                if let Some(count) = count {
                    effects.push(Effect::DrawCards { count });
                }
            }
            _ => {}
        }
    }
    effects
}
