use crate::card::{CardDefinition, Keyword, StatusKind};
use crate::game::terrain::Pos;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sources of per-turn attack buffs. Cleared every Refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuffKind {
    Terrain,
    Inspire,
    Spell,
}

/// A timed status effect. `turns: None` lasts until removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub value: i32,
    pub turns: Option<u32>,
}

/// Derived race-synergy overlay, replaced wholesale on every recompute
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynergyBonus {
    pub atk: i32,
    pub hp: i32,
    pub movement: u32,
    pub armor: i32,
    pub keywords: Vec<Keyword>,
    pub no_water_penalty: bool,
    pub respawn: bool,
}

/// A card placed on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitInstance {
    pub card: CardDefinition,
    pub owner: usize,
    pub pos: Pos,
    pub hp: i32,
    pub max_hp: i32,
    pub atk: i32,
    pub armor: i32,
    pub movement: u32,
    pub range: u32,
    pub xp: u8,
    pub level: u8,
    pub keywords: Vec<Keyword>,
    pub buffs: BTreeMap<BuffKind, i32>,
    pub statuses: Vec<StatusEffect>,
    pub shield: bool,
    pub ward: bool,
    pub frozen: bool,
    pub stealth: bool,
    pub ready: bool,
    pub has_attacked: bool,
    pub moves_left: u32,
    pub windfury_used: bool,
    pub strike_used: bool,
    pub arise_used: bool,
    pub synergy: SynergyBonus,
}

impl UnitInstance {
    pub fn new(card: &CardDefinition, owner: usize, pos: Pos) -> Self {
        UnitInstance {
            owner,
            pos,
            hp: card.hp,
            max_hp: card.hp,
            atk: card.atk,
            armor: card.armor,
            movement: card.movement,
            range: card.range,
            xp: 0,
            level: 0,
            keywords: card.keywords.clone(),
            buffs: BTreeMap::new(),
            statuses: Vec::new(),
            shield: card.has_keyword(Keyword::DivineShield),
            ward: card.has_keyword(Keyword::Ward),
            frozen: false,
            stealth: card.has_keyword(Keyword::Stealth),
            ready: false,
            has_attacked: false,
            moves_left: 0,
            windfury_used: false,
            strike_used: false,
            arise_used: false,
            synergy: SynergyBonus::default(),
            card: card.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.card.id
    }

    pub fn name(&self) -> &str {
        &self.card.name
    }

    pub fn is_structure(&self) -> bool {
        self.card.is_structure()
    }

    pub fn is_token(&self) -> bool {
        self.card.token
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword) || self.synergy.keywords.contains(&keyword)
    }

    /// Attack including the synergy overlay (per-turn buffs are separate)
    pub fn attack(&self) -> i32 {
        self.atk + self.synergy.atk
    }

    pub fn total_armor(&self) -> i32 {
        self.armor + self.synergy.armor
    }

    pub fn max_health(&self) -> i32 {
        self.max_hp + self.synergy.hp
    }

    /// Base movement including the synergy overlay
    pub fn total_movement(&self) -> u32 {
        self.movement + self.synergy.movement
    }

    pub fn buff_total(&self) -> i32 {
        self.buffs.values().sum()
    }

    pub fn add_buff(&mut self, kind: BuffKind, amount: i32) {
        *self.buffs.entry(kind).or_insert(0) += amount;
    }

    /// Restore health up to the maximum; returns the amount actually healed
    pub fn heal(&mut self, amount: i32) -> i32 {
        if amount <= 0 || self.is_dead() {
            return 0;
        }
        let before = self.hp;
        self.hp = (self.hp + amount).min(self.max_health());
        self.hp - before
    }

    /// Add a keyword, switching on the flag it represents
    pub fn grant_keyword(&mut self, keyword: Keyword) {
        if !self.keywords.contains(&keyword) {
            self.keywords.push(keyword);
        }
        match keyword {
            Keyword::DivineShield => self.shield = true,
            Keyword::Ward => self.ward = true,
            Keyword::Stealth => self.stealth = true,
            _ => {}
        }
    }

    /// Apply a status; a second application of the same kind keeps the
    /// stronger magnitude and the longer duration
    pub fn add_status(&mut self, kind: StatusKind, value: i32, turns: Option<u32>) {
        if let Some(existing) = self.statuses.iter_mut().find(|s| s.kind == kind) {
            existing.value = existing.value.max(value);
            existing.turns = match (existing.turns, turns) {
                (None, _) | (_, None) => None,
                (Some(a), Some(b)) => Some(a.max(b)),
            };
        } else {
            self.statuses.push(StatusEffect { kind, value, turns });
        }
    }

    pub fn has_status(&self, kind: StatusKind) -> bool {
        self.statuses.iter().any(|s| s.kind == kind)
    }

    /// Replace the synergy overlay. Health follows the change in maximum:
    /// a raised maximum adds health, a lowered one only clamps it.
    pub fn set_synergy(&mut self, bonus: SynergyBonus) {
        let delta = bonus.hp - self.synergy.hp;
        self.synergy = bonus;
        if delta > 0 {
            self.hp += delta;
        }
        if self.hp > self.max_health() {
            self.hp = self.max_health().max(1);
        }
    }

    /// Start-of-turn reset for the owner's units
    pub fn refresh(&mut self) {
        if self.frozen {
            self.frozen = false;
            self.ready = false;
        } else {
            self.ready = !self.is_structure();
        }
        self.has_attacked = false;
        self.windfury_used = false;
        self.buffs.clear();
    }
}
