//! Race synergy: three of a race unlock a tier-1 bonus, five add tier 2.
//!
//! The bonus is an overlay on each unit that is rebuilt from scratch on every
//! pass, so running the pass twice changes nothing.

use crate::card::{Keyword, Race, Trigger};
use crate::game::effects::{apply_effect, EffectSource};
use crate::game::events::Ctx;
use crate::game::state::GameState;
use crate::game::unit::SynergyBonus;
use std::collections::BTreeMap;

pub const TIER_ONE: usize = 3;
pub const TIER_TWO: usize = 5;

fn tier_one(race: Race, bonus: &mut SynergyBonus) {
    match race {
        Race::Human => bonus.hp += 1,
        Race::Elf | Race::Beast => bonus.movement += 1,
        Race::Goblin | Race::Orc => bonus.atk += 1,
        Race::Merfolk => bonus.no_water_penalty = true,
        Race::Undead => bonus.respawn = true,
        Race::Dwarf | Race::Construct => bonus.armor += 1,
        Race::Dragon => bonus.hp += 1,
        Race::None => {}
    }
}

fn tier_two(race: Race, bonus: &mut SynergyBonus) {
    match race {
        Race::Human | Race::Merfolk | Race::Beast => bonus.atk += 1,
        Race::Elf => bonus.keywords.push(Keyword::Elusive),
        Race::Goblin => bonus.hp += 1,
        Race::Undead => bonus.keywords.push(Keyword::Lifesteal),
        Race::Dwarf | Race::Construct => bonus.hp += 2,
        Race::Orc => bonus.keywords.push(Keyword::Trample),
        Race::Dragon => bonus.atk += 2,
        Race::None => {}
    }
}

/// The overlay a unit of `race` gets when its owner controls `count` of them
pub fn bonus_for(race: Race, count: usize) -> SynergyBonus {
    let mut bonus = SynergyBonus::default();
    if race == Race::None {
        return bonus;
    }
    if count >= TIER_ONE {
        tier_one(race, &mut bonus);
    }
    if count >= TIER_TWO {
        tier_two(race, &mut bonus);
    }
    bonus
}

/// Units per race a player controls (structures and race-less units excluded)
pub fn race_counts(state: &GameState, player: usize) -> BTreeMap<Race, usize> {
    let mut counts = BTreeMap::new();
    for unit in state.board.units() {
        if unit.owner == player && !unit.is_structure() && unit.card.race != Race::None {
            *counts.entry(unit.card.race).or_insert(0) += 1;
        }
    }
    counts
}

/// Rebuild the synergy overlay of every unit a player controls
pub fn recompute(state: &mut GameState, player: usize) {
    let counts = race_counts(state, player);
    for unit in state.board.units_mut().filter(|u| u.owner == player) {
        let count = counts.get(&unit.card.race).copied().unwrap_or(0);
        let bonus = if unit.is_structure() {
            SynergyBonus::default()
        } else {
            bonus_for(unit.card.race, count)
        };
        unit.set_synergy(bonus);
    }
}

/// Fire a race's one-shot surge the first time its count reaches five
pub fn check_surge(state: &mut GameState, cx: &mut Ctx, player: usize, race: Race) {
    if race == Race::None || state.players[player].surged_races.contains(&race) {
        return;
    }
    let count = race_counts(state, player).get(&race).copied().unwrap_or(0);
    if count < TIER_TWO {
        return;
    }
    state.players[player].surged_races.insert(race);
    let Some(effect) = cx.abilities.get(Trigger::RaceSurge, race.name()).cloned() else {
        return;
    };
    cx.log(
        state,
        format!("Player {} rallies five {} units!", player + 1, race.name()),
    );
    cx.sfx("surge");
    if let Err(e) = apply_effect(state, cx, &effect, EffectSource::player(player)) {
        log::warn!("{} surge skipped: {}", race.name(), e);
    }
}
