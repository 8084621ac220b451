//! Attack legality, damage and resolution.
//!
//! An attack is declared first (the attacker is spent, stealth drops) and
//! applied second. In deferred pacing the two halves are split by a
//! [`Pending::Combat`] that the caller releases with `resume`.

use crate::card::{AbilityRegistry, Effect, Element, Keyword, StatusKind, Trigger};
use crate::config::Pacing;
use crate::game::death::sweep_dead;
use crate::game::effects::{
    apply_effect, damage_titan, damage_unit, freeze, heal_unit, EffectSource,
};
use crate::game::error::ActionError;
use crate::game::events::{AnimationKind, Ctx};
use crate::game::state::{GameState, Pending, Phase, Target};
use crate::game::terrain::{GameMap, Pos, Terrain};
use crate::game::unit::UnitInstance;

/// Turns of poison applied by a poisonous hit
pub const POISON_TURNS: u32 = 2;

/// Range including auras from adjacent friendly structures
pub fn effective_range(state: &GameState, abilities: &AbilityRegistry, pos: Pos) -> u32 {
    let Some(unit) = state.unit(pos) else {
        return 0;
    };
    let aura: u32 = pos
        .neighbors()
        .filter_map(|p| state.unit(p))
        .filter(|u| u.owner == unit.owner)
        .filter_map(|u| match abilities.get(Trigger::Aura, u.id()) {
            Some(Effect::RangeAura { amount }) => Some(*amount),
            _ => None,
        })
        .sum();
    unit.range + aura
}

/// Whether a straight line between two tiles clears every mountain.
///
/// The line is sampled once per step of Manhattan distance, each sample
/// rounded to the nearest tile; the end tiles never block.
pub fn has_line_of_sight(map: &GameMap, from: Pos, to: Pos) -> bool {
    let steps = from.distance(to);
    for i in 1..steps {
        let t = i as f64 / steps as f64;
        let row = from.row as f64 + (to.row as f64 - from.row as f64) * t;
        let col = from.col as f64 + (to.col as f64 - from.col as f64) * t;
        let sample = Pos::new(row.round() as usize, col.round() as usize);
        if sample == from || sample == to {
            continue;
        }
        if map.terrain(sample) == Terrain::Mountain {
            return false;
        }
    }
    true
}

/// Whether `attacker` could strike `defender` ignoring taunt
fn in_reach(
    state: &GameState,
    abilities: &AbilityRegistry,
    attacker: &UnitInstance,
    defender: &UnitInstance,
) -> bool {
    if defender.owner == attacker.owner || defender.stealth {
        return false;
    }
    let range = effective_range(state, abilities, attacker.pos);
    let dist = attacker.pos.distance(defender.pos) as u32;
    if dist == 0 || dist > range {
        return false;
    }
    if range <= 1 {
        let wet = |p: Pos| state.map.terrain(p) == Terrain::Water;
        if !attacker.has_keyword(Keyword::Flying) && (wet(attacker.pos) || wet(defender.pos)) {
            return false;
        }
        if defender.has_keyword(Keyword::Elusive) {
            return false;
        }
    } else if !has_line_of_sight(&state.map, attacker.pos, defender.pos) {
        return false;
    }
    true
}

fn check_attacker(state: &GameState, pos: Pos) -> Result<&UnitInstance, ActionError> {
    state.require_phase(Phase::Combat)?;
    let unit = state.own_unit(pos)?;
    if !unit.ready || unit.has_attacked || unit.frozen || unit.is_structure() {
        return Err(ActionError::NotReady(pos));
    }
    Ok(unit)
}

fn reachable_targets(
    state: &GameState,
    abilities: &AbilityRegistry,
    attacker: &UnitInstance,
) -> Vec<Pos> {
    let candidates: Vec<&UnitInstance> = state
        .board
        .units()
        .filter(|d| in_reach(state, abilities, attacker, d))
        .collect();
    let taunts: Vec<Pos> = candidates
        .iter()
        .filter(|d| d.has_keyword(Keyword::Taunt))
        .map(|d| d.pos)
        .collect();
    if taunts.is_empty() {
        candidates.iter().map(|d| d.pos).collect()
    } else {
        taunts
    }
}

/// Enemy tiles the unit at `pos` may attack. When a taunt unit is among
/// them, only taunt units are returned.
pub fn valid_targets(state: &GameState, abilities: &AbilityRegistry, pos: Pos) -> Vec<Pos> {
    match check_attacker(state, pos) {
        Ok(attacker) => reachable_targets(state, abilities, attacker),
        Err(_) => Vec::new(),
    }
}

fn first_strike_bonus(abilities: &AbilityRegistry, attacker: &UnitInstance) -> i32 {
    if attacker.strike_used {
        return 0;
    }
    match abilities.get(Trigger::FirstStrike, attacker.id()) {
        Some(Effect::BonusDamage { amount }) => *amount,
        _ => 0,
    }
}

/// Damage one unit deals another, never below zero
pub fn calc_damage(
    state: &GameState,
    abilities: &AbilityRegistry,
    attacker: &UnitInstance,
    defender: &UnitInstance,
) -> i32 {
    let from = state.map.tile(attacker.pos);
    let to = state.map.tile(defender.pos);
    let mut dmg = attacker.attack();
    if from.height > to.height {
        dmg += 2;
    } else if from.height < to.height {
        dmg -= 1;
    }
    if attacker.card.element == Element::Fire && from.terrain == Terrain::Volcano {
        dmg += 2;
    }
    dmg += attacker.buff_total();
    dmg -= to.terrain.defense_bonus();
    dmg -= defender.total_armor();
    dmg += first_strike_bonus(abilities, attacker);
    dmg.max(0)
}

/// Declare an attack on the unit at `to`
pub fn attack(state: &mut GameState, cx: &mut Ctx, from: Pos, to: Pos) -> Result<(), ActionError> {
    let attacker = check_attacker(state, from)?;
    if !reachable_targets(state, cx.abilities, attacker).contains(&to) {
        return Err(ActionError::IllegalTarget(to));
    }
    declare(state, cx, from, vec![from, to]);
    settle(state, cx, from, Target::Unit(to));
    Ok(())
}

/// Strike the enemy titan from its back row
pub fn attack_titan(state: &mut GameState, cx: &mut Ctx, from: Pos) -> Result<(), ActionError> {
    let attacker = check_attacker(state, from)?;
    if from.row != GameState::enemy_back_row(attacker.owner) {
        return Err(ActionError::NotOnBackRow(from));
    }
    let taunted = reachable_targets(state, cx.abilities, attacker)
        .iter()
        .filter_map(|p| state.unit(*p))
        .any(|u| u.has_keyword(Keyword::Taunt));
    if taunted {
        return Err(ActionError::Taunted);
    }
    let enemy = GameState::opponent(attacker.owner);
    declare(state, cx, from, vec![from]);
    settle(state, cx, from, Target::Titan(enemy));
    Ok(())
}

fn declare(state: &mut GameState, cx: &mut Ctx, from: Pos, tiles: Vec<Pos>) {
    if let Some(unit) = state.unit_mut(from) {
        unit.has_attacked = true;
        unit.stealth = false;
    }
    state.clear_selection();
    cx.animate(AnimationKind::Attack, tiles);
    cx.sfx("attack");
}

fn settle(state: &mut GameState, cx: &mut Ctx, attacker: Pos, target: Target) {
    match cx.config.pacing {
        Pacing::Immediate => resolve(state, cx, attacker, target),
        Pacing::Deferred => {
            state.pending = Some(Pending::Combat { attacker, target });
            state.animating = true;
        }
    }
}

/// Apply a declared attack
pub fn resolve(state: &mut GameState, cx: &mut Ctx, attacker: Pos, target: Target) {
    match target {
        Target::Unit(pos) => resolve_unit_attack(state, cx, attacker, pos),
        Target::Titan(player) => resolve_titan_attack(state, cx, attacker, player),
    }
    finish_attack(state, cx, attacker);
}

/// One unit hitting another: absorption and on-hit keywords.
/// Returns (damage rolled, health removed).
fn strike(state: &mut GameState, cx: &mut Ctx, from: Pos, to: Pos) -> (i32, i32) {
    let (dmg, bonus) = match (state.unit(from), state.unit(to)) {
        (Some(a), Some(d)) => (
            calc_damage(state, cx.abilities, a, d),
            first_strike_bonus(cx.abilities, a),
        ),
        _ => return (0, 0),
    };
    if let Some(unit) = state.unit_mut(from) {
        if bonus > 0 {
            unit.strike_used = true;
        }
    }
    let dealt = damage_unit(state, cx, to, dmg);
    if dealt > 0 {
        let (poison, chill, lifesteal) = match state.unit(from) {
            Some(a) => (
                a.has_keyword(Keyword::Poison),
                a.has_keyword(Keyword::Freeze),
                a.has_keyword(Keyword::Lifesteal) && !a.is_dead(),
            ),
            None => (false, false, false),
        };
        if poison {
            if let Some(unit) = state.unit_mut(to) {
                unit.add_status(StatusKind::Poison, 1, Some(POISON_TURNS));
            }
        }
        if chill {
            freeze(state, to);
        }
        if lifesteal {
            heal_unit(state, cx, from, dealt);
        }
    }
    (dmg, dealt)
}

fn resolve_unit_attack(state: &mut GameState, cx: &mut Ctx, from: Pos, to: Pos) {
    let (Some(a), Some(d)) = (state.unit(from), state.unit(to)) else {
        log::debug!("attack from {} on {} lost its units", from, to);
        return;
    };
    let (attacker_owner, defender_owner) = (a.owner, d.owner);
    let names = (a.name().to_string(), d.name().to_string());
    let trample = a.has_keyword(Keyword::Trample);
    let hp_before = d.hp;

    let (dmg, dealt) = strike(state, cx, from, to);
    cx.log(state, format!("{} attacks {} for {}", names.0, names.1, dealt));

    if trample && dealt > 0 {
        let excess = dmg - hp_before.max(0);
        if excess > 0 {
            cx.log(state, format!("{} tramples through for {}", names.0, excess));
            damage_titan(state, cx, defender_owner, excess);
        }
    }

    let retaliates = match state.unit(to) {
        Some(d) => {
            !d.is_structure()
                && effective_range(state, cx.abilities, to) >= from.distance(to) as u32
        }
        None => false,
    };
    if retaliates {
        let (_, back) = strike(state, cx, to, from);
        cx.log(state, format!("{} strikes back for {}", names.1, back));
    }

    let killed =
        |state: &GameState, pos: Pos| state.unit(pos).map(|u| u.is_dead()).unwrap_or(false);
    if killed(state, to) {
        credit_kill(state, cx, attacker_owner, from);
    }
    if killed(state, from) {
        credit_kill(state, cx, defender_owner, to);
    }
}

/// Count a kill for the killer's titan and fire the killer's on-kill bonus
fn credit_kill(state: &mut GameState, cx: &mut Ctx, owner: usize, killer: Pos) {
    state.players[owner].titan.kills += 1;
    let id = match state.unit(killer) {
        Some(unit) if !unit.is_dead() => unit.id().to_string(),
        _ => return,
    };
    if let Some(effect) = cx.abilities.get(Trigger::OnKill, &id).cloned() {
        if let Err(e) = apply_effect(state, cx, &effect, EffectSource::at(owner, killer)) {
            log::warn!("on-kill of {} skipped: {}", id, e);
        }
    }
}

fn resolve_titan_attack(state: &mut GameState, cx: &mut Ctx, from: Pos, player: usize) {
    let Some(unit) = state.unit(from) else {
        return;
    };
    let dmg = (unit.attack() + unit.buff_total()).max(0);
    let name = unit.name().to_string();
    cx.log(state, format!("{} strikes the enemy titan", name));
    damage_titan(state, cx, player, dmg);
}

fn finish_attack(state: &mut GameState, cx: &mut Ctx, attacker: Pos) {
    // an attacker that arises from the sweep did not survive
    let survived = state.unit(attacker).map_or(false, |u| !u.is_dead());
    sweep_dead(state, cx);
    if !survived {
        return;
    }
    if let Some(unit) = state.unit_mut(attacker) {
        if unit.has_keyword(Keyword::Windfury) && !unit.windfury_used {
            unit.windfury_used = true;
            unit.has_attacked = false;
        }
    }
}
