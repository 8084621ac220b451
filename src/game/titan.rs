//! Titan passives, the costed active ability and the kill-gated ultimate.

use crate::card::{AbilityRegistry, Effect, TargetKind, Trigger};
use crate::game::death::sweep_dead;
use crate::game::deploy::targets_for_kind;
use crate::game::effects::{apply_effect, EffectSource};
use crate::game::error::ActionError;
use crate::game::events::Ctx;
use crate::game::state::{GameState, Phase, Selection};
use crate::game::terrain::Pos;
use crate::game::unit::BuffKind;

/// Terrain attack auras from the titan's passive
pub fn apply_passive_auras(state: &mut GameState, cx: &mut Ctx, player: usize) {
    let titan_id = state.players[player].titan.def.id.clone();
    let aura = cx.abilities.get(Trigger::TitanPassive, &titan_id);
    if let Some(Effect::TerrainAura { terrain, atk }) = aura {
        let map = &state.map;
        for unit in state.board.units_mut() {
            if unit.owner == player && !unit.is_structure() && map.terrain(unit.pos) == *terrain {
                unit.add_buff(BuffKind::Terrain, *atk);
            }
        }
    }
}

/// What the active ability needs to be pointed at. A recast borrows the
/// target kind of the spell it copies.
pub fn ability_target_kind(
    state: &GameState,
    abilities: &AbilityRegistry,
    player: usize,
) -> TargetKind {
    let titan = &state.players[player].titan.def;
    match abilities.resolve(Trigger::TitanActive, &titan.id) {
        Effect::RecastLastSpell => state
            .last_spell
            .as_ref()
            .map(|spell| spell.target)
            .unwrap_or(TargetKind::None),
        _ => titan.active_target,
    }
}

pub fn ability_targets(state: &GameState, abilities: &AbilityRegistry, player: usize) -> Vec<Pos> {
    targets_for_kind(state, player, ability_target_kind(state, abilities, player))
}

fn check_ability(state: &GameState, cx: &Ctx) -> Result<(), ActionError> {
    state.require_phase(Phase::Deploy)?;
    let player = state.active_player();
    if player.titan.active_used {
        return Err(ActionError::AbilityUsed);
    }
    let need = player.titan.def.active_cost;
    if player.energy < need {
        return Err(ActionError::NotEnoughEnergy {
            need,
            have: player.energy,
        });
    }
    let effect = cx.abilities.resolve(Trigger::TitanActive, &player.titan.def.id);
    if effect == Effect::RecastLastSpell && state.last_spell.is_none() {
        return Err(ActionError::NoSpellToRecast);
    }
    Ok(())
}

/// Activate the titan's ability. Untargeted abilities resolve at once;
/// targeted ones enter the ability selection mode.
pub fn activate_ability(state: &mut GameState, cx: &mut Ctx) -> Result<(), ActionError> {
    check_ability(state, cx)?;
    let player = state.active;
    if ability_target_kind(state, cx.abilities, player).needs_tile() {
        let targets = ability_targets(state, cx.abilities, player);
        if targets.is_empty() {
            return Err(ActionError::NoTargets);
        }
        state.selection = Selection::TitanAbility;
        state.highlights = targets;
        return Ok(());
    }
    resolve_ability(state, cx, None);
    Ok(())
}

/// Use the titan's ability on a tile
pub fn use_ability_at(state: &mut GameState, cx: &mut Ctx, pos: Pos) -> Result<(), ActionError> {
    check_ability(state, cx)?;
    let player = state.active;
    let kind = ability_target_kind(state, cx.abilities, player);
    let target = if kind.needs_tile() {
        if !ability_targets(state, cx.abilities, player).contains(&pos) {
            return Err(ActionError::IllegalTarget(pos));
        }
        Some(pos)
    } else {
        None
    };
    resolve_ability(state, cx, target);
    Ok(())
}

fn resolve_ability(state: &mut GameState, cx: &mut Ctx, target: Option<Pos>) {
    let player = state.active;
    let titan = &mut state.players[player].titan;
    titan.active_used = true;
    let (id, name) = (titan.def.id.clone(), titan.def.name.clone());
    let cost = titan.def.active_cost;
    state.players[player].energy -= cost;
    state.clear_selection();

    cx.log(state, format!("{} uses its ability", name));
    cx.sfx("titan_ability");
    let effect = cx.abilities.resolve(Trigger::TitanActive, &id);
    let source = EffectSource::player(player).targeting(target);
    if let Err(e) = apply_effect(state, cx, &effect, source) {
        log::warn!("ability of {} fizzled: {}", id, e);
    }
    sweep_dead(state, cx);
}

/// Fire the once-per-game ultimate, unlocked by enough kills
pub fn activate_ultimate(state: &mut GameState, cx: &mut Ctx) -> Result<(), ActionError> {
    state.require_phase(Phase::Deploy)?;
    let player = state.active;
    let titan = &state.players[player].titan;
    if titan.ultimate_used {
        return Err(ActionError::UltimateUsed);
    }
    if titan.kills < titan.def.ultimate_kills {
        return Err(ActionError::UltimateLocked {
            kills: titan.kills,
            needed: titan.def.ultimate_kills,
        });
    }

    let titan = &mut state.players[player].titan;
    titan.ultimate_used = true;
    let (id, name) = (titan.def.id.clone(), titan.def.name.clone());
    state.clear_selection();
    cx.log(state, format!("{} unleashes its ultimate!", name));
    cx.sfx("titan_ultimate");
    let effect = cx.abilities.resolve(Trigger::TitanUltimate, &id);
    if let Err(e) = apply_effect(state, cx, &effect, EffectSource::player(player)) {
        log::warn!("ultimate of {} fizzled: {}", id, e);
    }
    sweep_dead(state, cx);
    Ok(())
}
