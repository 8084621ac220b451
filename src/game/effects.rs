//! Primitive state changes (damage, healing, draws, summons) and the
//! interpreter for [`Effect`] descriptors.
//!
//! None of these destroy units. Callers finish with [`sweep_dead`] so every
//! action ends with no unit at or below zero health.
//!
//! [`sweep_dead`]: crate::game::death::sweep_dead

use crate::card::{parse_spell_text, CardDefinition, Effect, GameError, StatusKind, Trigger};
use crate::game::events::{Ctx, GameEvent, NumberKind};
use crate::game::state::GameState;
use crate::game::terrain::{Pos, Terrain};
use crate::game::unit::{BuffKind, UnitInstance};

/// Who an effect belongs to and where it points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectSource {
    pub owner: usize,
    pub pos: Option<Pos>,
    pub target: Option<Pos>,
}

impl EffectSource {
    pub fn player(owner: usize) -> Self {
        EffectSource {
            owner,
            pos: None,
            target: None,
        }
    }

    pub fn at(owner: usize, pos: Pos) -> Self {
        EffectSource {
            owner,
            pos: Some(pos),
            target: None,
        }
    }

    pub fn targeting(mut self, target: Option<Pos>) -> Self {
        self.target = target;
        self
    }
}

/// Deal damage to a unit. Divine shield, then ward, absorbs the whole hit.
/// Returns the health actually lost.
pub fn damage_unit(state: &mut GameState, cx: &mut Ctx, pos: Pos, amount: i32) -> i32 {
    if amount <= 0 {
        return 0;
    }
    let Some(unit) = state.unit_mut(pos) else {
        return 0;
    };
    let name = unit.name().to_string();
    if unit.shield {
        unit.shield = false;
        cx.log(state, format!("{}'s divine shield absorbs the hit", name));
        cx.sfx("shield_break");
        return 0;
    }
    if unit.ward {
        unit.ward = false;
        cx.log(state, format!("{}'s ward absorbs the hit", name));
        cx.sfx("ward_break");
        return 0;
    }
    lose_health(state, cx, pos, amount)
}

/// Health loss that nothing absorbs (status ticks, swamp)
pub fn lose_health(state: &mut GameState, cx: &mut Ctx, pos: Pos, amount: i32) -> i32 {
    let Some(unit) = state.unit_mut(pos) else {
        return 0;
    };
    if amount <= 0 {
        return 0;
    }
    unit.hp -= amount;
    cx.emit(GameEvent::FloatingNumber {
        pos,
        amount,
        kind: NumberKind::Damage,
    });
    amount
}

pub fn heal_unit(state: &mut GameState, cx: &mut Ctx, pos: Pos, amount: i32) -> i32 {
    let healed = state.unit_mut(pos).map(|u| u.heal(amount)).unwrap_or(0);
    if healed > 0 {
        cx.emit(GameEvent::FloatingNumber {
            pos,
            amount: healed,
            kind: NumberKind::Heal,
        });
    }
    healed
}

/// Damage a titan. Reaching zero ends the game for good.
pub fn damage_titan(state: &mut GameState, cx: &mut Ctx, player: usize, amount: i32) {
    if amount <= 0 || state.is_over() {
        return;
    }
    let titan_name = state.players[player].titan.def.name.clone();
    let target = &mut state.players[player];
    target.hp = (target.hp - amount).max(0);
    let remaining = target.hp;
    cx.emit(GameEvent::TitanNumber {
        player,
        amount,
        kind: NumberKind::Damage,
    });
    cx.log(
        state,
        format!("{} takes {} damage ({} left)", titan_name, amount, remaining),
    );
    if remaining == 0 {
        let winner = GameState::opponent(player);
        state.winner = Some(winner);
        state.clear_selection();
        cx.log(state, format!("Player {} wins!", winner + 1));
        cx.emit(GameEvent::Victory { winner });
        cx.sfx("victory");
        log::info!("game over on turn {}: player {} wins", state.turn, winner + 1);
    }
}

pub fn heal_titan(state: &mut GameState, cx: &mut Ctx, player: usize, amount: i32) {
    let target = &mut state.players[player];
    let before = target.hp;
    target.hp = (target.hp + amount).min(target.max_hp());
    let healed = target.hp - before;
    if healed > 0 {
        cx.emit(GameEvent::TitanNumber {
            player,
            amount: healed,
            kind: NumberKind::Heal,
        });
    }
}

/// Draw one card. An empty deck deals fatigue damage that grows with the
/// turn count; a full hand burns the drawn card.
pub fn draw_card(state: &mut GameState, cx: &mut Ctx, player: usize) {
    match state.players[player].deck.draw() {
        None => {
            let fatigue = state
                .turn
                .saturating_sub(cx.config.fatigue_grace_turns)
                .max(1) as i32;
            cx.log(
                state,
                format!("Player {} has no cards left: fatigue {}", player + 1, fatigue),
            );
            damage_titan(state, cx, player, fatigue);
        }
        Some(card) => {
            let hand = &mut state.players[player].hand;
            if hand.size() >= cx.config.max_hand {
                let name = card.name.clone();
                state.players[player].graveyard.add_card(card);
                cx.log(state, format!("Hand full: {} is burned", name));
            } else {
                hand.add_card(card);
            }
        }
    }
}

/// First free, non-mountain neighbour of a tile
pub fn free_adjacent(state: &GameState, pos: Pos) -> Option<Pos> {
    pos.neighbors()
        .find(|p| state.board.is_empty(*p) && state.map.terrain(*p) != Terrain::Mountain)
}

/// Put a token on the board
pub fn spawn_token(
    state: &mut GameState,
    cx: &mut Ctx,
    token_id: &str,
    owner: usize,
    pos: Pos,
) -> Result<(), GameError> {
    let card = cx
        .db
        .get_card(token_id)
        .map_err(|_| GameError::UnknownCard(token_id.to_string()))?;
    if !state.board.is_empty(pos) {
        return Err(GameError::NoFreeTile(pos.to_string()));
    }
    let mut unit = UnitInstance::new(card, owner, pos);
    unit.ready = card.keywords.iter().any(|k| k.grants_readiness());
    let name = unit.name().to_string();
    state.board.place(unit);
    cx.animate(crate::game::events::AnimationKind::Deploy, vec![pos]);
    cx.log(state, format!("{} appears at {}", name, pos));
    Ok(())
}

fn adjacent_units(state: &GameState, pos: Pos) -> Vec<(Pos, usize)> {
    pos.neighbors()
        .filter_map(|p| state.unit(p).map(|u| (p, u.owner)))
        .collect()
}

fn units_of(state: &GameState, owner: usize) -> Vec<Pos> {
    state.board.positions_of(owner)
}

fn need_pos(pos: Option<Pos>, what: &str) -> Result<Pos, GameError> {
    pos.ok_or_else(|| GameError::MissingTarget(what.to_string()))
}

/// Run one effect. Passive descriptors (auras, bonuses) are read where they
/// apply and do nothing here.
pub fn apply_effect(
    state: &mut GameState,
    cx: &mut Ctx,
    effect: &Effect,
    source: EffectSource,
) -> Result<(), GameError> {
    let owner = source.owner;
    let enemy = GameState::opponent(owner);
    match effect {
        Effect::SummonToken { token_id } => {
            let from = need_pos(source.pos, "summon")?;
            let tile = free_adjacent(state, from)
                .ok_or_else(|| GameError::NoFreeTile(from.to_string()))?;
            spawn_token(state, cx, token_id, owner, tile)?;
        }
        Effect::SummonAt { token_id } => {
            let tile = need_pos(source.target, "summon")?;
            spawn_token(state, cx, token_id, owner, tile)?;
        }
        Effect::DrawCards { count } => {
            for _ in 0..*count {
                draw_card(state, cx, owner);
            }
        }
        Effect::HealAdjacentAllies { amount } => {
            let from = need_pos(source.pos, "heal")?;
            for (pos, _) in adjacent_units(state, from)
                .into_iter()
                .filter(|(_, o)| *o == owner)
            {
                heal_unit(state, cx, pos, *amount);
            }
        }
        Effect::DamageAdjacent { amount } => {
            let from = need_pos(source.pos, "blast")?;
            for (pos, _) in adjacent_units(state, from) {
                damage_unit(state, cx, pos, *amount);
            }
        }
        Effect::PoisonAdjacentEnemies { amount, turns } => {
            let from = need_pos(source.pos, "poison")?;
            for (pos, _) in adjacent_units(state, from)
                .into_iter()
                .filter(|(_, o)| *o != owner)
            {
                if let Some(unit) = state.unit_mut(pos) {
                    unit.add_status(StatusKind::Poison, *amount, Some(*turns));
                }
            }
        }
        Effect::BuffSelf { atk } => {
            let from = need_pos(source.pos, "buff")?;
            if let Some(unit) = state.unit_mut(from) {
                unit.add_buff(BuffKind::Inspire, *atk);
            }
        }
        Effect::GainAttack { atk } => {
            let from = need_pos(source.pos, "gain attack")?;
            if let Some(unit) = state.unit_mut(from) {
                unit.atk += atk;
            }
        }
        Effect::HealTitan { amount } => heal_titan(state, cx, owner, *amount),
        Effect::DamageEnemyTitan { amount } => damage_titan(state, cx, enemy, *amount),
        Effect::DamageUnit { amount } => {
            let target = need_pos(source.target, "damage")?;
            damage_unit(state, cx, target, *amount);
        }
        Effect::HealUnit { amount } => {
            let target = need_pos(source.target, "heal")?;
            heal_unit(state, cx, target, *amount);
        }
        Effect::FreezeUnit { damage } => {
            let target = need_pos(source.target, "freeze")?;
            damage_unit(state, cx, target, *damage);
            freeze(state, target);
        }
        Effect::PoisonUnit { amount, turns } => {
            let target = need_pos(source.target, "poison")?;
            if let Some(unit) = state.unit_mut(target) {
                unit.add_status(StatusKind::Poison, *amount, Some(*turns));
            }
        }
        Effect::BuffUnit { atk } => {
            let target = need_pos(source.target, "buff")?;
            if let Some(unit) = state.unit_mut(target) {
                unit.add_buff(BuffKind::Spell, *atk);
            }
        }
        Effect::DamageAllEnemies { amount } => {
            for pos in units_of(state, enemy) {
                damage_unit(state, cx, pos, *amount);
            }
        }
        Effect::HealAllAllies { amount } => {
            for pos in units_of(state, owner) {
                heal_unit(state, cx, pos, *amount);
            }
        }
        Effect::FreezeAllEnemies => {
            for pos in units_of(state, enemy) {
                freeze(state, pos);
            }
        }
        Effect::RecastLastSpell => {
            let spell = state
                .last_spell
                .clone()
                .ok_or_else(|| GameError::MissingTarget("recast".to_string()))?;
            cx.log(state, format!("{} is cast again", spell.name));
            resolve_spell(state, cx, &spell, source)?;
        }
        // Read by destruction, combat, movement and cost rules
        Effect::NoOp
        | Effect::ReturnToHand
        | Effect::RiseAgain { .. }
        | Effect::BonusDamage { .. }
        | Effect::RangeAura { .. }
        | Effect::SpellDiscount
        | Effect::TerrainAura { .. }
        | Effect::ElementMoveBonus { .. } => {}
    }
    Ok(())
}

pub fn freeze(state: &mut GameState, pos: Pos) {
    if let Some(unit) = state.unit_mut(pos) {
        unit.frozen = true;
        unit.ready = false;
    }
}

/// Effects of a spell: its registered effect, or whatever the card text says
pub fn spell_effects(cx: &Ctx, card: &CardDefinition) -> Vec<Effect> {
    match cx.abilities.get(Trigger::Spell, &card.id) {
        Some(effect) => vec![effect.clone()],
        None => parse_spell_text(&card.description, card.target.needs_tile()),
    }
}

pub fn resolve_spell(
    state: &mut GameState,
    cx: &mut Ctx,
    card: &CardDefinition,
    source: EffectSource,
) -> Result<(), GameError> {
    let effects = spell_effects(cx, card);
    if effects.is_empty() {
        log::warn!("spell {} has no effect", card.id);
    }
    for effect in &effects {
        apply_effect(state, cx, effect, source)?;
    }
    cx.sfx("spell");
    Ok(())
}
