use crate::card::{AbilityRegistry, CardDefinition, Effect, Keyword, Race, TargetKind, Trigger};
use crate::game::death::sweep_dead;
use crate::game::effects::{apply_effect, lose_health, resolve_spell, EffectSource};
use crate::game::error::ActionError;
use crate::game::events::{AnimationKind, Ctx};
use crate::game::state::{GameState, Phase};
use crate::game::synergy::check_surge;
use crate::game::terrain::{Pos, Terrain, COLS, ROWS};
use crate::game::turns::enter_movement;
use crate::game::unit::UnitInstance;

/// Goblins already on the board needed for the goblin discount
pub const GOBLIN_DISCOUNT_AT: usize = 3;

/// Whether a player's spells are discounted by their titan or an own structure
pub fn has_spell_discount(state: &GameState, abilities: &AbilityRegistry, player: usize) -> bool {
    let titan_id = &state.players[player].titan.def.id;
    if abilities.get(Trigger::TitanPassive, titan_id) == Some(&Effect::SpellDiscount) {
        return true;
    }
    state
        .board
        .units()
        .filter(|u| u.owner == player)
        .any(|u| abilities.get(Trigger::Aura, u.id()) == Some(&Effect::SpellDiscount))
}

/// Energy a card costs a player right now, never below zero
pub fn effective_cost(
    state: &GameState,
    abilities: &AbilityRegistry,
    player: usize,
    card: &CardDefinition,
) -> u32 {
    let mut discount = 0;
    if card.element == state.players[player].titan.def.element {
        discount += 1;
    }
    if card.is_spell() && has_spell_discount(state, abilities, player) {
        discount += 1;
    }
    if card.race == Race::Goblin {
        let goblins = state
            .board
            .units()
            .filter(|u| u.owner == player && u.card.race == Race::Goblin)
            .count();
        if goblins >= GOBLIN_DISCOUNT_AT {
            discount += 1;
        }
    }
    card.cost.saturating_sub(discount)
}

/// Rows a player may deploy into. The middle row opens once one of their
/// own units stands on it.
pub fn deploy_rows(state: &GameState, player: usize) -> Vec<usize> {
    let mut rows = if player == 0 {
        vec![ROWS - 2, ROWS - 1]
    } else {
        vec![0, 1]
    };
    let middle = ROWS / 2;
    let holds_middle = (0..COLS).any(|col| {
        state
            .unit(Pos::new(middle, col))
            .map(|u| u.owner == player)
            .unwrap_or(false)
    });
    if holds_middle {
        rows.push(middle);
    }
    rows
}

/// Empty tiles in a player's deploy zone. Mountains only take flyers.
pub fn deploy_zone(state: &GameState, player: usize, flying: bool) -> Vec<Pos> {
    let mut tiles: Vec<Pos> = deploy_rows(state, player)
        .into_iter()
        .flat_map(|row| (0..COLS).map(move |col| Pos::new(row, col)))
        .filter(|p| state.board.is_empty(*p))
        .filter(|p| flying || state.map.terrain(*p) != Terrain::Mountain)
        .collect();
    tiles.sort();
    tiles
}

/// Where a unit or structure card may be placed
pub fn valid_deploy_tiles(state: &GameState, player: usize, card: &CardDefinition) -> Vec<Pos> {
    if card.is_spell() {
        return Vec::new();
    }
    deploy_zone(state, player, card.has_keyword(Keyword::Flying))
}

/// Tiles a spell or ability of the given kind may be pointed at
pub fn targets_for_kind(state: &GameState, player: usize, kind: TargetKind) -> Vec<Pos> {
    let enemy_visible = |u: &UnitInstance| u.owner != player && !u.stealth;
    let tiles: Vec<Pos> = match kind {
        TargetKind::None => Vec::new(),
        TargetKind::Enemy => state
            .board
            .units()
            .filter(|u| enemy_visible(*u))
            .map(|u| u.pos)
            .collect(),
        TargetKind::Friendly => state.board.positions_of(player),
        TargetKind::Any => state
            .board
            .units()
            .filter(|u| u.owner == player || enemy_visible(*u))
            .map(|u| u.pos)
            .collect(),
        TargetKind::EmptyTile => deploy_zone(state, player, false),
    };
    tiles
}

pub fn valid_spell_targets(state: &GameState, player: usize, card: &CardDefinition) -> Vec<Pos> {
    if !card.is_spell() {
        return Vec::new();
    }
    targets_for_kind(state, player, card.target)
}

/// Fire the inspire effect of every friendly inspire unit except `except`
fn trigger_inspire(state: &mut GameState, cx: &mut Ctx, player: usize, except: Option<Pos>) {
    let inspirers: Vec<(Pos, String)> = state
        .board
        .units()
        .filter(|u| u.owner == player && u.has_keyword(Keyword::Inspire) && Some(u.pos) != except)
        .map(|u| (u.pos, u.id().to_string()))
        .collect();
    for (pos, id) in inspirers {
        let effect = cx.abilities.resolve(Trigger::Inspire, &id);
        if let Err(e) = apply_effect(state, cx, &effect, EffectSource::at(player, pos)) {
            log::warn!("inspire of {} skipped: {}", id, e);
        }
    }
}

/// Play the card at `hand_index`. Units and structures go to `pos`; targeted
/// spells aim at `pos`; untargeted spells ignore it.
pub fn deploy_card(
    state: &mut GameState,
    cx: &mut Ctx,
    hand_index: usize,
    pos: Pos,
) -> Result<(), ActionError> {
    state.require_phase(Phase::Deploy)?;
    if state.deploy_left == 0 {
        return Err(ActionError::NoDeploysLeft);
    }
    let player = state.active;
    let card = state.players[player]
        .hand
        .get(hand_index)
        .cloned()
        .ok_or(ActionError::InvalidCard(hand_index))?;
    let cost = effective_cost(state, cx.abilities, player, &card);
    let energy = state.players[player].energy;
    if cost > energy {
        return Err(ActionError::NotEnoughEnergy { need: cost, have: energy });
    }

    let target = if card.is_spell() {
        if card.target.needs_tile() {
            if !valid_spell_targets(state, player, &card).contains(&pos) {
                return Err(ActionError::IllegalTarget(pos));
            }
            Some(pos)
        } else {
            None
        }
    } else {
        if !valid_deploy_tiles(state, player, &card).contains(&pos) {
            return Err(ActionError::IllegalTile(pos));
        }
        Some(pos)
    };

    state.players[player].energy -= cost;
    state.deploy_left -= 1;
    state.players[player].hand.remove_card(hand_index);
    state.clear_selection();

    if card.is_spell() {
        cast_spell(state, cx, player, card, target);
    } else {
        place_unit(state, cx, player, &card, pos);
    }

    sweep_dead(state, cx);
    if state.deploy_left == 0 && state.phase == Phase::Deploy && !state.is_over() {
        enter_movement(state, cx);
    }
    Ok(())
}

fn cast_spell(
    state: &mut GameState,
    cx: &mut Ctx,
    player: usize,
    card: CardDefinition,
    target: Option<Pos>,
) {
    cx.log(state, format!("Player {} casts {}", player + 1, card.name));
    cx.animate(AnimationKind::Spell, target.into_iter().collect());
    let source = EffectSource::player(player).targeting(target);
    if let Err(e) = resolve_spell(state, cx, &card, source) {
        log::warn!("spell {} fizzled: {}", card.id, e);
    }
    state.last_spell = Some(card.clone());
    state.players[player].graveyard.add_card(card);
    trigger_inspire(state, cx, player, None);
}

fn place_unit(state: &mut GameState, cx: &mut Ctx, player: usize, card: &CardDefinition, pos: Pos) {
    let mut unit = UnitInstance::new(card, player, pos);
    if unit.keywords.iter().any(|k| k.grants_readiness()) {
        unit.ready = true;
    }
    state.board.place(unit);
    cx.log(state, format!("Player {} deploys {} at {}", player + 1, card.name, pos));
    cx.animate(AnimationKind::Deploy, vec![pos]);
    cx.sfx("deploy");

    if let Some(effect) = cx.abilities.get(Trigger::Battlecry, &card.id).cloned() {
        if let Err(e) = apply_effect(state, cx, &effect, EffectSource::at(player, pos)) {
            log::warn!("battlecry of {} skipped: {}", card.id, e);
        }
    }
    trigger_inspire(state, cx, player, Some(pos));
    check_surge(state, cx, player, card.race);

    if state.map.terrain(pos) == Terrain::Swamp && state.unit(pos).is_some() {
        cx.log(state, format!("{} sinks into the swamp", card.name));
        lose_health(state, cx, pos, 1);
    }
}
