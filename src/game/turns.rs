use crate::card::{Effect, Keyword, StatusKind, Trigger};
use crate::config::Pacing;
use crate::game::death::sweep_dead;
use crate::game::effects::{apply_effect, draw_card, heal_unit, lose_health, EffectSource};
use crate::game::error::ActionError;
use crate::game::events::{Ctx, GameEvent};
use crate::game::progression::gain_xp;
use crate::game::state::{GameState, Pending, Phase};
use crate::game::synergy;
use crate::game::terrain::Pos;
use crate::game::titan;

/// Start the active player's turn: Refresh, then Draw, then wait in Deploy
pub fn begin_turn(state: &mut GameState, cx: &mut Ctx) {
    refresh_phase(state, cx);
    if state.is_over() {
        return;
    }
    draw_phase(state, cx);
    if state.is_over() {
        return;
    }
    state.phase = Phase::Deploy;
}

/// Refresh: energy, deploy budget, unit readiness, status ticks, auras, synergy
pub fn refresh_phase(state: &mut GameState, cx: &mut Ctx) {
    state.phase = Phase::Refresh;
    state.clear_selection();
    let player = state.active;
    cx.log(
        state,
        format!("--- Turn {}: Player {} ---", state.turn, player + 1),
    );

    state.players[player].energy = cx.config.max_energy;
    state.players[player].titan.active_used = false;
    state.deploy_left = cx.config.deploys_per_turn;

    for unit in state.board.units_mut().filter(|u| u.owner == player) {
        unit.refresh();
    }
    tick_statuses(state, cx, player);
    sweep_dead(state, cx);

    titan::apply_passive_auras(state, cx, player);
    synergy::recompute(state, player);
}

/// Regen heals, poison and bleed hurt; timed statuses count down
fn tick_statuses(state: &mut GameState, cx: &mut Ctx, player: usize) {
    for pos in state.board.positions_of(player) {
        let statuses = match state.unit(pos) {
            Some(unit) => unit.statuses.clone(),
            None => continue,
        };
        for status in &statuses {
            match status.kind {
                StatusKind::Regen => {
                    heal_unit(state, cx, pos, status.value);
                }
                StatusKind::Poison | StatusKind::Bleed => {
                    lose_health(state, cx, pos, status.value);
                }
            }
        }
        if let Some(unit) = state.unit_mut(pos) {
            for status in unit.statuses.iter_mut() {
                if let Some(turns) = status.turns.as_mut() {
                    *turns = turns.saturating_sub(1);
                }
            }
            unit.statuses.retain(|s| s.turns != Some(0));
        }
    }
}

pub fn draw_phase(state: &mut GameState, cx: &mut Ctx) {
    state.phase = Phase::Draw;
    let player = state.active;
    draw_card(state, cx, player);
}

/// Movement: every active unit gets its movement allowance
pub fn enter_movement(state: &mut GameState, cx: &mut Ctx) {
    state.phase = Phase::Movement;
    state.clear_selection();
    let player = state.active;
    let bonus = match cx.abilities.get(Trigger::TitanPassive, &state.players[player].titan.def.id) {
        Some(Effect::ElementMoveBonus { element, amount }) => Some((*element, *amount)),
        _ => None,
    };
    for unit in state.board.units_mut().filter(|u| u.owner == player) {
        if unit.is_structure() {
            unit.moves_left = 0;
            continue;
        }
        let mut moves = unit.total_movement();
        if unit.has_keyword(Keyword::Swift) {
            moves += 1;
        }
        if let Some((element, amount)) = bonus {
            if unit.card.element == element {
                moves += amount;
            }
        }
        unit.moves_left = moves;
    }
    cx.log(state, "Movement phase");
}

pub fn enter_combat(state: &mut GameState, cx: &mut Ctx) {
    state.phase = Phase::Combat;
    state.clear_selection();
    cx.log(state, "Combat phase");
}

/// End: experience, end-of-turn auras, then hand the turn over
pub fn end_phase(state: &mut GameState, cx: &mut Ctx) {
    state.phase = Phase::End;
    state.clear_selection();
    let player = state.active;

    let veterans: Vec<Pos> = state
        .board
        .units()
        .filter(|u| u.owner == player && !u.is_token() && !u.is_structure())
        .map(|u| u.pos)
        .collect();
    for pos in veterans {
        gain_xp(state, cx, pos);
    }

    let auras: Vec<(Pos, String)> = state
        .board
        .units()
        .filter(|u| u.owner == player)
        .map(|u| (u.pos, u.id().to_string()))
        .collect();
    for (pos, id) in auras {
        if let Some(effect) = cx.abilities.get(Trigger::EndOfTurn, &id).cloned() {
            if let Err(e) = apply_effect(state, cx, &effect, EffectSource::at(player, pos)) {
                log::warn!("end-of-turn effect of {} skipped: {}", id, e);
            }
        }
    }
    for unit in state.board.units_mut().filter(|u| u.owner == player) {
        unit.moves_left = 0;
    }
    sweep_dead(state, cx);
    if state.is_over() {
        return;
    }

    state.turn += 1;
    state.active = GameState::opponent(player);
    state.phase = Phase::Refresh;
    cx.emit(GameEvent::TurnTransition {
        turn: state.turn,
        player: state.active,
    });

    match cx.config.pacing {
        Pacing::Immediate => begin_turn(state, cx),
        Pacing::Deferred => {
            state.pending = Some(Pending::TurnStart);
            state.animating = true;
        }
    }
}

/// Move from the current waiting phase to the next one
pub fn advance_phase(state: &mut GameState, cx: &mut Ctx) -> Result<(), ActionError> {
    match state.phase {
        Phase::Deploy => enter_movement(state, cx),
        Phase::Movement => enter_combat(state, cx),
        Phase::Combat => end_phase(state, cx),
        Phase::Refresh | Phase::Draw | Phase::End => return Err(ActionError::Busy),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::game::testutil::Fixture;

    #[test]
    fn test_begin_turn_lands_in_deploy() {
        let mut fx = Fixture::new();
        fx.give_deck(0, &["ghoul"]);
        let (state, mut cx) = fx.split();
        state.players[0].energy = 0;
        state.deploy_left = 0;
        begin_turn(state, &mut cx);
        assert_eq!(state.phase, Phase::Deploy);
        assert_eq!(state.players[0].energy, 10);
        assert_eq!(state.deploy_left, 3);
        assert_eq!(state.players[0].hand.size(), 1);

        advance_phase(state, &mut cx).unwrap();
        assert_eq!(state.phase, Phase::Movement);
    }

    #[test]
    fn test_refresh_ticks_statuses() {
        let mut fx = Fixture::new();
        let pos = fx.put("paladin", 0, Pos::new(3, 3));
        let doomed = fx.put("plague_rat", 0, Pos::new(3, 4));
        let (state, mut cx) = fx.split();
        {
            let unit = state.unit_mut(pos).unwrap();
            unit.add_status(StatusKind::Poison, 2, Some(1));
        }
        state
            .unit_mut(doomed)
            .unwrap()
            .add_status(StatusKind::Poison, 1, Some(3));
        refresh_phase(state, &mut cx);

        let paladin = state.unit(pos).unwrap();
        assert_eq!(paladin.hp, 3, "poison ignores divine shield");
        assert!(paladin.statuses.is_empty());
        assert!(state.unit(doomed).is_none());
    }

    #[test]
    fn test_frozen_unit_thaws_but_waits() {
        let mut fx = Fixture::new();
        let pos = fx.put("ghoul", 0, Pos::new(3, 3));
        let (state, mut cx) = fx.split();
        state.unit_mut(pos).unwrap().frozen = true;
        refresh_phase(state, &mut cx);
        let unit = state.unit(pos).unwrap();
        assert!(!unit.frozen);
        assert!(!unit.ready);
    }

    #[test]
    fn test_movement_allowance() {
        let mut fx = Fixture::with_titans("thalassa", "pyra");
        let ranger = fx.put("elf_ranger", 0, Pos::new(3, 0));
        let tide = fx.put("tide_caller", 0, Pos::new(3, 1));
        let ghoul = fx.put("ghoul", 0, Pos::new(3, 2));
        let (state, mut cx) = fx.split();
        enter_movement(state, &mut cx);
        assert_eq!(state.unit(ranger).unwrap().moves_left, 3);
        assert_eq!(state.unit(tide).unwrap().moves_left, 3);
        assert_eq!(state.unit(ghoul).unwrap().moves_left, 2);
    }

    #[test]
    fn test_end_turn_flips_player_and_awards_xp() {
        let mut fx = Fixture::new();
        let pos = fx.put("ghoul", 0, Pos::new(3, 3));
        let token = fx.put("skeleton", 0, Pos::new(3, 4));
        let (state, mut cx) = fx.split();
        state.phase = Phase::Combat;
        advance_phase(state, &mut cx).unwrap();

        assert_eq!(state.active, 1);
        assert_eq!(state.turn, 2);
        assert_eq!(state.phase, Phase::Deploy);
        assert_eq!(state.unit(pos).unwrap().xp, 1);
        assert_eq!(state.unit(token).unwrap().xp, 0);
        assert!(cx
            .events
            .contains(&GameEvent::TurnTransition { turn: 2, player: 1 }));
    }

    #[test]
    fn test_structures_gain_no_xp() {
        let mut fx = Fixture::new();
        let tower = fx.put("watchtower", 0, Pos::new(4, 2));
        let ghoul = fx.put("ghoul", 0, Pos::new(3, 3));
        let (state, mut cx) = fx.split();
        for _ in 0..3 {
            state.active = 0;
            end_phase(state, &mut cx);
        }
        assert_eq!(state.unit(ghoul).unwrap().xp, 3);
        let tower = state.unit(tower).unwrap();
        assert_eq!((tower.xp, tower.level), (0, 0));
    }

    #[test]
    fn test_deferred_turn_start_waits() {
        let config = EngineConfig {
            pacing: Pacing::Deferred,
            ..EngineConfig::default()
        };
        let mut fx = Fixture::with_config(config);
        let (state, mut cx) = fx.split();
        state.phase = Phase::Combat;
        advance_phase(state, &mut cx).unwrap();
        assert_eq!(state.active, 1);
        assert_eq!(state.phase, Phase::Refresh);
        assert_eq!(state.pending, Some(Pending::TurnStart));
        assert!(state.animating);
    }

    #[test]
    fn test_end_of_turn_healing() {
        let mut fx = Fixture::new();
        fx.put("healing_shrine", 0, Pos::new(4, 3));
        let ally = fx.put("paladin", 0, Pos::new(3, 3));
        let (state, mut cx) = fx.split();
        state.unit_mut(ally).unwrap().hp = 1;
        end_phase(state, &mut cx);
        assert_eq!(state.unit(ally).unwrap().hp, 3);
    }
}
