//! Click-driven selection. A front end that only knows "a tile was clicked"
//! or "a hand card was clicked" routes through here; everything ends in one
//! of the explicit actions.

use crate::game::combat;
use crate::game::deploy::{deploy_card, valid_deploy_tiles, valid_spell_targets};
use crate::game::error::ActionError;
use crate::game::events::Ctx;
use crate::game::movement;
use crate::game::state::{GameState, Phase, Selection};
use crate::game::terrain::Pos;
use crate::game::titan;

/// Toggle a hand card. Untargeted spells are cast on the spot.
pub fn on_card_click(state: &mut GameState, cx: &mut Ctx, index: usize) -> Result<(), ActionError> {
    state.require_phase(Phase::Deploy)?;
    if matches!(state.selection, Selection::Card(i) | Selection::Spell(i) if i == index) {
        state.clear_selection();
        return Ok(());
    }
    let player = state.active;
    let card = state.players[player]
        .hand
        .get(index)
        .cloned()
        .ok_or(ActionError::InvalidCard(index))?;

    if card.is_spell() {
        if !card.target.needs_tile() {
            return deploy_card(state, cx, index, Pos::new(0, 0));
        }
        let targets = valid_spell_targets(state, player, &card);
        if targets.is_empty() {
            return Err(ActionError::NoTargets);
        }
        state.selection = Selection::Spell(index);
        state.highlights = targets;
    } else {
        state.selection = Selection::Card(index);
        state.highlights = valid_deploy_tiles(state, player, &card);
    }
    Ok(())
}

/// Act on a tile according to the current selection
pub fn on_cell_click(state: &mut GameState, cx: &mut Ctx, pos: Pos) -> Result<(), ActionError> {
    if !pos.in_bounds() {
        return Err(ActionError::IllegalTile(pos));
    }
    match state.selection {
        Selection::Card(index) | Selection::Spell(index) => deploy_card(state, cx, index, pos),
        Selection::TitanAbility => titan::use_ability_at(state, cx, pos),
        Selection::Unit(from) if from == pos => {
            state.clear_selection();
            Ok(())
        }
        Selection::Unit(from) => match state.unit(pos).map(|u| u.owner) {
            Some(owner) if owner == state.active => select_unit(state, cx, pos),
            Some(_) if state.phase == Phase::Combat => combat::attack(state, cx, from, pos),
            None if state.phase == Phase::Movement => movement::move_unit(state, cx, from, pos),
            _ => Err(ActionError::IllegalTile(pos)),
        },
        Selection::None => select_unit(state, cx, pos),
    }
}

fn select_unit(state: &mut GameState, cx: &mut Ctx, pos: Pos) -> Result<(), ActionError> {
    state.own_unit(pos)?;
    let highlights = match state.phase {
        Phase::Movement => movement::valid_moves(state, pos),
        Phase::Combat => combat::valid_targets(state, cx.abilities, pos),
        _ => {
            return Err(ActionError::WrongPhase {
                expected: Phase::Movement,
                actual: state.phase,
            })
        }
    };
    state.selection = Selection::Unit(pos);
    state.highlights = highlights;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::testutil::Fixture;

    #[test]
    fn test_card_toggle_and_deploy() {
        let mut fx = Fixture::new();
        fx.give_hand(0, "ghoul");
        let (state, mut cx) = fx.split();

        on_card_click(state, &mut cx, 0).unwrap();
        assert_eq!(state.selection, Selection::Card(0));
        assert_eq!(state.highlights.len(), 14);
        on_card_click(state, &mut cx, 0).unwrap();
        assert_eq!(state.selection, Selection::None);
        assert!(state.highlights.is_empty());

        on_card_click(state, &mut cx, 0).unwrap();
        on_cell_click(state, &mut cx, Pos::new(4, 2)).unwrap();
        assert_eq!(state.unit(Pos::new(4, 2)).unwrap().id(), "ghoul");
        assert_eq!(state.selection, Selection::None);
        assert_eq!(state.players[0].hand.size(), 0);
    }

    #[test]
    fn test_untargeted_spell_casts_at_once() {
        let mut fx = Fixture::new();
        fx.give_hand(0, "meteor");
        let (state, mut cx) = fx.split();
        let before = state.players[1].hp;
        on_card_click(state, &mut cx, 0).unwrap();
        assert_eq!(state.players[1].hp, before - 5);
        assert_eq!(state.players[0].graveyard.count_of("meteor"), 1);
    }

    #[test]
    fn test_targeted_spell_needs_targets() {
        let mut fx = Fixture::new();
        fx.give_hand(0, "fireball");
        let (state, mut cx) = fx.split();
        assert_eq!(on_card_click(state, &mut cx, 0), Err(ActionError::NoTargets));
        assert_eq!(state.selection, Selection::None);
    }

    #[test]
    fn test_select_and_move() {
        let mut fx = Fixture::new();
        let pos = fx.put("ghoul", 0, Pos::new(4, 3));
        fx.state.phase = Phase::Movement;
        {
            let unit = fx.state.unit_mut(pos).unwrap();
            unit.ready = true;
            unit.moves_left = 2;
        }
        let (state, mut cx) = fx.split();
        on_cell_click(state, &mut cx, pos).unwrap();
        assert_eq!(state.selection, Selection::Unit(pos));
        assert!(state.highlights.contains(&Pos::new(2, 3)));

        on_cell_click(state, &mut cx, Pos::new(2, 3)).unwrap();
        assert!(state.unit(Pos::new(2, 3)).is_some());
        assert_eq!(state.selection, Selection::None);
    }

    #[test]
    fn test_select_and_attack() {
        let mut fx = Fixture::new();
        let pos = fx.put("orc_berserker", 0, Pos::new(3, 3));
        let enemy = fx.put("ghoul", 1, Pos::new(2, 3));
        fx.state.phase = Phase::Combat;
        fx.state.unit_mut(pos).unwrap().ready = true;
        let (state, mut cx) = fx.split();
        on_cell_click(state, &mut cx, pos).unwrap();
        assert_eq!(state.highlights, vec![enemy]);
        on_cell_click(state, &mut cx, enemy).unwrap();
        assert!(state.unit(enemy).is_none());
    }

    #[test]
    fn test_enemy_unit_cannot_be_selected() {
        let mut fx = Fixture::new();
        let enemy = fx.put("ghoul", 1, Pos::new(2, 3));
        fx.state.phase = Phase::Movement;
        let (state, mut cx) = fx.split();
        assert_eq!(
            on_cell_click(state, &mut cx, enemy),
            Err(ActionError::NotYourUnit(enemy))
        );
        assert_eq!(
            on_cell_click(state, &mut cx, Pos::new(9, 9)),
            Err(ActionError::IllegalTile(Pos::new(9, 9)))
        );
    }
}
