use crate::card::{Effect, Trigger};
use crate::game::effects::{apply_effect, free_adjacent, spawn_token, EffectSource};
use crate::game::events::{AnimationKind, Ctx};
use crate::game::state::GameState;
use crate::game::terrain::Pos;

/// Token spawned when an undead-synergy unit dies
pub const RESPAWN_TOKEN: &str = "skeleton";

/// Remove a unit from play.
///
/// Order: a one-time arise brings the unit back at low health; otherwise the
/// deathrattle fires, the card goes to its owner's graveyard (unless the
/// deathrattle returned it to hand) and an undead-synergy unit leaves a
/// skeleton behind.
pub fn destroy_unit(state: &mut GameState, cx: &mut Ctx, pos: Pos) {
    let Some(mut unit) = state.board.take(pos) else {
        return;
    };
    let owner = unit.owner;
    let name = unit.name().to_string();

    if !unit.arise_used {
        if let Some(Effect::RiseAgain { hp }) = cx.abilities.get(Trigger::Arise, unit.id()) {
            unit.arise_used = true;
            unit.hp = (*hp).max(1);
            unit.statuses.clear();
            unit.frozen = false;
            state.board.place(unit);
            cx.log(state, format!("{} rises again!", name));
            cx.sfx("arise");
            return;
        }
    }

    cx.log(state, format!("{} is destroyed", name));
    cx.animate(AnimationKind::Death, vec![pos]);
    cx.sfx("death");

    let mut returned = false;
    match cx.abilities.resolve(Trigger::Deathrattle, unit.id()) {
        Effect::ReturnToHand => {
            let hand = &mut state.players[owner].hand;
            if hand.size() < cx.config.max_hand {
                hand.add_card(unit.card.clone());
                returned = true;
                cx.log(state, format!("{} returns to hand", name));
            }
        }
        effect => {
            if let Err(e) = apply_effect(state, cx, &effect, EffectSource::at(owner, pos)) {
                log::warn!("deathrattle of {} skipped: {}", unit.id(), e);
            }
        }
    }

    if !returned {
        state.players[owner].graveyard.add_card(unit.card.clone());
    }

    if unit.synergy.respawn && !unit.is_token() {
        match free_adjacent(state, pos) {
            Some(tile) => {
                if let Err(e) = spawn_token(state, cx, RESPAWN_TOKEN, owner, tile) {
                    log::warn!("respawn of {} skipped: {}", unit.id(), e);
                }
            }
            None => log::debug!("no room to respawn {}", unit.id()),
        }
    }
}

/// Destroy every unit at or below zero health, repeating until none remain
pub fn sweep_dead(state: &mut GameState, cx: &mut Ctx) {
    loop {
        let dead = state.board.units().find(|u| u.is_dead()).map(|u| u.pos);
        match dead {
            Some(pos) => destroy_unit(state, cx, pos),
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::testutil::Fixture;
    use crate::game::unit::SynergyBonus;

    #[test]
    fn test_destroy_moves_card_to_graveyard() {
        let mut fx = Fixture::new();
        let pos = fx.put("ghoul", 0, Pos::new(3, 1));
        let (state, mut cx) = fx.split();
        destroy_unit(state, &mut cx, pos);
        assert!(state.unit(pos).is_none());
        assert_eq!(state.players[0].graveyard.count_of("ghoul"), 1);
        assert_eq!(state.players[1].graveyard.size(), 0);
    }

    #[test]
    fn test_arise_once() {
        let mut fx = Fixture::new();
        let pos = fx.put("risen_champion", 1, Pos::new(1, 1));
        let (state, mut cx) = fx.split();
        state.unit_mut(pos).unwrap().hp = -3;
        sweep_dead(state, &mut cx);
        let unit = state.unit(pos).unwrap();
        assert_eq!(unit.hp, 1);
        assert!(unit.arise_used);

        state.unit_mut(pos).unwrap().hp = 0;
        sweep_dead(state, &mut cx);
        assert!(state.unit(pos).is_none());
        assert_eq!(state.players[1].graveyard.count_of("risen_champion"), 1);
    }

    #[test]
    fn test_return_to_hand_skips_graveyard() {
        let mut fx = Fixture::new();
        let pos = fx.put("mirror_sprite", 0, Pos::new(3, 3));
        let (state, mut cx) = fx.split();
        destroy_unit(state, &mut cx, pos);
        assert_eq!(state.players[0].hand.cards()[0].id, "mirror_sprite");
        assert_eq!(state.players[0].graveyard.size(), 0);
    }

    #[test]
    fn test_deathrattle_cascade() {
        let mut fx = Fixture::new();
        let golem = fx.put("magma_golem", 0, Pos::new(2, 2));
        let rat = fx.put("plague_rat", 1, Pos::new(2, 3));
        let ally = fx.put("paladin", 0, Pos::new(1, 2));
        let (state, mut cx) = fx.split();
        state.unit_mut(golem).unwrap().hp = 0;
        sweep_dead(state, &mut cx);

        assert!(state.unit(golem).is_none());
        assert!(state.unit(rat).is_none(), "1-hp rat dies to the blast");
        assert_eq!(state.players[1].graveyard.count_of("plague_rat"), 1);
        // the paladin's divine shield eats the blast
        let paladin = state.unit(ally).unwrap();
        assert_eq!(paladin.hp, 5);
        assert!(!paladin.shield);
    }

    #[test]
    fn test_undead_respawn() {
        let mut fx = Fixture::new();
        let pos = fx.put("ghoul", 1, Pos::new(0, 0));
        let (state, mut cx) = fx.split();
        state.unit_mut(pos).unwrap().set_synergy(SynergyBonus {
            respawn: true,
            ..SynergyBonus::default()
        });
        destroy_unit(state, &mut cx, pos);
        let skeleton = state.unit(Pos::new(1, 0)).unwrap();
        assert_eq!(skeleton.id(), RESPAWN_TOKEN);
        assert_eq!(skeleton.owner, 1);
    }
}
