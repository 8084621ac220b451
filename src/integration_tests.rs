//! End-to-end tests through the engine's public surface, plus property
//! tests over random action sequences.

use crate::card::CardDatabase;
use crate::config::EngineConfig;
use crate::game::combat::calc_damage;
use crate::game::testutil::Fixture;
use crate::game::{
    ActionError, Engine, GameEvent, GameMap, GameSetup, Hand, Phase, Pos, Terrain, Tile,
    UnitInstance, COLS, ROWS,
};
use crate::simulation::engine::{run_game, MAX_TURNS};
use proptest::prelude::*;
use std::sync::Arc;

fn database() -> Arc<CardDatabase> {
    Arc::new(CardDatabase::builtin().expect("Failed to load cards"))
}

/// Pyra against Thalassa on a flat map with unshuffled decks
fn flat_game() -> Engine {
    let mut config = EngineConfig::default().with_seed(12345);
    config.shuffle_decks = false;
    let setup = GameSetup::new("pyra", "thalassa").custom_map(GameMap::flat("flat"));
    Engine::start_game(database(), config, setup).expect("Failed to start game")
}

fn set_hand(engine: &mut Engine, player: usize, ids: &[&str]) {
    let cards: Vec<_> = ids
        .iter()
        .map(|id| engine.database().get_card(id).unwrap().clone())
        .collect();
    let hand = &mut engine.state_mut().players[player].hand;
    *hand = Hand::new();
    for card in cards {
        hand.add_card(card);
    }
}

/// Drop a ready unit straight onto the board
fn place(engine: &mut Engine, id: &str, owner: usize, pos: Pos) {
    let card = engine.database().get_card(id).unwrap().clone();
    let mut unit = UnitInstance::new(&card, owner, pos);
    unit.ready = true;
    engine.state_mut().board.place(unit);
}

fn end_turn(engine: &mut Engine) {
    while engine.state().phase != Phase::Combat {
        engine.advance_phase().unwrap();
    }
    engine.advance_phase().unwrap();
}

#[test]
fn test_game_opens_in_deploy_and_advances_to_movement() {
    let mut engine = flat_game();
    let state = engine.state();
    assert_eq!(state.phase, Phase::Deploy);
    assert_eq!(state.active, 0);
    assert_eq!(state.players[0].energy, 10);
    assert_eq!(state.deploy_left, 3);

    engine.advance_phase().unwrap();
    assert_eq!(engine.state().phase, Phase::Movement);
    engine.advance_phase().unwrap();
    assert_eq!(engine.state().phase, Phase::Combat);
    engine.advance_phase().unwrap();

    let state = engine.state();
    assert_eq!(state.phase, Phase::Deploy, "next turn runs straight into Deploy");
    assert_eq!(state.active, 1);
    assert_eq!(state.players[1].energy, 10);
}

#[test]
fn test_element_discount_on_deploy() {
    let mut engine = flat_game();
    set_hand(&mut engine, 0, &["ember_archer", "goblin_raider", "orc_berserker"]);
    assert_eq!(engine.effective_cost(0), Some(1));
    assert_eq!(engine.effective_cost(1), Some(0), "discount floors at zero");
    assert_eq!(engine.effective_cost(2), Some(3));

    engine.deploy_card(0, Pos::new(4, 3)).unwrap();
    assert_eq!(engine.state().players[0].energy, 9);
    assert_eq!(engine.state().unit(Pos::new(4, 3)).unwrap().id(), "ember_archer");

    engine.deploy_card(0, Pos::new(4, 4)).unwrap();
    assert_eq!(engine.state().players[0].energy, 9);
}

#[test]
fn test_plain_attacker_into_hill_defender() {
    let mut engine = flat_game();
    let hill = Pos::new(2, 3);
    engine.state_mut().map.set_tile(
        hill,
        Tile {
            terrain: Terrain::Hill,
            height: 1,
        },
    );
    place(&mut engine, "orc_berserker", 0, Pos::new(3, 3));
    place(&mut engine, "orc_berserker", 1, hill);
    engine.advance_phase().unwrap();
    engine.advance_phase().unwrap();

    engine.attack(Pos::new(3, 3), hill).unwrap();
    // 3 attack, -1 for striking uphill, -1 hill defense
    assert_eq!(engine.state().unit(hill).unwrap().hp, 2);
    // 3 attack, +2 from above: the attacker dies to the answer
    assert!(engine.state().unit(Pos::new(3, 3)).is_none());
    assert_eq!(engine.state().players[0].graveyard.count_of("orc_berserker"), 1);
    assert_eq!(engine.state().players[1].titan.kills, 1);
}

#[test]
fn test_armored_defender_on_builtin_hill() {
    let mut config = EngineConfig::default().with_seed(12345);
    config.shuffle_decks = false;
    let setup = GameSetup::new("pyra", "thalassa").map(0);
    let mut engine = Engine::start_game(database(), config, setup).unwrap();
    let hill = Pos::new(1, 2);
    let plain = Pos::new(2, 2);
    assert_eq!(engine.state().map.terrain(hill), Terrain::Hill);
    assert_eq!(engine.state().map.terrain(plain), Terrain::Plain);

    place(&mut engine, "orc_berserker", 0, plain);
    place(&mut engine, "orc_berserker", 1, hill);
    engine.state_mut().unit_mut(hill).unwrap().armor = 1;
    engine.advance_phase().unwrap();
    engine.advance_phase().unwrap();

    engine.attack(plain, hill).unwrap();
    // 3 attack, -1 hill defense, -1 armor
    assert_eq!(engine.state().unit(hill).unwrap().hp, 2);
}

#[test]
fn test_veteran_promotes_once_per_threshold() {
    let mut engine = flat_game();
    let pos = Pos::new(4, 0);
    place(&mut engine, "orc_berserker", 0, pos);
    engine.take_events();

    let mut levels = Vec::new();
    for _ in 0..5 {
        end_turn(&mut engine);
        levels.push(engine.state().unit(pos).unwrap().level);
        end_turn(&mut engine);
    }
    assert_eq!(levels, vec![1, 2, 3, 3, 3]);

    let promotions = engine
        .take_events()
        .into_iter()
        .filter(|e| matches!(e, GameEvent::VeteranPromoted { .. }))
        .count();
    assert_eq!(promotions, 3);
}

#[test]
fn test_victory_is_terminal() {
    let mut engine = flat_game();
    engine.state_mut().players[1].hp = 2;
    place(&mut engine, "orc_berserker", 0, Pos::new(0, 3));
    engine.advance_phase().unwrap();
    engine.advance_phase().unwrap();

    engine.attack_titan(Pos::new(0, 3)).unwrap();
    assert!(engine.is_over());
    assert_eq!(engine.winner(), Some(0));
    assert!(engine
        .take_events()
        .iter()
        .any(|e| matches!(e, GameEvent::Victory { winner: 0 })));

    let before = engine.snapshot();
    assert_eq!(engine.advance_phase(), Err(ActionError::GameOver));
    assert_eq!(engine.deploy_card(0, Pos::new(4, 0)), Err(ActionError::GameOver));
    assert_eq!(engine.resume(), Err(ActionError::GameOver));
    assert_eq!(engine.snapshot(), before);
}

#[test]
fn test_deployed_unit_ends_in_graveyard_once() {
    let mut engine = flat_game();
    set_hand(&mut engine, 0, &["ember_archer"]);
    engine.deploy_card(0, Pos::new(4, 3)).unwrap();
    place(&mut engine, "kraken_spawn", 1, Pos::new(3, 3));
    end_turn(&mut engine);

    engine.advance_phase().unwrap();
    engine.advance_phase().unwrap();
    engine.attack(Pos::new(3, 3), Pos::new(4, 3)).unwrap();

    let me = &engine.state().players[0];
    assert!(engine.state().unit(Pos::new(4, 3)).is_none());
    assert_eq!(me.graveyard.count_of("ember_archer"), 1);
    assert!(me.hand.cards().iter().all(|c| c.id != "ember_archer"));
}

#[test]
fn test_move_spends_path_cost() {
    let mut engine = flat_game();
    engine.state_mut().map.set_tile(
        Pos::new(3, 3),
        Tile {
            terrain: Terrain::Forest,
            height: 0,
        },
    );
    place(&mut engine, "orc_berserker", 0, Pos::new(4, 3));
    engine.advance_phase().unwrap();
    assert_eq!(engine.state().unit(Pos::new(4, 3)).unwrap().moves_left, 2);

    let moves = engine.valid_moves(Pos::new(4, 3));
    assert!(moves.contains(&Pos::new(3, 3)));
    assert!(!moves.contains(&Pos::new(2, 3)), "forest eats the whole budget");

    engine.move_unit(Pos::new(4, 3), Pos::new(3, 3)).unwrap();
    assert_eq!(engine.state().unit(Pos::new(3, 3)).unwrap().moves_left, 0);
    assert_eq!(
        engine.move_unit(Pos::new(3, 3), Pos::new(2, 3)),
        Err(ActionError::NotReady(Pos::new(3, 3)))
    );
}

#[test]
fn test_every_matchup_finishes() {
    let db = database();
    let titans = ["pyra", "thalassa", "sylvara", "arcanus", "morthis"];
    let config = EngineConfig::default();
    for (i, first) in titans.iter().enumerate() {
        let second = titans[(i + 1) % titans.len()];
        let setup = GameSetup::new(first, second).map(i % 3);
        let result = run_game(db.clone(), &config, setup, i as u64, false).unwrap();
        assert!(result.turns <= MAX_TURNS);
        assert!(result.titan_hp.iter().all(|hp| *hp <= 32));
    }
}

#[test]
fn test_same_seed_produces_same_result() {
    let db = database();
    let config = EngineConfig::default();
    let result1 = run_game(db.clone(), &config, GameSetup::new("sylvara", "pyra"), 54321, false);
    let result2 = run_game(db, &config, GameSetup::new("sylvara", "pyra"), 54321, false);
    assert_eq!(result1.unwrap(), result2.unwrap(), "Same seed should produce the same game");
}

fn any_pos() -> impl Strategy<Value = Pos> {
    (0..ROWS, 0..COLS).prop_map(|(row, col)| Pos::new(row, col))
}

#[derive(Debug, Clone)]
enum Step {
    Advance,
    Deploy(usize, Pos),
    Move(Pos, Pos),
    Attack(Pos, Pos),
    AttackTitan(Pos),
    Ability(Pos),
    CellClick(Pos),
    CardClick(usize),
}

fn any_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        2 => Just(Step::Advance),
        3 => (0..8usize, any_pos()).prop_map(|(i, p)| Step::Deploy(i, p)),
        2 => (any_pos(), any_pos()).prop_map(|(a, b)| Step::Move(a, b)),
        2 => (any_pos(), any_pos()).prop_map(|(a, b)| Step::Attack(a, b)),
        1 => any_pos().prop_map(Step::AttackTitan),
        1 => any_pos().prop_map(Step::Ability),
        2 => any_pos().prop_map(Step::CellClick),
        1 => (0..8usize).prop_map(Step::CardClick),
    ]
}

fn apply_step(engine: &mut Engine, step: &Step) -> Result<(), ActionError> {
    match *step {
        Step::Advance => engine.advance_phase(),
        Step::Deploy(i, p) => engine.deploy_card(i, p),
        Step::Move(a, b) => engine.move_unit(a, b),
        Step::Attack(a, b) => engine.attack(a, b),
        Step::AttackTitan(a) => engine.attack_titan(a),
        Step::Ability(p) => match engine.activate_titan_ability() {
            Ok(()) if engine.state().selection == crate::game::Selection::TitanAbility => {
                engine.use_titan_ability_at(p)
            }
            other => other,
        },
        Step::CellClick(p) => engine.on_cell_click(p),
        Step::CardClick(i) => engine.on_card_click(i),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_resources_stay_in_bounds(
        seed in any::<u64>(),
        titans in (0..5usize, 0..5usize),
        map in 0..3usize,
        steps in prop::collection::vec(any_step(), 1..120),
    ) {
        let ids = ["pyra", "thalassa", "sylvara", "arcanus", "morthis"];
        let config = EngineConfig::default().with_seed(seed);
        let setup = GameSetup::new(ids[titans.0], ids[titans.1]).map(map);
        let mut engine = Engine::start_game(database(), config, setup).unwrap();

        for step in &steps {
            if engine.is_over() {
                break;
            }
            let before = engine.snapshot();
            let result = apply_step(&mut engine, step);
            let state = engine.state();

            for unit in state.board.units() {
                prop_assert!(unit.hp > 0, "{} left on the board at {} hp", unit.id(), unit.hp);
            }
            if let (Step::Move(from, to), Ok(())) = (step, &result) {
                let budget = before.unit(*from).map_or(0, |u| u.moves_left);
                let left = state.unit(*to).map_or(0, |u| u.moves_left);
                prop_assert!(left < budget, "a move spends at most what is left");
            }
            for player in &state.players {
                prop_assert!(player.energy <= 10);
                prop_assert!(player.hand.size() <= 8);
            }
            if result.is_err() {
                prop_assert_eq!(&state.board, &before.board);
                prop_assert_eq!(state.phase, before.phase);
                prop_assert_eq!(
                    [state.players[0].energy, state.players[1].energy],
                    [before.players[0].energy, before.players[1].energy]
                );
            }
        }
    }

    #[test]
    fn prop_damage_never_negative_and_height_helps(
        attacker in prop::sample::select(vec!["goblin_raider", "ghoul", "orc_berserker", "sapling"]),
        defender in prop::sample::select(vec!["dwarf_shieldwall", "treant_guardian", "reef_guard", "watchtower"]),
        height in 1..4i32,
        terrain in prop::sample::select(vec![Terrain::Plain, Terrain::Hill, Terrain::Forest, Terrain::Ruins]),
        armor in 0..4i32,
    ) {
        let mut fx = Fixture::new();
        let from = fx.put(attacker, 0, Pos::new(3, 3));
        let to = fx.put(defender, 1, Pos::new(2, 3));
        fx.state.map.set_tile(to, Tile { terrain, height });
        fx.state.unit_mut(to).unwrap().armor += armor;

        let mut dealt = Vec::new();
        for attacker_height in [height - 1, height, height + 1] {
            fx.state.map.set_tile(from, Tile { terrain: Terrain::Plain, height: attacker_height });
            let (a, d) = (fx.state.unit(from).unwrap(), fx.state.unit(to).unwrap());
            dealt.push(calc_damage(&fx.state, &fx.abilities, a, d));
        }
        prop_assert!(dealt.iter().all(|d| *d >= 0));
        prop_assert!(dealt[0] <= dealt[1] && dealt[1] <= dealt[2], "{:?}", dealt);
    }
}
