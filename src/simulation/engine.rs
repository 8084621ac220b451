use crate::card::CardDatabase;
use crate::config::EngineConfig;
use crate::game::{ActionError, Engine, GameEvent, GameSetup, SetupError};
use crate::simulation::decisions::{Action, DecisionEngine};
use std::sync::Arc;

/// Turn cap for headless matches; games that reach it are draws
pub const MAX_TURNS: u32 = 60;

/// Actions one player may take before the runner forces the phase on
const MAX_ACTIONS_PER_TURN: usize = 64;

/// Result of a single headless match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    /// Winning player, None when the turn cap was hit
    pub winner: Option<usize>,
    pub turns: u32,
    pub titan_hp: [i32; 2],
    /// Accepted actions, phase advances included
    pub actions: usize,
}

/// Play one match between two greedy sides
pub fn run_game(
    db: Arc<CardDatabase>,
    config: &EngineConfig,
    setup: GameSetup,
    seed: u64,
    verbose: bool,
) -> Result<GameResult, SetupError> {
    let config = config.clone().with_seed(seed);
    let mut engine = Engine::start_game(db, config, setup)?;
    let mut actions = 0;
    let mut turn_actions = 0;
    let mut last_turn = engine.state().turn;

    if verbose {
        println!("=== Seed {} ===", seed);
    }

    while !engine.is_over() && engine.state().turn <= MAX_TURNS {
        if let Some(delay) = engine.pending_delay() {
            // a watched match is paced like the board would be
            if verbose {
                std::thread::sleep(delay);
            }
            engine.resume().ok();
            print_log(&mut engine, verbose);
            continue;
        }

        if engine.state().turn != last_turn {
            last_turn = engine.state().turn;
            turn_actions = 0;
        }

        let action = if turn_actions >= MAX_ACTIONS_PER_TURN {
            Action::Advance
        } else {
            DecisionEngine::next_action(&engine)
        };
        match apply(&mut engine, action) {
            Ok(()) => actions += 1,
            Err(e) if action == Action::Advance => {
                log::warn!("phase advance rejected on turn {}: {}", engine.state().turn, e);
                break;
            }
            Err(e) => {
                log::debug!("{:?} rejected: {}", action, e);
                if engine.advance_phase().is_ok() {
                    actions += 1;
                }
            }
        }
        turn_actions += 1;
        print_log(&mut engine, verbose);
    }

    let state = engine.state();
    let result = GameResult {
        winner: engine.winner(),
        turns: state.turn.min(MAX_TURNS),
        titan_hp: [state.players[0].hp, state.players[1].hp],
        actions,
    };
    if verbose {
        match result.winner {
            Some(p) => println!("Player {} wins on turn {}", p + 1, result.turns),
            None => println!("Draw after {} turns", result.turns),
        }
    }
    Ok(result)
}

/// Carry out one decision through the engine's public surface
pub fn apply(engine: &mut Engine, action: Action) -> Result<(), ActionError> {
    match action {
        Action::Deploy { hand_index, pos } => engine.deploy_card(hand_index, pos),
        Action::Ability { target: Some(pos) } => engine.use_titan_ability_at(pos),
        Action::Ability { target: None } => engine.activate_titan_ability(),
        Action::Ultimate => engine.activate_titan_ultimate(),
        Action::Move { from, to } => engine.move_unit(from, to),
        Action::Attack { from, to } => engine.attack(from, to),
        Action::AttackTitan { from } => engine.attack_titan(from),
        Action::Advance => engine.advance_phase(),
    }
}

fn print_log(engine: &mut Engine, verbose: bool) {
    let events = engine.take_events();
    if !verbose {
        return;
    }
    for event in events {
        if let GameEvent::Log { message } = event {
            println!("  {}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Pacing;

    fn db() -> Arc<CardDatabase> {
        Arc::new(CardDatabase::builtin().expect("Failed to load cards"))
    }

    #[test]
    fn test_game_terminates() {
        let result = run_game(
            db(),
            &EngineConfig::default(),
            GameSetup::new("pyra", "sylvara"),
            7,
            false,
        )
        .unwrap();
        assert!(result.turns <= MAX_TURNS);
        assert!(result.actions > 0);
        if let Some(winner) = result.winner {
            assert!(result.titan_hp[1 - winner] <= 0);
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let db = db();
        let config = EngineConfig::default();
        let a = run_game(db.clone(), &config, GameSetup::new("morthis", "arcanus"), 99, false);
        let b = run_game(db, &config, GameSetup::new("morthis", "arcanus"), 99, false);
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[test]
    fn test_deferred_pacing_matches_immediate() {
        let db = db();
        let immediate = EngineConfig::default();
        let deferred = EngineConfig {
            pacing: Pacing::Deferred,
            ..EngineConfig::default()
        };
        let a = run_game(db.clone(), &immediate, GameSetup::new("pyra", "morthis"), 3, false);
        let b = run_game(db, &deferred, GameSetup::new("pyra", "morthis"), 3, false);
        // parked resolutions are resumed before the next decision
        assert_eq!(a.unwrap().actions, b.unwrap().actions);
    }

    #[test]
    fn test_setup_errors_propagate() {
        let result = run_game(
            db(),
            &EngineConfig::default(),
            GameSetup::new("pyra", "nobody"),
            1,
            false,
        );
        assert!(matches!(result, Err(SetupError::UnknownTitan(_))));
    }
}
