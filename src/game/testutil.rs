//! Shared setup for rule tests: a quiet board in the Deploy phase.

use crate::card::{AbilityRegistry, CardDatabase, CardDefinition};
use crate::config::EngineConfig;
use crate::game::events::{Ctx, GameEvent};
use crate::game::player::PlayerState;
use crate::game::state::{GameState, Phase};
use crate::game::terrain::{GameMap, Pos};
use crate::game::unit::UnitInstance;
use crate::game::zones::Deck;

pub struct Fixture {
    pub db: CardDatabase,
    pub abilities: AbilityRegistry,
    pub config: EngineConfig,
    pub events: Vec<GameEvent>,
    pub state: GameState,
}

impl Fixture {
    /// Pyra (player 0) against Thalassa on a flat map, both with 10 energy
    pub fn new() -> Self {
        Self::build("pyra", "thalassa", GameMap::flat("test"), EngineConfig::default())
    }

    pub fn with_map(map: GameMap) -> Self {
        Self::build("pyra", "thalassa", map, EngineConfig::default())
    }

    pub fn with_titans(first: &str, second: &str) -> Self {
        Self::build(first, second, GameMap::flat("test"), EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::build("pyra", "thalassa", GameMap::flat("test"), config)
    }

    fn build(first: &str, second: &str, map: GameMap, config: EngineConfig) -> Self {
        let db = CardDatabase::builtin().unwrap();
        let player = |id: &str| {
            let titan = db.get_titan(id).unwrap().clone();
            let mut player = PlayerState::new(titan, Deck::new(Vec::new()));
            player.energy = 10;
            player
        };
        let players = [player(first), player(second)];
        let mut state = GameState::new(map, 0, players);
        state.phase = Phase::Deploy;
        state.deploy_left = config.deploys_per_turn;
        Fixture {
            db,
            abilities: AbilityRegistry::new(),
            config,
            events: Vec::new(),
            state,
        }
    }

    pub fn card(&self, id: &str) -> CardDefinition {
        self.db.get_card(id).unwrap().clone()
    }

    /// A fresh unit that is not on the board
    pub fn unit(&self, id: &str, owner: usize) -> UnitInstance {
        UnitInstance::new(&self.card(id), owner, Pos::new(0, 0))
    }

    /// Place a unit as if deployed on an earlier turn but not yet refreshed
    pub fn put(&mut self, id: &str, owner: usize, pos: Pos) -> Pos {
        let unit = UnitInstance::new(&self.card(id), owner, pos);
        self.state.board.place(unit);
        pos
    }

    pub fn give_hand(&mut self, player: usize, id: &str) {
        let card = self.card(id);
        self.state.players[player].hand.add_card(card);
    }

    pub fn give_deck(&mut self, player: usize, ids: &[&str]) {
        let cards = ids.iter().map(|id| self.card(id)).collect();
        self.state.players[player].deck = Deck::new(cards);
    }

    /// Borrow the state and a rule context side by side
    pub fn split(&mut self) -> (&mut GameState, Ctx<'_>) {
        let Fixture {
            db,
            abilities,
            config,
            events,
            state,
        } = self;
        (
            state,
            Ctx {
                db,
                abilities,
                config,
                events,
            },
        )
    }
}
