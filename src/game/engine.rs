//! The game session: owns the state, routes every action through the rules
//! and hands events to observers.

use crate::card::{AbilityRegistry, CardDatabase, CardDefinition, TargetKind};
use crate::config::EngineConfig;
use crate::game::error::{ActionError, SetupError};
use crate::game::events::{Ctx, EventSink, GameEvent};
use crate::game::player::PlayerState;
use crate::game::state::{GameState, Pending};
use crate::game::terrain::{builtin_map, GameMap, Pos};
use crate::game::zones::Deck;
use crate::game::{combat, deploy, input, movement, titan, turns};
use crate::rng::GameRng;
use std::sync::Arc;
use std::time::Duration;

/// Who plays, where, with what
#[derive(Debug, Clone)]
pub struct GameSetup {
    pub titans: [String; 2],
    pub map_index: usize,
    /// Card ids per player. Empty means the titan's default deck.
    pub decks: [Vec<String>; 2],
    pub custom_map: Option<GameMap>,
}

impl GameSetup {
    pub fn new(first: &str, second: &str) -> Self {
        GameSetup {
            titans: [first.to_string(), second.to_string()],
            map_index: 0,
            decks: [Vec::new(), Vec::new()],
            custom_map: None,
        }
    }

    pub fn map(mut self, index: usize) -> Self {
        self.map_index = index;
        self
    }

    pub fn custom_map(mut self, map: GameMap) -> Self {
        self.custom_map = Some(map);
        self
    }

    pub fn decks(mut self, first: Vec<String>, second: Vec<String>) -> Self {
        self.decks = [first, second];
        self
    }
}

pub struct Engine {
    db: Arc<CardDatabase>,
    abilities: AbilityRegistry,
    config: EngineConfig,
    rng: GameRng,
    state: GameState,
    /// Events not yet taken; only kept while nobody is subscribed
    events: Vec<GameEvent>,
    /// Events already handed to observers
    dispatched: usize,
    observers: Vec<Box<dyn EventSink + Send>>,
}

impl Engine {
    /// Build a new game and play it up to the first player's Deploy phase
    pub fn start_game(
        db: Arc<CardDatabase>,
        config: EngineConfig,
        setup: GameSetup,
    ) -> Result<Engine, SetupError> {
        let mut rng = GameRng::new(config.seed);
        let players = [
            build_player(&db, &config, &mut rng.fork(), &setup.titans[0], &setup.decks[0])?,
            build_player(&db, &config, &mut rng.fork(), &setup.titans[1], &setup.decks[1])?,
        ];

        let map = match setup.custom_map {
            Some(map) => map,
            None => {
                builtin_map(setup.map_index).ok_or(SetupError::UnknownMap(setup.map_index))?
            }
        };
        log::info!(
            "starting {} vs {} on {} (seed {})",
            players[0].titan.def.id,
            players[1].titan.def.id,
            map.name,
            rng.seed()
        );

        let mut engine = Engine {
            db,
            abilities: AbilityRegistry::new(),
            config,
            rng,
            state: GameState::new(map, setup.map_index, players),
            events: Vec::new(),
            dispatched: 0,
            observers: Vec::new(),
        };
        engine.open_game();
        Ok(engine)
    }

    fn open_game(&mut self) {
        let opening = self.config.opening_hand;
        let (state, mut cx) = self.split();
        for player in state.players.iter_mut() {
            for _ in 0..opening {
                match player.deck.draw() {
                    Some(card) => player.hand.add_card(card),
                    None => break,
                }
            }
        }
        let names = (
            state.players[0].titan.def.name.clone(),
            state.players[1].titan.def.name.clone(),
        );
        let map_name = state.map.name.clone();
        cx.log(state, format!("{} vs {} on {}", names.0, names.1, map_name));
        turns::begin_turn(state, &mut cx);
        self.dispatch();
    }

    fn split(&mut self) -> (&mut GameState, Ctx<'_>) {
        (
            &mut self.state,
            Ctx {
                db: self.db.as_ref(),
                abilities: &self.abilities,
                config: &self.config,
                events: &mut self.events,
            },
        )
    }

    fn dispatch(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        for event in &self.events[self.dispatched..] {
            for observer in self.observers.iter_mut() {
                observer.on_event(event);
            }
        }
        self.events.clear();
        self.dispatched = 0;
    }

    /// Run one action: reject when over or busy, log rejections, hand out events
    fn act<F>(&mut self, action: F) -> Result<(), ActionError>
    where
        F: FnOnce(&mut GameState, &mut Ctx) -> Result<(), ActionError>,
    {
        if self.state.is_over() {
            return Err(ActionError::GameOver);
        }
        if self.state.animating || self.state.pending.is_some() {
            return Err(ActionError::Busy);
        }
        let (state, mut cx) = self.split();
        let result = action(state, &mut cx);
        if let Err(e) = &result {
            log::debug!("rejected on turn {}: {}", state.turn, e);
            if !e.is_silent() {
                cx.log(state, e.to_string());
            }
        }
        self.dispatch();
        result
    }

    pub fn advance_phase(&mut self) -> Result<(), ActionError> {
        self.act(turns::advance_phase)
    }

    /// Finish a parked combat or turn start
    pub fn resume(&mut self) -> Result<(), ActionError> {
        if self.state.is_over() {
            return Err(ActionError::GameOver);
        }
        let pending = self.state.pending.take().ok_or(ActionError::NothingPending)?;
        self.state.animating = false;
        let (state, mut cx) = self.split();
        match pending {
            Pending::Combat { attacker, target } => {
                combat::resolve(state, &mut cx, attacker, target)
            }
            Pending::TurnStart => turns::begin_turn(state, &mut cx),
        }
        self.dispatch();
        Ok(())
    }

    /// How long a front end should hold the parked resolution on screen
    pub fn pending_delay(&self) -> Option<Duration> {
        let ms = match self.state.pending.as_ref()? {
            Pending::Combat { .. } => self.config.combat_delay_ms,
            Pending::TurnStart => self.config.turn_overlay_ms,
        };
        Some(Duration::from_millis(ms))
    }

    pub fn deploy_card(&mut self, hand_index: usize, pos: Pos) -> Result<(), ActionError> {
        self.act(|state, cx| deploy::deploy_card(state, cx, hand_index, pos))
    }

    pub fn move_unit(&mut self, from: Pos, to: Pos) -> Result<(), ActionError> {
        self.act(|state, cx| movement::move_unit(state, cx, from, to))
    }

    pub fn attack(&mut self, from: Pos, to: Pos) -> Result<(), ActionError> {
        self.act(|state, cx| combat::attack(state, cx, from, to))
    }

    pub fn attack_titan(&mut self, from: Pos) -> Result<(), ActionError> {
        self.act(|state, cx| combat::attack_titan(state, cx, from))
    }

    pub fn activate_titan_ability(&mut self) -> Result<(), ActionError> {
        self.act(titan::activate_ability)
    }

    pub fn use_titan_ability_at(&mut self, pos: Pos) -> Result<(), ActionError> {
        self.act(|state, cx| titan::use_ability_at(state, cx, pos))
    }

    pub fn activate_titan_ultimate(&mut self) -> Result<(), ActionError> {
        self.act(titan::activate_ultimate)
    }

    pub fn on_cell_click(&mut self, pos: Pos) -> Result<(), ActionError> {
        self.act(|state, cx| input::on_cell_click(state, cx, pos))
    }

    pub fn on_card_click(&mut self, index: usize) -> Result<(), ActionError> {
        self.act(|state, cx| input::on_card_click(state, cx, index))
    }

    pub fn valid_moves(&self, pos: Pos) -> Vec<Pos> {
        movement::valid_moves(&self.state, pos)
    }

    pub fn valid_targets(&self, pos: Pos) -> Vec<Pos> {
        combat::valid_targets(&self.state, &self.abilities, pos)
    }

    fn hand_card(&self, hand_index: usize) -> Option<&CardDefinition> {
        self.state.active_player().hand.get(hand_index)
    }

    pub fn valid_deploy_tiles(&self, hand_index: usize) -> Vec<Pos> {
        match self.hand_card(hand_index) {
            Some(card) => deploy::valid_deploy_tiles(&self.state, self.state.active, card),
            None => Vec::new(),
        }
    }

    pub fn valid_spell_targets(&self, hand_index: usize) -> Vec<Pos> {
        match self.hand_card(hand_index) {
            Some(card) => deploy::valid_spell_targets(&self.state, self.state.active, card),
            None => Vec::new(),
        }
    }

    /// What the active titan's ability must be pointed at right now
    pub fn titan_ability_target_kind(&self) -> TargetKind {
        titan::ability_target_kind(&self.state, &self.abilities, self.state.active)
    }

    pub fn titan_ability_targets(&self) -> Vec<Pos> {
        titan::ability_targets(&self.state, &self.abilities, self.state.active)
    }

    /// What the active player would pay for a hand card right now
    pub fn effective_cost(&self, hand_index: usize) -> Option<u32> {
        let card = self.hand_card(hand_index)?;
        Some(deploy::effective_cost(
            &self.state,
            &self.abilities,
            self.state.active,
            card,
        ))
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// A detached copy of the whole state
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.state)
    }

    /// Drain the events produced since the last call. Empty once an
    /// observer is subscribed.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.dispatched = 0;
        std::mem::take(&mut self.events)
    }

    /// Hand every later event to `sink`. From then on events are no longer
    /// buffered, so call `take_events` first to keep the backlog.
    pub fn subscribe(&mut self, sink: impl EventSink + Send + 'static) {
        self.dispatched = self.events.len();
        self.observers.push(Box::new(sink));
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn database(&self) -> &CardDatabase {
        &self.db
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    pub fn winner(&self) -> Option<usize> {
        self.state.winner
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}

fn build_player(
    db: &CardDatabase,
    config: &EngineConfig,
    rng: &mut GameRng,
    titan_id: &str,
    deck_ids: &[String],
) -> Result<PlayerState, SetupError> {
    let titan = db
        .get_titan(titan_id)
        .map_err(|_| SetupError::UnknownTitan(titan_id.to_string()))?
        .clone();
    let ids = if deck_ids.is_empty() {
        &titan.deck
    } else {
        deck_ids
    };
    let cards = ids
        .iter()
        .map(|id| {
            db.get_card(id)
                .cloned()
                .map_err(|_| SetupError::UnknownCard(id.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let mut deck = Deck::new(cards);
    if config.shuffle_decks {
        deck.shuffle(rng);
    }
    Ok(PlayerState::new(titan, deck))
}
