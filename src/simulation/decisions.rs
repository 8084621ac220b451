use crate::card::TargetKind;
use crate::game::state::Phase;
use crate::game::terrain::{Pos, COLS};
use crate::game::{Engine, GameState};

/// One call on the engine's public surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Deploy { hand_index: usize, pos: Pos },
    Ability { target: Option<Pos> },
    Ultimate,
    Move { from: Pos, to: Pos },
    Attack { from: Pos, to: Pos },
    AttackTitan { from: Pos },
    Advance,
}

/// Greedy action source for headless games. It only reads the engine's
/// queries and snapshot, like any other front end.
pub struct DecisionEngine;

impl DecisionEngine {
    /// Pick the next action for the active player
    pub fn next_action(engine: &Engine) -> Action {
        let choice = match engine.state().phase {
            Phase::Deploy => Self::choose_deploy(engine),
            Phase::Movement => Self::choose_move(engine),
            Phase::Combat => Self::choose_attack(engine),
            _ => None,
        };
        choice.unwrap_or(Action::Advance)
    }

    /// Ultimate when ready, else the priciest affordable card, else the titan ability
    pub fn choose_deploy(engine: &Engine) -> Option<Action> {
        let state = engine.state();
        let me = state.active_player();
        if me.titan.ultimate_ready() {
            return Some(Action::Ultimate);
        }

        let mut best: Option<(u32, Action)> = None;
        let slots = if state.deploy_left > 0 { me.hand.size() } else { 0 };
        for hand_index in 0..slots {
            let Some(card) = me.hand.get(hand_index) else {
                continue;
            };
            let Some(cost) = engine.effective_cost(hand_index) else {
                continue;
            };
            if cost > me.energy {
                continue;
            }
            let pos = if card.is_spell() {
                if card.target.needs_tile() {
                    let targets = engine.valid_spell_targets(hand_index);
                    match Self::pick_target(state, card.target, &targets) {
                        Some(pos) => pos,
                        None => continue,
                    }
                } else {
                    Pos::new(0, 0)
                }
            } else {
                match Self::frontmost(state.active, &engine.valid_deploy_tiles(hand_index)) {
                    Some(pos) => pos,
                    None => continue,
                }
            };
            if best.map(|(c, _)| cost > c).unwrap_or(true) {
                best = Some((cost, Action::Deploy { hand_index, pos }));
            }
        }
        if let Some((_, action)) = best {
            return Some(action);
        }

        let titan = &me.titan;
        if titan.active_used || me.energy < titan.def.active_cost {
            return None;
        }
        let kind = engine.titan_ability_target_kind();
        let target = if kind.needs_tile() {
            Some(Self::pick_target(state, kind, &engine.titan_ability_targets())?)
        } else {
            None
        };
        Some(Action::Ability { target })
    }

    /// Step a unit closer to the enemy, only when it strictly gains ground
    pub fn choose_move(engine: &Engine) -> Option<Action> {
        let state = engine.state();
        let player = state.active;
        for from in state.board.positions_of(player) {
            let current = Self::pressure(state, player, from);
            let best = engine
                .valid_moves(from)
                .into_iter()
                .map(|to| (Self::pressure(state, player, to), to))
                .min();
            if let Some((score, to)) = best {
                if score < current {
                    return Some(Action::Move { from, to });
                }
            }
        }
        None
    }

    /// Attack the weakest reachable enemy, or the titan from its back row
    pub fn choose_attack(engine: &Engine) -> Option<Action> {
        let state = engine.state();
        let player = state.active;
        for from in state.board.positions_of(player) {
            let weakest = engine
                .valid_targets(from)
                .into_iter()
                .filter_map(|to| state.unit(to).map(|u| (u.hp, to)))
                .min();
            if let Some((_, to)) = weakest {
                return Some(Action::Attack { from, to });
            }
        }
        let back_row = GameState::enemy_back_row(player);
        state
            .board
            .units()
            .filter(|u| u.owner == player && u.pos.row == back_row)
            .filter(|u| u.ready && !u.has_attacked && !u.frozen && !u.is_structure())
            .filter(|u| engine.valid_targets(u.pos).is_empty())
            .map(|u| Action::AttackTitan { from: u.pos })
            .next()
    }

    /// Distance to the nearest enemy unit or the enemy back row
    fn pressure(state: &GameState, player: usize, pos: Pos) -> usize {
        let to_row = pos.row.abs_diff(GameState::enemy_back_row(player));
        state
            .board
            .units()
            .filter(|u| u.owner != player && !u.stealth)
            .map(|u| u.pos.distance(pos))
            .min()
            .map_or(to_row, |d| d.min(to_row))
    }

    /// Tile nearest the enemy, centre columns first
    fn frontmost(player: usize, tiles: &[Pos]) -> Option<Pos> {
        let centre = COLS / 2;
        tiles.iter().copied().min_by_key(|p| {
            let depth = if player == 0 { p.row } else { usize::MAX - p.row };
            (depth, p.col.abs_diff(centre))
        })
    }

    /// Enemies: the lowest health. Friends: the most wounded. Empty tiles: the front.
    fn pick_target(state: &GameState, kind: TargetKind, targets: &[Pos]) -> Option<Pos> {
        match kind {
            TargetKind::EmptyTile => Self::frontmost(state.active, targets),
            TargetKind::Friendly => targets.iter().copied().max_by_key(|p| {
                state
                    .unit(*p)
                    .map(|u| u.max_health() - u.hp)
                    .unwrap_or(0)
            }),
            _ => targets
                .iter()
                .copied()
                .filter(|p| state.unit(*p).map(|u| u.owner != state.active).unwrap_or(false))
                .min_by_key(|p| state.unit(*p).map(|u| u.hp).unwrap_or(i32::MAX)),
        }
    }
}
