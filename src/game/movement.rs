use crate::card::{Keyword, Race};
use crate::game::death::sweep_dead;
use crate::game::effects::lose_health;
use crate::game::error::ActionError;
use crate::game::events::{AnimationKind, Ctx};
use crate::game::state::{GameState, Phase};
use crate::game::terrain::{GameMap, Pos, Terrain};
use crate::game::unit::UnitInstance;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

/// Movement points a unit pays to enter a tile, `None` if it cannot
pub fn move_cost(map: &GameMap, unit: &UnitInstance, pos: Pos) -> Option<u32> {
    let terrain = map.terrain(pos);
    if unit.has_keyword(Keyword::Flying) {
        return Some(1);
    }
    match terrain {
        Terrain::Water if unit.synergy.no_water_penalty => Some(1),
        Terrain::Forest if unit.card.race == Race::Elf => Some(1),
        _ => terrain.base_move_cost(),
    }
}

/// Cheapest cost to every tile a unit can reach with `budget` points.
/// Occupied tiles can be neither entered nor crossed.
pub fn reachable(state: &GameState, from: Pos, budget: u32) -> BTreeMap<Pos, u32> {
    let mut best = BTreeMap::new();
    let Some(unit) = state.unit(from) else {
        return best;
    };
    best.insert(from, 0);
    let mut queue = BinaryHeap::new();
    queue.push(Reverse((0u32, from)));

    while let Some(Reverse((cost, pos))) = queue.pop() {
        if best.get(&pos).map(|&c| cost > c).unwrap_or(false) {
            continue;
        }
        for next in pos.neighbors() {
            if !state.board.is_empty(next) {
                continue;
            }
            let Some(step) = move_cost(&state.map, unit, next) else {
                continue;
            };
            let total = cost + step;
            if total > budget {
                continue;
            }
            if best.get(&next).map(|&c| total < c).unwrap_or(true) {
                best.insert(next, total);
                queue.push(Reverse((total, next)));
            }
        }
    }
    best
}

fn check_mover(state: &GameState, pos: Pos) -> Result<&UnitInstance, ActionError> {
    state.require_phase(Phase::Movement)?;
    let unit = state.own_unit(pos)?;
    if !unit.ready || unit.frozen || unit.is_structure() || unit.moves_left == 0 {
        return Err(ActionError::NotReady(pos));
    }
    Ok(unit)
}

/// Tiles the unit at `pos` may move to this phase
pub fn valid_moves(state: &GameState, pos: Pos) -> Vec<Pos> {
    match check_mover(state, pos) {
        Ok(unit) => reachable(state, pos, unit.moves_left)
            .into_keys()
            .filter(|p| *p != pos)
            .collect(),
        Err(_) => Vec::new(),
    }
}

pub fn move_unit(
    state: &mut GameState,
    cx: &mut Ctx,
    from: Pos,
    to: Pos,
) -> Result<(), ActionError> {
    let budget = check_mover(state, from)?.moves_left;
    let cost = match reachable(state, from, budget).get(&to) {
        Some(&cost) if to != from => cost,
        _ => return Err(ActionError::IllegalTile(to)),
    };

    let Some(mut unit) = state.board.take(from) else {
        return Err(ActionError::NoUnit(from));
    };
    unit.pos = to;
    unit.moves_left -= cost;
    let name = unit.name().to_string();
    state.board.place(unit);
    state.clear_selection();

    cx.log(state, format!("{} moves {} -> {}", name, from, to));
    cx.animate(AnimationKind::Move, vec![from, to]);
    cx.sfx("move");

    if state.map.terrain(to) == Terrain::Swamp {
        cx.log(state, format!("{} sinks into the swamp", name));
        lose_health(state, cx, to, 1);
        sweep_dead(state, cx);
    }
    Ok(())
}
