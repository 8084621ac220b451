use crate::card::VeteranEffect;
use crate::game::events::{Ctx, GameEvent};
use crate::game::state::GameState;
use crate::game::terrain::Pos;
use crate::game::unit::UnitInstance;

/// Experience cap, and the highest veteran level
pub const MAX_XP: u8 = 3;

/// Give a unit one experience point and promote it for every threshold it
/// has newly reached. The level never goes down, so each promotion fires once.
pub fn gain_xp(state: &mut GameState, cx: &mut Ctx, pos: Pos) {
    let Some(unit) = state.unit_mut(pos) else {
        return;
    };
    unit.xp = (unit.xp + 1).min(MAX_XP);

    let mut promoted = Vec::new();
    while unit.level < unit.xp {
        unit.level += 1;
        let effects = unit.card.veteran_effects(unit.level).to_vec();
        for effect in &effects {
            apply_veteran_effect(unit, effect);
        }
        promoted.push((unit.level, unit.name().to_string()));
    }

    for (level, name) in promoted {
        cx.emit(GameEvent::VeteranPromoted { pos, level });
        cx.sfx("promote");
        cx.log(state, format!("{} reaches veteran level {}", name, level));
    }
}

pub fn apply_veteran_effect(unit: &mut UnitInstance, effect: &VeteranEffect) {
    match effect {
        VeteranEffect::StatBuff {
            atk,
            hp,
            movement,
            armor,
        } => {
            unit.atk += atk;
            unit.max_hp += hp;
            unit.hp += hp;
            unit.movement = (unit.movement as i32 + movement).max(0) as u32;
            unit.armor += armor;
        }
        VeteranEffect::AddStatus { status, value } => {
            unit.add_status(*status, *value, None);
        }
        VeteranEffect::MinRange { range } => {
            unit.range = unit.range.max(*range);
        }
        VeteranEffect::GrantKeyword { keyword } => unit.grant_keyword(*keyword),
    }
}
