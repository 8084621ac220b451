use crate::card::CardDefinition;
use crate::game::error::ActionError;
use crate::game::player::PlayerState;
use crate::game::terrain::{GameMap, Pos, COLS, ROWS};
use crate::game::unit::UnitInstance;
use serde::{Deserialize, Serialize};

/// Turn phases, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Refresh,
    Draw,
    Deploy,
    Movement,
    Combat,
    End,
}

impl Phase {
    pub fn next(&self) -> Phase {
        match self {
            Phase::Refresh => Phase::Draw,
            Phase::Draw => Phase::Deploy,
            Phase::Deploy => Phase::Movement,
            Phase::Movement => Phase::Combat,
            Phase::Combat => Phase::End,
            Phase::End => Phase::Refresh,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Phase::Refresh => 0,
            Phase::Draw => 1,
            Phase::Deploy => 2,
            Phase::Movement => 3,
            Phase::Combat => 4,
            Phase::End => 5,
        }
    }
}

/// What the caller currently has selected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    None,
    Card(usize),
    Unit(Pos),
    Spell(usize),
    TitanAbility,
}

/// What an attack is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Unit(Pos),
    Titan(usize),
}

/// A resolution parked until `resume`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pending {
    Combat { attacker: Pos, target: Target },
    TurnStart,
}

/// 5×7 grid of optional units, row-major
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Vec<Option<UnitInstance>>,
}

impl Board {
    pub fn new() -> Self {
        Board {
            cells: vec![None; ROWS * COLS],
        }
    }

    fn index(pos: Pos) -> Option<usize> {
        pos.in_bounds().then(|| pos.row * COLS + pos.col)
    }

    pub fn get(&self, pos: Pos) -> Option<&UnitInstance> {
        Self::index(pos).and_then(|i| self.cells[i].as_ref())
    }

    pub fn get_mut(&mut self, pos: Pos) -> Option<&mut UnitInstance> {
        Self::index(pos).and_then(|i| self.cells[i].as_mut())
    }

    pub fn is_empty(&self, pos: Pos) -> bool {
        pos.in_bounds() && self.get(pos).is_none()
    }

    /// Put a unit on its own position, returning whatever was there
    pub fn place(&mut self, unit: UnitInstance) -> Option<UnitInstance> {
        let i = Self::index(unit.pos)?;
        self.cells[i].replace(unit)
    }

    pub fn take(&mut self, pos: Pos) -> Option<UnitInstance> {
        Self::index(pos).and_then(|i| self.cells[i].take())
    }

    pub fn units(&self) -> impl Iterator<Item = &UnitInstance> {
        self.cells.iter().flatten()
    }

    pub fn units_mut(&mut self) -> impl Iterator<Item = &mut UnitInstance> {
        self.cells.iter_mut().flatten()
    }

    /// Positions of a player's units, row-major
    pub fn positions_of(&self, owner: usize) -> Vec<Pos> {
        self.units()
            .filter(|u| u.owner == owner)
            .map(|u| u.pos)
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Complete game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub map: GameMap,
    pub map_index: usize,
    pub turn: u32,
    pub active: usize,
    pub phase: Phase,
    pub deploy_left: u32,
    pub selection: Selection,
    pub highlights: Vec<Pos>,
    /// Most recently cast spell, for the titan ability that recasts it
    pub last_spell: Option<CardDefinition>,
    pub board: Board,
    pub players: [PlayerState; 2],
    pub log: Vec<String>,
    pub animating: bool,
    pub pending: Option<Pending>,
    pub winner: Option<usize>,
}

impl GameState {
    pub fn new(map: GameMap, map_index: usize, players: [PlayerState; 2]) -> Self {
        GameState {
            map,
            map_index,
            turn: 1,
            active: 0,
            phase: Phase::Refresh,
            deploy_left: 0,
            selection: Selection::None,
            highlights: Vec::new(),
            last_spell: None,
            board: Board::new(),
            players,
            log: Vec::new(),
            animating: false,
            pending: None,
            winner: None,
        }
    }

    pub fn opponent(player: usize) -> usize {
        1 - player
    }

    pub fn unit(&self, pos: Pos) -> Option<&UnitInstance> {
        self.board.get(pos)
    }

    pub fn unit_mut(&mut self, pos: Pos) -> Option<&mut UnitInstance> {
        self.board.get_mut(pos)
    }

    pub fn active_player(&self) -> &PlayerState {
        &self.players[self.active]
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn require_phase(&self, expected: Phase) -> Result<(), ActionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(ActionError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    /// The active player's unit at `pos`
    pub fn own_unit(&self, pos: Pos) -> Result<&UnitInstance, ActionError> {
        let unit = self.unit(pos).ok_or(ActionError::NoUnit(pos))?;
        if unit.owner != self.active {
            return Err(ActionError::NotYourUnit(pos));
        }
        Ok(unit)
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
        self.highlights.clear();
    }

    /// Row a player must reach to strike the enemy titan
    pub fn enemy_back_row(player: usize) -> usize {
        if player == 0 {
            0
        } else {
            ROWS - 1
        }
    }
}
