use crate::card::CardDatabaseError;
use crate::game::state::Phase;
use crate::game::terrain::Pos;
use thiserror::Error;

/// Reasons an action is rejected. A rejected action leaves the rules state untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("The game is over")]
    GameOver,
    #[error("Waiting for the current resolution to finish")]
    Busy,
    #[error("Nothing is waiting to resolve")]
    NothingPending,
    #[error("Not allowed during {actual:?} (needs {expected:?})")]
    WrongPhase { expected: Phase, actual: Phase },
    #[error("Not enough energy: need {need}, have {have}")]
    NotEnoughEnergy { need: u32, have: u32 },
    #[error("No deploys left this turn")]
    NoDeploysLeft,
    #[error("No card at hand position {0}")]
    InvalidCard(usize),
    #[error("Cannot use tile {0}")]
    IllegalTile(Pos),
    #[error("Not a legal target: {0}")]
    IllegalTarget(Pos),
    #[error("No legal targets")]
    NoTargets,
    #[error("No unit at {0}")]
    NoUnit(Pos),
    #[error("Unit at {0} belongs to the other player")]
    NotYourUnit(Pos),
    #[error("Unit at {0} cannot act right now")]
    NotReady(Pos),
    #[error("Unit at {0} is not on the enemy back row")]
    NotOnBackRow(Pos),
    #[error("A taunt unit must be attacked first")]
    Taunted,
    #[error("Titan ability already used this turn")]
    AbilityUsed,
    #[error("Titan ultimate already used")]
    UltimateUsed,
    #[error("Ultimate needs {needed} kills, have {kills}")]
    UltimateLocked { kills: u32, needed: u32 },
    #[error("No spell has been cast yet")]
    NoSpellToRecast,
}

impl ActionError {
    /// Rejections that say nothing about the attempted move and are not logged
    pub fn is_silent(&self) -> bool {
        matches!(self, ActionError::GameOver | ActionError::Busy)
    }
}

/// Problems building a new game
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Unknown titan: {0}")]
    UnknownTitan(String),
    #[error("Unknown map index: {0}")]
    UnknownMap(usize),
    #[error("Unknown card in deck: {0}")]
    UnknownCard(String),
    #[error("Card database error: {0}")]
    DatabaseError(#[from] CardDatabaseError),
}
