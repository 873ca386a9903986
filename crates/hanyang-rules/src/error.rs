//! Error types for the rules engine.

use hanyang_protocol::{ErrorCode, GameId, PlayerId, Rejection};

use crate::board::{Position, Terrain};
use crate::catalog::{BlueprintId, TileId};
use crate::ledger::{Resources, WorkerKind};
use crate::state::GameStatus;

/// Why a proposed action was refused. Every variant is a precondition
/// the actor can see and correct.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Illegal {
    #[error("game is {0}, not in progress")]
    GameNotInProgress(GameStatus),

    #[error("game is {0}; only a waiting game can start")]
    AlreadyStarted(GameStatus),

    #[error("it is {current}'s turn, not {actor}'s")]
    NotYourTurn { actor: PlayerId, current: PlayerId },

    /// Auto-play actions may only be issued for AI-controlled seats.
    #[error("{0} is not AI-controlled")]
    NotAiControlled(PlayerId),

    #[error("{0} is off the board")]
    OffBoard(Position),

    #[error("no building at {0}")]
    NoBuildingAt(Position),

    #[error("building at {position} has no slot {slot}")]
    NoSuchSlot { position: Position, slot: u8 },

    #[error("slot {slot} at {position} takes an {expected}, not an {requested}")]
    SlotKindMismatch {
        position: Position,
        slot: u8,
        expected: WorkerKind,
        requested: WorkerKind,
    },

    #[error("slot {slot} at {position} is occupied")]
    SlotOccupied { position: Position, slot: u8 },

    #[error("slot {slot} at {position} is empty")]
    SlotEmpty { position: Position, slot: u8 },

    #[error("no {0} available")]
    NoWorkerAvailable(WorkerKind),

    #[error("the worker in slot {slot} at {position} belongs to {owner}")]
    NotYourWorker {
        position: Position,
        slot: u8,
        owner: PlayerId,
    },

    #[error("officials stay committed; slot {slot} at {position} cannot be recalled")]
    PermanentWorker { position: Position, slot: u8 },

    #[error("cannot build on {terrain} at {position}")]
    UnbuildableTerrain { position: Position, terrain: Terrain },

    #[error("{0} already holds a building")]
    CellOccupied(Position),

    #[error("unknown tile {0}")]
    UnknownTile(TileId),

    #[error("tile {0} has already been placed")]
    TileAlreadyPlaced(TileId),

    #[error("tile {0} was discarded")]
    TileDiscarded(TileId),

    #[error("tile {0} is not in the market")]
    TileNotInMarket(TileId),

    #[error("cannot afford {tile}: costs {cost}, holding {held}")]
    CannotAfford {
        tile: TileId,
        cost: Resources,
        held: Resources,
    },

    #[error("blueprint {0} was not dealt to you")]
    BlueprintNotDealt(BlueprintId),

    #[error("blueprint {0} is already selected")]
    BlueprintAlreadySelected(BlueprintId),

    #[error("blueprint selection limit of {0} reached")]
    BlueprintLimitReached(usize),
}

/// Errors returned by [`crate::Rules`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// A precondition failed; state is unchanged.
    #[error("illegal action: {0}")]
    IllegalAction(#[from] Illegal),

    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    /// The applier produced a state that breaks a structural
    /// invariant. The mutation was discarded.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("game {0} has not finished")]
    NotFinished(GameId),
}

impl RulesError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::IllegalAction(_) | Self::NotFinished(_) => ErrorCode::IllegalAction,
            Self::PlayerNotFound(_) => ErrorCode::NotFound,
            Self::InvariantViolation(_) => ErrorCode::InvariantViolation,
            Self::InvalidConfig(_) => ErrorCode::BadRequest,
        }
    }

    pub fn rejection(&self) -> Rejection {
        Rejection::new(self.code(), self.to_string())
    }
}
