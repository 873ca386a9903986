//! Game and player state.

use std::fmt;

use hanyang_protocol::{GameId, PlayerId};
use serde::{Deserialize, Serialize};

use crate::action::RecordedAction;
use crate::ai::AiDifficulty;
use crate::board::{Board, Position};
use crate::catalog::{BlueprintId, TileId};
use crate::ledger::{Resources, Workers};
use crate::scoring::PlayerRanking;

// ---------------------------------------------------------------------------
// GameStatus
// ---------------------------------------------------------------------------

/// Lifecycle of a game. Transitions are strictly ordered:
///
/// ```text
/// Waiting → InProgress → Finished
/// ```
///
/// `Finished` is terminal; the game is immutable from then on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Waiting,
    InProgress,
    Finished,
}

impl GameStatus {
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Waiting => Some(Self::InProgress),
            Self::InProgress => Some(Self::Finished),
            Self::Finished => None,
        }
    }

    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// Seats and players
// ---------------------------------------------------------------------------

/// Who decides a seat's moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Controller {
    Human,
    Ai(AiDifficulty),
}

impl Controller {
    pub fn is_ai(&self) -> bool {
        matches!(self, Self::Ai(_))
    }
}

/// A seat as supplied by the lobby when the game is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: PlayerId,
    pub name: String,
    pub controller: Controller,
}

impl Seat {
    pub fn human(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: PlayerId(id),
            name: name.into(),
            controller: Controller::Human,
        }
    }

    pub fn ai(id: u64, name: impl Into<String>, difficulty: AiDifficulty) -> Self {
        Self {
            id: PlayerId(id),
            name: name.into(),
            controller: Controller::Ai(difficulty),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub controller: Controller,
    pub turn_index: usize,
    pub resources: Resources,
    pub workers: Workers,
    /// Positions of buildings this player placed, in placement order.
    pub placed_tiles: Vec<Position>,
    pub dealt_blueprints: Vec<BlueprintId>,
    pub selected_blueprints: Vec<BlueprintId>,
    /// Running display estimate while in progress; the final total once
    /// the game is finished.
    pub score: i64,
    pub turns_taken: u32,
}

impl Player {
    /// Dealt blueprints not yet selected.
    pub fn unselected_blueprints(&self) -> impl Iterator<Item = &BlueprintId> {
        self.dealt_blueprints
            .iter()
            .filter(|b| !self.selected_blueprints.contains(b))
    }
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// Authoritative state of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub status: GameStatus,
    pub current_round: u32,
    pub total_rounds: u32,
    pub turn_order: Vec<PlayerId>,
    pub current_player: PlayerId,
    pub board: Board,
    pub players: Vec<Player>,
    /// Shuffled undrawn tiles. The first `market_size` are drawable.
    pub draw_pool: Vec<TileId>,
    pub discard_pile: Vec<TileId>,
    pub last_action: Option<RecordedAction>,
    /// Number of actions accepted so far.
    pub action_count: u64,
    pub created_at: u64,
    pub started_at: Option<u64>,
    pub updated_at: u64,
    pub finished_at: Option<u64>,
    /// Written once when the game finishes.
    pub rankings: Option<Vec<PlayerRanking>>,
}

impl Game {
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn current(&self) -> Option<&Player> {
        self.player(self.current_player)
    }

    /// Drawable tiles: the front of the pool.
    pub fn market(&self, size: usize) -> &[TileId] {
        &self.draw_pool[..size.min(self.draw_pool.len())]
    }

    pub fn is_finished(&self) -> bool {
        self.status == GameStatus::Finished
    }

    /// Milliseconds from start to finish, once both are known.
    pub fn duration_ms(&self) -> Option<u64> {
        Some(self.finished_at?.saturating_sub(self.started_at?))
    }
}
