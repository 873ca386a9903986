//! # hanyang-rules
//!
//! The rules engine for Hanyang, a worker-placement city-building game
//! for two to four players on a 5×5 board.
//!
//! Everything here is synchronous and pure: a [`Rules`] value takes a
//! [`Game`] by reference and returns a new one. Serializing access to a
//! game and fanning out events is the job of `hanyang-room`.
//!
//! ## Modules
//!
//! - [`catalog`]: buildings, blueprints and the terrain layout.
//! - [`board`] and [`ledger`]: the board model and per-player counters.
//! - [`rules`]: validation and application of actions.
//! - `generator`: the legal options for the player on turn.
//! - `turn`: turn and round progression, production, recall.
//! - [`scoring`] and [`blueprint`]: end-of-game scoring.
//! - [`invariants`]: structural checks run after every mutation.
//! - [`ai`]: computer opponents built on the generator.

pub mod action;
pub mod ai;
pub mod blueprint;
pub mod board;
pub mod catalog;
pub mod config;
pub mod error;
mod generator;
pub mod invariants;
pub mod ledger;
pub mod rules;
pub mod scoring;
pub mod state;
mod turn;

pub use action::{Action, ActionKind, ActionOrigin, ActionType, Effect, RecordedAction, ValidAction};
pub use ai::AiDifficulty;
pub use board::{Board, Position, Terrain, TerrainBonus, TerrainLayout};
pub use catalog::{BlueprintId, Catalog, TileCategory, TileId};
pub use config::{ApprenticeRecall, ResourceScoring, ResourceTerm, RulesConfig};
pub use error::{Illegal, RulesError};
pub use ledger::{Resource, Resources, WorkerKind};
pub use rules::{Applied, Rules};
pub use scoring::{GameResult, PlayerRanking, ScoreBreakdown};
pub use state::{Controller, Game, GameStatus, Player, Seat};
