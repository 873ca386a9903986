//! # Hanyang
//!
//! Authoritative rules engine for Hanyang, a worker-placement
//! city-building board game for two to four players.
//!
//! This meta-crate ties the layers together:
//!
//! - `hanyang-protocol`: ids, error codes, envelopes, codecs
//! - `hanyang-rules`: the pure rules engine
//! - `hanyang-room`: one single-writer actor per game, plus the registry
//! - [`Gateway`]: turns transport frames into manager calls and back
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hanyang::prelude::*;
//!
//! # async fn run() -> Result<(), HanyangError> {
//! hanyang::init_tracing();
//! let manager = RoomManager::new(Arc::new(Rules::reference()), RoomConfig::default());
//! let game = manager
//!     .create_game(vec![Seat::human(1, "host"), Seat::ai(2, "bot", AiDifficulty::Medium)], 0)
//!     .await?;
//! manager.start(game, 42, 0).await?;
//! let mut gateway = Gateway::new(Arc::new(manager), JsonCodec, game, PlayerId(1));
//! let frames = gateway.handle(br#"{"type":"get_valid_actions"}"#, 1).await?;
//! # let _ = frames;
//! # Ok(())
//! # }
//! ```

mod error;
mod gateway;

pub use error::HanyangError;
pub use gateway::{ClientMessage, Gateway, ServerMessage};

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, or at `info` when
/// it is unset. A second call is a no-op.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub mod prelude {
    pub use hanyang_protocol::{Codec, ErrorCode, GameId, JsonCodec, PlayerId, Rejection};
    pub use hanyang_room::{GameEvent, RoomConfig, RoomError, RoomEvent, RoomManager, Submitted};
    pub use hanyang_rules::{
        Action, ActionKind, ActionType, AiDifficulty, Catalog, Game, GameResult, GameStatus, Rules,
        RulesConfig, RulesError, Seat,
    };

    pub use crate::{ClientMessage, Gateway, HanyangError, ServerMessage};
}
