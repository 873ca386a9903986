//! Unified error type for the Hanyang crates.

use hanyang_protocol::{ErrorCode, ProtocolError, Rejection};
use hanyang_room::RoomError;
use hanyang_rules::RulesError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum HanyangError {
    /// The bytes could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The engine refused the request.
    #[error(transparent)]
    Rules(#[from] RulesError),

    /// Unknown game, closed actor, or an engine refusal reported by one.
    #[error(transparent)]
    Room(#[from] RoomError),
}

impl HanyangError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Protocol(err) => err.code(),
            Self::Rules(err) => err.code(),
            Self::Room(err) => err.code(),
        }
    }

    pub fn rejection(&self) -> Rejection {
        Rejection::new(self.code(), self.to_string())
    }
}
