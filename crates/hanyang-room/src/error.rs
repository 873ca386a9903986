//! Error types for the room layer.

use hanyang_protocol::{ErrorCode, GameId, Rejection};
use hanyang_rules::RulesError;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No game with this id is registered.
    #[error("game {0} not found")]
    NotFound(GameId),

    /// The engine refused the request. Nothing was committed.
    #[error(transparent)]
    Rules(#[from] RulesError),

    /// The game's command channel is closed.
    #[error("game {0} is unavailable")]
    Unavailable(GameId),
}

impl RoomError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Rules(err) => err.code(),
            Self::Unavailable(_) => ErrorCode::Unavailable,
        }
    }

    pub fn rejection(&self) -> Rejection {
        Rejection::new(self.code(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hanyang_protocol::PlayerId;

    #[test]
    fn test_room_error_codes() {
        assert_eq!(RoomError::NotFound(GameId(4)).code(), ErrorCode::NotFound);
        assert_eq!(RoomError::Unavailable(GameId(4)).code(), ErrorCode::Unavailable);
        let rules = RoomError::from(RulesError::PlayerNotFound(PlayerId(9)));
        assert_eq!(rules.code(), ErrorCode::NotFound);
    }

    #[test]
    fn test_rejection_carries_message() {
        let rejection = RoomError::NotFound(GameId(4)).rejection();
        assert_eq!(rejection.code, ErrorCode::NotFound);
        assert!(rejection.message.contains("not found"));
    }
}
