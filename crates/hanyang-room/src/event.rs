//! Events a game actor publishes after it commits (or refuses) a change.

use std::sync::Arc;

use hanyang_protocol::{GameId, PlayerId, Recipient, Rejection};
use hanyang_rules::{Effect, Game, PlayerRanking, RecordedAction};

/// What happened.
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// The game left the waiting state.
    Started { state: Arc<Game> },

    /// An action was accepted. Carries the full state after it.
    StateChanged { state: Arc<Game>, action: RecordedAction },

    TurnChanged { current_player: PlayerId, round: u32 },

    GameEnded {
        winner: Option<PlayerId>,
        rankings: Vec<PlayerRanking>,
    },

    /// An action was refused. Only the actor sees this.
    Rejected { player: PlayerId, rejection: Rejection },
}

/// A [`GameEvent`] together with its routing.
#[derive(Debug, Clone)]
pub struct RoomEvent {
    pub game_id: GameId,
    pub recipient: Recipient,
    pub event: GameEvent,
}

impl RoomEvent {
    pub fn is_for(&self, player: PlayerId) -> bool {
        self.recipient.includes(player)
    }

    /// Events announcing an accepted action: the new state first, then
    /// turn and end-of-game notifications in the order the engine
    /// reported them.
    pub(crate) fn for_accepted(
        game_id: GameId,
        state: &Arc<Game>,
        action: &RecordedAction,
        effects: &[Effect],
    ) -> Vec<Self> {
        let mut out = vec![Self {
            game_id,
            recipient: Recipient::All,
            event: GameEvent::StateChanged {
                state: Arc::clone(state),
                action: action.clone(),
            },
        }];
        for effect in effects {
            let event = match effect {
                Effect::TurnChanged { current_player, round } => GameEvent::TurnChanged {
                    current_player: *current_player,
                    round: *round,
                },
                Effect::GameEnded { winner, rankings } => GameEvent::GameEnded {
                    winner: *winner,
                    rankings: rankings.clone(),
                },
                _ => continue,
            };
            out.push(Self {
                game_id,
                recipient: Recipient::All,
                event,
            });
        }
        out
    }

    pub(crate) fn rejected(game_id: GameId, player: PlayerId, rejection: Rejection) -> Self {
        Self {
            game_id,
            recipient: Recipient::Player(player),
            event: GameEvent::Rejected { player, rejection },
        }
    }
}
