//! Transport-facing gateway for one seat at one game.
//!
//! The socket itself lives elsewhere. A transport hands each inbound
//! frame to [`Gateway::handle`] and writes back whatever frames it
//! returns; it also forwards the game's [`RoomEvent`]s through
//! [`Gateway::render`] so turn and end-of-game notices reach the seat.
//!
//! ```text
//! bytes ──► ClientMessage ──► RoomManager ──► ServerMessage(s) ──► Envelope ──► bytes
//! ```

use std::sync::Arc;

use hanyang_protocol::{Codec, Envelope, ErrorCode, GameId, PlayerId, Rejection};
use hanyang_room::{GameEvent, RoomEvent, RoomManager};
use hanyang_rules::{Action, ActionKind, Game, PlayerRanking, RecordedAction, ValidAction};
use serde::{Deserialize, Serialize};

use crate::HanyangError;

// ---------------------------------------------------------------------------
// Wire messages
// ---------------------------------------------------------------------------

/// Client → server. An action submission is flat on the wire:
/// `{"type": "submit_action", "action_type": "place_tile", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    SubmitAction(ActionKind),
    GetValidActions,
    GetState,
    Ping {
        #[serde(default)]
        client_time: u64,
    },
}

/// Server → client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    GameState {
        state: Game,
    },
    ActionResult {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        action: Option<RecordedAction>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<Rejection>,
    },
    ValidActions {
        actions: Vec<ValidAction>,
    },
    TurnChanged {
        current_player_id: PlayerId,
        round: u32,
    },
    GameEnded {
        winner_id: Option<PlayerId>,
        rankings: Vec<PlayerRanking>,
    },
    Error {
        code: ErrorCode,
        message: String,
        recoverable: bool,
    },
    Pong {
        client_time: u64,
        server_time: u64,
    },
}

impl ServerMessage {
    fn error(rejection: Rejection) -> Self {
        Self::Error {
            recoverable: rejection.code.is_recoverable(),
            code: rejection.code,
            message: rejection.message,
        }
    }

    fn refused(rejection: Rejection) -> Self {
        Self::ActionResult {
            success: false,
            action: None,
            error: Some(rejection),
        }
    }
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// Per-connection translator between frames and manager calls.
pub struct Gateway<C: Codec> {
    manager: Arc<RoomManager>,
    codec: C,
    game_id: GameId,
    player_id: PlayerId,
    seq: u64,
}

impl<C: Codec> Gateway<C> {
    /// Binds a connection to one seat. Every submission made through
    /// this gateway is attributed to `player_id`; outbound sequence
    /// numbers start at 1.
    pub fn new(manager: Arc<RoomManager>, codec: C, game_id: GameId, player_id: PlayerId) -> Self {
        Self {
            manager,
            codec,
            game_id,
            player_id,
            seq: 1,
        }
    }

    /// The seat this connection speaks for.
    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// Handles one inbound frame received at `now` (unix millis) and
    /// returns the encoded replies, in send order.
    ///
    /// Engine refusals become reply frames, not errors.
    ///
    /// # Errors
    /// Only if a reply cannot be encoded.
    pub async fn handle(&mut self, data: &[u8], now: u64) -> Result<Vec<Vec<u8>>, HanyangError> {
        let replies = match self.codec.decode::<ClientMessage>(data) {
            Ok(msg) => self.dispatch(msg, now).await,
            Err(err) => {
                tracing::debug!(
                    game_id = %self.game_id,
                    player_id = %self.player_id,
                    error = %err,
                    "undecodable frame"
                );
                vec![ServerMessage::error(Rejection::new(err.code(), err.to_string()))]
            }
        };
        replies.into_iter().map(|msg| self.frame(msg, now)).collect()
    }

    async fn dispatch(&self, msg: ClientMessage, now: u64) -> Vec<ServerMessage> {
        match msg {
            ClientMessage::SubmitAction(kind) => {
                let action = Action::new(self.player_id, kind, now);
                match self.manager.submit(self.game_id, action).await {
                    Ok(submitted) => vec![
                        ServerMessage::ActionResult {
                            success: true,
                            action: Some(submitted.action),
                            error: None,
                        },
                        ServerMessage::GameState {
                            state: Game::clone(&submitted.state),
                        },
                    ],
                    Err(err) => vec![ServerMessage::refused(err.rejection())],
                }
            }
            ClientMessage::GetValidActions => {
                match self.manager.valid_actions(self.game_id, self.player_id).await {
                    Ok(actions) => vec![ServerMessage::ValidActions { actions }],
                    Err(err) => vec![ServerMessage::error(err.rejection())],
                }
            }
            ClientMessage::GetState => match self.manager.snapshot(self.game_id).await {
                Ok(state) => vec![ServerMessage::GameState {
                    state: Game::clone(&state),
                }],
                Err(err) => vec![ServerMessage::error(err.rejection())],
            },
            ClientMessage::Ping { client_time } => vec![ServerMessage::Pong {
                client_time,
                server_time: now,
            }],
        }
    }

    /// Encodes a room event for this seat, or `None` if it is routed
    /// elsewhere or has no client-facing form. State changes are left
    /// out because the submitter already received the new state.
    ///
    /// # Errors
    /// Only if the frame cannot be encoded.
    pub fn render(&mut self, event: &RoomEvent, now: u64) -> Result<Option<Vec<u8>>, HanyangError> {
        if event.game_id != self.game_id || !event.is_for(self.player_id) {
            return Ok(None);
        }
        let msg = match &event.event {
            GameEvent::Started { state } => ServerMessage::GameState {
                state: Game::clone(state),
            },
            GameEvent::StateChanged { state, action } if action.player != self.player_id => {
                ServerMessage::GameState {
                    state: Game::clone(state),
                }
            }
            GameEvent::StateChanged { .. } | GameEvent::Rejected { .. } => return Ok(None),
            GameEvent::TurnChanged { current_player, round } => ServerMessage::TurnChanged {
                current_player_id: *current_player,
                round: *round,
            },
            GameEvent::GameEnded { winner, rankings } => ServerMessage::GameEnded {
                winner_id: *winner,
                rankings: rankings.clone(),
            },
        };
        self.frame(msg, now).map(Some)
    }

    fn frame(&mut self, msg: ServerMessage, now: u64) -> Result<Vec<u8>, HanyangError> {
        let envelope = Envelope::new(next_seq(&mut self.seq), now, msg);
        Ok(self.codec.encode(&envelope)?)
    }
}

/// Increments and returns the next sequence number.
fn next_seq(seq: &mut u64) -> u64 {
    let current = *seq;
    *seq += 1;
    current
}
