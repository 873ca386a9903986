//! Core protocol types.
//!
//! Everything in here is serialized and sent to clients at some point,
//! so the JSON shape of each type is part of the public contract.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player seat.
///
/// Newtype wrapper around `u64`: a `GameId` can never be passed where a
/// `PlayerId` is expected, even though both are numbers underneath.
///
/// `#[serde(transparent)]` serializes `PlayerId(42)` as just `42`.
///
/// `Ord` is derived because the final ranking breaks ties on the lower
/// player id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

/// `tracing::info!(%player_id, "...")` prints "P-42".
impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for one game instance.
///
/// Each game owns its board and players; nothing is shared between
/// two `GameId`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

/// Position of an accepted action in its game's append-only log.
///
/// Ids start at 1 and increase by one per accepted action, so the id
/// doubles as the log length at the time the action was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub u64);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Specifies who an emitted event is meant for.
///
/// The room actor tags every event with a `Recipient`; the transport
/// collaborator uses it to decide which connections get a copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every seat in the game.
    All,

    /// One specific seat (e.g. a rejection only the actor should see).
    Player(PlayerId),
}

impl Recipient {
    /// Returns `true` if `player` should receive an event routed here.
    pub fn includes(&self, player: PlayerId) -> bool {
        match self {
            Self::All => true,
            Self::Player(p) => *p == player,
        }
    }
}

// ---------------------------------------------------------------------------
// ErrorCode / Rejection
// ---------------------------------------------------------------------------

/// Machine-readable error category returned to clients.
///
/// Internal error enums in the other crates map onto these through
/// their `code()` methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// A precondition failed. The client can fix it and retry.
    IllegalAction,
    /// Unknown game or player id.
    NotFound,
    /// The engine caught an internal inconsistency and refused to
    /// commit the mutation. Prior state is intact.
    InvariantViolation,
    /// The game's actor is gone or its queue is closed.
    Unavailable,
    /// The message itself could not be understood.
    BadRequest,
}

impl ErrorCode {
    /// Whether the client can reasonably try again with a different
    /// request against the same game.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::IllegalAction | Self::BadRequest)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::IllegalAction => "illegal_action",
            Self::NotFound => "not_found",
            Self::InvariantViolation => "invariant_violation",
            Self::Unavailable => "unavailable",
            Self::BadRequest => "bad_request",
        };
        f.write_str(name)
    }
}

/// A structured refusal: `{ "code": "illegal_action", "message": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub code: ErrorCode,
    pub message: String,
}

impl Rejection {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Wraps an outbound payload with ordering metadata.
///
/// ```text
/// ┌──────────────────────────────┐
/// │ seq: 42                      │  ← per-connection ordering
/// │ timestamp: 1700000000000     │  ← unix millis at send time
/// │ ┌──────────────────────────┐ │
/// │ │ payload: T               │ │  ← server message
/// │ └──────────────────────────┘ │
/// └──────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Auto-incrementing sequence number, per connection.
    pub seq: u64,

    /// Milliseconds since the unix epoch.
    pub timestamp: u64,

    /// The message content.
    pub payload: T,
}

impl<T> Envelope<T> {
    pub fn new(seq: u64, timestamp: u64, payload: T) -> Self {
        Self {
            seq,
            timestamp,
            payload,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
