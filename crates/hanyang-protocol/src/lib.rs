//! Wire-level vocabulary shared by every Hanyang crate.
//!
//! This crate defines the pieces that cross a boundary, either between
//! the engine and its transport collaborator or between the engine's
//! own layers:
//!
//! - **Identity** ([`PlayerId`], [`GameId`], [`ActionId`]): newtype ids
//!   that serialize as plain numbers.
//! - **Routing** ([`Recipient`]): who an emitted event is meant for.
//! - **Errors** ([`ErrorCode`], [`Rejection`]): the external error
//!   taxonomy every internal error is translated into.
//! - **Framing** ([`Envelope`]): sequence number and timestamp around
//!   any outbound payload.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages
//!   are converted to/from bytes.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about boards, tiles or turns. The
//! rules engine sits on top of it, and the room layer and gateway use
//! it to talk to clients.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Gateway → Room → Rules
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{ActionId, Envelope, ErrorCode, GameId, PlayerId, Recipient, Rejection};
