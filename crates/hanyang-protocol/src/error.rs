//! Error types for the protocol layer.
//!
//! Each Hanyang crate defines its own error enum. A `ProtocolError`
//! always means the bytes were wrong, never the move.

/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, an unknown `action_type`, or a
    /// payload missing one of the fields its action type requires.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message parsed but breaks a protocol rule, e.g. a payload
    /// attached to an action type that takes none.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

impl ProtocolError {
    /// The external error code a client sees for this failure.
    pub fn code(&self) -> crate::ErrorCode {
        crate::ErrorCode::BadRequest
    }
}
