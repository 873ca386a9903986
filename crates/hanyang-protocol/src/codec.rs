//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The gateway doesn't care HOW messages are serialized; it only needs
//! something that implements [`Codec`].
//!
//! Currently we provide [`JsonCodec`], which matches the JSON contract
//! browser clients already speak.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → a gateway holding the codec can be shared across
///   the tasks of a Tokio runtime.
/// - `'static` → the codec owns everything it needs, so it can live
///   inside long-running tasks.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the result doesn't
/// borrow from the input bytes, so the caller can drop its read buffer
/// right after decoding.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use hanyang_protocol::{Codec, Envelope, JsonCodec, Rejection, ErrorCode};
///
/// let codec = JsonCodec;
/// let envelope = Envelope::new(1, 5000, Rejection::new(ErrorCode::NotFound, "no such game"));
///
/// let bytes = codec.encode(&envelope).unwrap();
/// let decoded: Envelope<Rejection> = codec.decode(&bytes).unwrap();
/// assert_eq!(envelope, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ErrorCode, PlayerId, Rejection};

    #[test]
    fn test_json_codec_encodes_ids_as_numbers() {
        let bytes = JsonCodec.encode(&PlayerId(12)).unwrap();
        assert_eq!(bytes, b"12");
    }

    #[test]
    fn test_json_codec_decode_garbage_is_decode_error() {
        let result: Result<Rejection, _> = JsonCodec.decode(b"{not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_decode_wrong_shape_is_decode_error() {
        let result: Result<Rejection, _> = JsonCodec.decode(br#"{"reason": "x"}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_protocol_error_maps_to_bad_request() {
        let err = ProtocolError::InvalidMessage("payload on end_turn".into());
        assert_eq!(err.code(), ErrorCode::BadRequest);
        assert!(err.to_string().contains("payload on end_turn"));
    }
}
