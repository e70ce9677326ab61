//! Pluggable serialization for payload bodies.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors surfaced by a payload codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A value could not be serialized into body bytes.
    #[error("failed to encode payload: {message}")]
    Encode {
        /// Description from the underlying serializer.
        message: String,
    },
    /// Body bytes could not be deserialized into the expected type.
    #[error("failed to decode payload: {message}")]
    Decode {
        /// Description from the underlying deserializer.
        message: String,
    },
}

impl CodecError {
    /// Creates an `Encode` error from a serializer failure description.
    #[must_use]
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Creates a `Decode` error from a deserializer failure description.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Serialization seam for payload bodies.
///
/// The framework does not define the body format; handlers are registered
/// together with the codec that understands their request and response
/// types. Codecs are cloned into the registered handler closures, so they
/// should be cheap handles.
pub trait PayloadCodec: Clone + Send + Sync + 'static {
    /// Serializes a value into body bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] when serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    /// Deserializes body bytes into a value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] when deserialization fails.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError>;
}

/// JSON payload codec, the built-in default.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPayloadCodec;

impl PayloadCodec for JsonPayloadCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value).map_err(|error| CodecError::encode(error.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(bytes).map_err(|error| CodecError::decode(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "tests use expect for clarity")]

    use super::*;

    #[test]
    fn round_trips_values() {
        let codec = JsonPayloadCodec;
        let bytes = codec.encode(&("hello", 7)).expect("encode");
        let decoded: (String, u32) = codec.decode(&bytes).expect("decode");
        assert_eq!(decoded, ("hello".to_owned(), 7));
    }

    #[test]
    fn decode_failure_is_reported() {
        let codec = JsonPayloadCodec;
        let result: Result<u32, _> = codec.decode(b"not json");
        assert!(matches!(result, Err(CodecError::Decode { .. })));
    }
}
