//! Error types for envelope encoding and decoding.

use thiserror::Error;

/// Errors surfaced while encoding or decoding the call metadata envelope.
///
/// Every variant maps to the dispatch-level "invalid metadata" failure: a
/// call whose envelope is absent or unreadable is rejected before any
/// payload byte is decoded.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The transport delivered no metadata side-channel at all.
    #[error("call metadata is missing")]
    Missing,

    /// The metadata bytes could not be parsed as an envelope.
    #[error("malformed call metadata: {message}")]
    Malformed {
        /// Description of the parse failure.
        message: String,
        /// Underlying decoder error, when one exists.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The envelope parsed but violates the envelope schema.
    #[error("invalid call metadata: {message}")]
    Invalid {
        /// Description of the violated constraint.
        message: String,
    },

    /// The envelope could not be serialized for transmission.
    #[error("failed to encode call metadata: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl MetadataError {
    /// Creates a `Malformed` error without an underlying source.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a `Malformed` error from a JSON decode failure.
    #[must_use]
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::Malformed {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates an `Invalid` error describing a violated envelope constraint.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}
