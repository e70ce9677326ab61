//! The call metadata envelope and its codec seam.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::MetadataError;

/// Extra key/value metadata attached to a call.
///
/// Values are raw bytes: the framework never interprets them, it only
/// carries them from the caller to interceptors and handlers. Typical
/// entries are authentication tokens or trace identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtraMetadata(HashMap<String, Vec<u8>>);

impl ExtraMetadata {
    /// Creates an empty extra map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw bytes stored under `key`, when present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// Inserts a value, replacing any previous entry for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns `true` when the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.0
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_slice()))
    }
}

impl<K: Into<String>, V: Into<Vec<u8>>> FromIterator<(K, V)> for ExtraMetadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(entries: I) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// The out-of-band envelope attached to every call.
///
/// The envelope names the target service and procedure and carries the
/// [`ExtraMetadata`] map. It is ephemeral: one envelope per call, read from
/// the initial payload only, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallMetadata {
    /// Fully-qualified name of the target service.
    pub service_name: String,
    /// Name of the target procedure within the service.
    pub procedure_name: String,
    /// Extra key/value metadata forwarded to interceptors and handlers.
    #[serde(default)]
    pub extra: ExtraMetadata,
}

impl CallMetadata {
    /// Creates an envelope with an empty extra map.
    #[must_use]
    pub fn new(service_name: impl Into<String>, procedure_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            procedure_name: procedure_name.into(),
            extra: ExtraMetadata::new(),
        }
    }

    /// Replaces the extra map, builder-style.
    #[must_use]
    pub fn with_extra(mut self, extra: ExtraMetadata) -> Self {
        self.extra = extra;
        self
    }

    /// Validates that the service and procedure names are non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Invalid`] when either name is empty or
    /// consists only of whitespace.
    pub fn validate(&self) -> Result<(), MetadataError> {
        if self.service_name.trim().is_empty() {
            return Err(MetadataError::invalid("service name is empty"));
        }
        if self.procedure_name.trim().is_empty() {
            return Err(MetadataError::invalid("procedure name is empty"));
        }
        Ok(())
    }
}

/// Codec for the metadata side-channel.
///
/// The envelope format is independent of the payload body format, so the
/// dispatcher holds this seam behind a trait object and the application may
/// substitute its own encoding.
pub trait MetadataCodec: Send + Sync {
    /// Encodes an envelope into side-channel bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Serialize`] when the envelope cannot be
    /// serialized.
    fn encode(&self, metadata: &CallMetadata) -> Result<Vec<u8>, MetadataError>;

    /// Decodes side-channel bytes into an envelope.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Malformed`] when the bytes cannot be parsed
    /// and [`MetadataError::Invalid`] when the parsed envelope violates the
    /// envelope schema.
    fn decode(&self, bytes: &[u8]) -> Result<CallMetadata, MetadataError>;
}

/// JSON implementation of the metadata codec.
///
/// This is the built-in default; the envelope is small and structural, so a
/// self-describing encoding keeps mismatched peers debuggable.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMetadataCodec;

impl MetadataCodec for JsonMetadataCodec {
    fn encode(&self, metadata: &CallMetadata) -> Result<Vec<u8>, MetadataError> {
        serde_json::to_vec(metadata).map_err(MetadataError::Serialize)
    }

    fn decode(&self, bytes: &[u8]) -> Result<CallMetadata, MetadataError> {
        if bytes.is_empty() {
            return Err(MetadataError::Missing);
        }
        let metadata: CallMetadata =
            serde_json::from_slice(bytes).map_err(MetadataError::from_json_error)?;
        metadata.validate()?;
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "tests use expect for clarity")]

    use rstest::rstest;

    use super::*;

    fn codec() -> JsonMetadataCodec {
        JsonMetadataCodec
    }

    #[test]
    fn round_trips_envelope_with_extras() {
        let extra: ExtraMetadata = [("trace-id", b"abc123".to_vec())].into_iter().collect();
        let metadata = CallMetadata::new("Greeter", "Hello").with_extra(extra);

        let bytes = codec().encode(&metadata).expect("encode envelope");
        let decoded = codec().decode(&bytes).expect("decode envelope");

        assert_eq!(decoded, metadata);
        assert_eq!(decoded.extra.get("trace-id"), Some(b"abc123".as_slice()));
    }

    #[test]
    fn empty_bytes_report_missing_metadata() {
        assert!(matches!(codec().decode(&[]), Err(MetadataError::Missing)));
    }

    #[test]
    fn truncated_bytes_report_malformed_metadata() {
        let metadata = CallMetadata::new("Greeter", "Hello");
        let mut bytes = codec().encode(&metadata).expect("encode envelope");
        bytes.truncate(bytes.len() - 4);

        assert!(matches!(
            codec().decode(&bytes),
            Err(MetadataError::Malformed { .. })
        ));
    }

    #[rstest]
    #[case::empty_service("", "Hello")]
    #[case::empty_procedure("Greeter", "")]
    #[case::blank_service("   ", "Hello")]
    fn blank_names_are_rejected(#[case] service: &str, #[case] procedure: &str) {
        let bytes = codec()
            .encode(&CallMetadata::new(service, procedure))
            .expect("encode envelope");

        assert!(matches!(
            codec().decode(&bytes),
            Err(MetadataError::Invalid { .. })
        ));
    }
}
