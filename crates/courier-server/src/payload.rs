//! The payload unit exchanged with the transport.

use courier_metadata::{CallMetadata, MetadataCodec, MetadataError};

/// One transport frame: optional metadata side-channel bytes plus the body.
///
/// The transport delivers metadata and body separately; the dispatcher reads
/// the metadata side first and never touches the body until the call has
/// been fully resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    /// Raw envelope bytes from the metadata side-channel, when present.
    pub metadata: Option<Vec<u8>>,
    /// The body bytes, opaque until a payload codec decodes them.
    pub data: Vec<u8>,
}

impl Payload {
    /// Creates a payload carrying both metadata and body bytes.
    #[must_use]
    pub fn new(metadata: impl Into<Vec<u8>>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            metadata: Some(metadata.into()),
            data: data.into(),
        }
    }

    /// Creates a body-only payload, as used for every frame after the first
    /// on a request channel and for all outbound frames.
    #[must_use]
    pub fn data(data: impl Into<Vec<u8>>) -> Self {
        Self {
            metadata: None,
            data: data.into(),
        }
    }

    /// Creates a payload whose metadata side carries the encoded envelope.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Serialize`] when the envelope cannot be
    /// encoded.
    pub fn for_call(
        codec: &dyn MetadataCodec,
        metadata: &CallMetadata,
        data: impl Into<Vec<u8>>,
    ) -> Result<Self, MetadataError> {
        Ok(Self {
            metadata: Some(codec.encode(metadata)?),
            data: data.into(),
        })
    }

    /// Returns the metadata bytes, or [`MetadataError::Missing`] when the
    /// side-channel is absent.
    pub fn metadata_or_missing(&self) -> Result<&[u8], MetadataError> {
        self.metadata
            .as_deref()
            .filter(|bytes| !bytes.is_empty())
            .ok_or(MetadataError::Missing)
    }
}
