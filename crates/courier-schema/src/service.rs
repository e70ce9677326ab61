//! Service and procedure declarations.

use courier_metadata::InteractionKind;
use serde::{Deserialize, Serialize};

use crate::options::Options;
use crate::url::DeclarationUrl;

/// A type reference that may be wrapped in a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamableUrl {
    /// URL of the referenced type.
    pub url: DeclarationUrl,
    /// Whether the reference is a stream of that type.
    #[serde(default)]
    pub streaming: bool,
}

impl StreamableUrl {
    /// Creates a non-streaming reference.
    #[must_use]
    pub const fn single(url: DeclarationUrl) -> Self {
        Self {
            url,
            streaming: false,
        }
    }

    /// Creates a streaming reference.
    #[must_use]
    pub const fn stream(url: DeclarationUrl) -> Self {
        Self {
            url,
            streaming: true,
        }
    }
}

/// A single remote procedure within a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    /// Procedure name, unique within the owning service.
    pub name: String,
    /// Request type reference, with its streaming flag.
    pub input: StreamableUrl,
    /// Response type reference, with its streaming flag.
    pub output: StreamableUrl,
    /// Options set on the procedure.
    #[serde(default)]
    pub options: Options,
    /// Leading documentation, empty when absent.
    #[serde(default)]
    pub documentation: String,
}

impl Procedure {
    /// Creates a procedure without options or documentation.
    #[must_use]
    pub fn new(name: impl Into<String>, input: StreamableUrl, output: StreamableUrl) -> Self {
        Self {
            name: name.into(),
            input,
            output,
            options: Options::new(),
            documentation: String::new(),
        }
    }

    /// Derives the interaction kind from the two streaming flags.
    ///
    /// Returns `None` for the disallowed request-streaming-only
    /// combination; schemas containing it are rejected by the external
    /// schema validator, not here.
    #[must_use]
    pub const fn kind(&self) -> Option<InteractionKind> {
        InteractionKind::from_streaming(self.input.streaming, self.output.streaming)
    }
}

/// A service declaration: an ordered list of procedures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Simple name of the service.
    pub name: String,
    /// Declaration URL of the service.
    pub url: DeclarationUrl,
    /// The procedures, in declaration order.
    #[serde(default)]
    pub procedures: Vec<Procedure>,
    /// Options set on the service.
    #[serde(default)]
    pub options: Options,
    /// Leading documentation, empty when absent.
    #[serde(default)]
    pub documentation: String,
}

impl Service {
    /// Creates a service declaration.
    #[must_use]
    pub fn new(
        url: DeclarationUrl,
        name: impl Into<String>,
        procedures: impl IntoIterator<Item = Procedure>,
    ) -> Self {
        Self {
            name: name.into(),
            url,
            procedures: procedures.into_iter().collect(),
            options: Options::new(),
            documentation: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(name: &str) -> DeclarationUrl {
        DeclarationUrl::declaration("greeting.v1", name)
    }

    #[test]
    fn kind_follows_streaming_flags() {
        let unary = Procedure::new(
            "Hello",
            StreamableUrl::single(url("HelloRequest")),
            StreamableUrl::single(url("HelloResponse")),
        );
        assert_eq!(unary.kind(), Some(InteractionKind::RequestResponse));

        let streaming = Procedure::new(
            "Watch",
            StreamableUrl::single(url("WatchRequest")),
            StreamableUrl::stream(url("WatchEvent")),
        );
        assert_eq!(streaming.kind(), Some(InteractionKind::RequestStream));

        let channel = Procedure::new(
            "Chat",
            StreamableUrl::stream(url("ChatMessage")),
            StreamableUrl::stream(url("ChatMessage")),
        );
        assert_eq!(channel.kind(), Some(InteractionKind::RequestChannel));
    }

    #[test]
    fn client_streaming_only_has_no_kind() {
        let procedure = Procedure::new(
            "Upload",
            StreamableUrl::stream(url("Chunk")),
            StreamableUrl::single(url("UploadResult")),
        );
        assert_eq!(procedure.kind(), None);
    }
}
