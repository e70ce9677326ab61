//! Interaction kinds derived from streaming flags.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The shape of a single call, fixed at procedure registration time.
///
/// A procedure is registered under exactly one kind; lookups requesting a
/// different kind do not see it. This catches client/server interaction
/// mismatches during resolution instead of mid-invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// One input payload, one output payload.
    RequestResponse,
    /// One input payload, a stream of output payloads.
    RequestStream,
    /// An initial input payload plus a stream of further inputs, answered by
    /// a stream of outputs. The two streams are independent in cardinality
    /// and timing.
    RequestChannel,
}

impl InteractionKind {
    /// Derives the kind from the schema's request/response streaming flags.
    ///
    /// Returns `None` for the request-streaming-only combination, which the
    /// schema grammar disallows. Rejecting such schemas is the job of an
    /// external schema validator, not of this crate.
    #[must_use]
    pub const fn from_streaming(request_streams: bool, response_streams: bool) -> Option<Self> {
        match (request_streams, response_streams) {
            (false, false) => Some(Self::RequestResponse),
            (false, true) => Some(Self::RequestStream),
            (true, true) => Some(Self::RequestChannel),
            (true, false) => None,
        }
    }

    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RequestResponse => "request_response",
            Self::RequestStream => "request_stream",
            Self::RequestChannel => "request_channel",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::unary(false, false, Some(InteractionKind::RequestResponse))]
    #[case::server_stream(false, true, Some(InteractionKind::RequestStream))]
    #[case::channel(true, true, Some(InteractionKind::RequestChannel))]
    #[case::client_stream_only(true, false, None)]
    fn derives_kind_from_streaming_flags(
        #[case] request_streams: bool,
        #[case] response_streams: bool,
        #[case] expected: Option<InteractionKind>,
    ) {
        assert_eq!(
            InteractionKind::from_streaming(request_streams, response_streams),
            expected
        );
    }

    #[test]
    fn display_matches_canonical_names() {
        assert_eq!(InteractionKind::RequestResponse.to_string(), "request_response");
        assert_eq!(InteractionKind::RequestStream.to_string(), "request_stream");
        assert_eq!(InteractionKind::RequestChannel.to_string(), "request_channel");
    }
}
