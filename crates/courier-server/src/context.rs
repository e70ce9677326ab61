//! Per-call execution context.

use std::sync::Arc;

use courier_metadata::{CallMetadata, ExtraMetadata};
use tokio_util::sync::CancellationToken;

use crate::capabilities::Capabilities;

/// The execution context handed to every handler invocation.
///
/// This is the only channel through which a handler sees call-scoped state:
/// the decoded envelope, the frozen capability container, and the call's
/// cancellation token. The context is cheap to clone and never outlives the
/// call it was built for.
#[derive(Debug, Clone)]
pub struct CallContext {
    metadata: Arc<CallMetadata>,
    capabilities: Capabilities,
    cancellation: CancellationToken,
}

impl CallContext {
    /// Assembles a context for one call.
    #[must_use]
    pub fn new(
        metadata: Arc<CallMetadata>,
        capabilities: Capabilities,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            metadata,
            capabilities,
            cancellation,
        }
    }

    /// Returns the decoded call envelope.
    #[must_use]
    pub fn metadata(&self) -> &CallMetadata {
        &self.metadata
    }

    /// Returns the envelope's extra key/value map.
    #[must_use]
    pub fn extra(&self) -> &ExtraMetadata {
        &self.metadata.extra
    }

    /// Returns the capability of type `T`, when one was provided for this
    /// call.
    #[must_use]
    pub fn capability<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.capabilities.get::<T>()
    }

    /// Returns the frozen capability container.
    #[must_use]
    pub const fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Returns this call's cancellation token.
    ///
    /// Handlers that spawn work must tie it to this token: the token is
    /// cancelled as soon as the consumer abandons the call, and no further
    /// production may happen afterwards.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Returns `true` once the consumer has abandoned the call.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
