//! Ordered per-call middleware.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use courier_metadata::CallMetadata;
use tracing::debug;

use crate::capabilities::CapabilitiesBuilder;
use crate::dispatcher::DISPATCH_TARGET;
use crate::errors::ServerError;

/// Summary of a finished call, handed to interceptors for observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// The handler was invoked and produced its result or stream.
    Success,
    /// The call failed, either during dispatch or inside the handler.
    Failure {
        /// Rendered error description.
        error: String,
    },
}

impl CallOutcome {
    /// Builds a failure outcome from a dispatch or handler error.
    #[must_use]
    pub fn failure(error: &ServerError) -> Self {
        Self::Failure {
            error: error.to_string(),
        }
    }
}

/// Per-call middleware executed in registration order before the handler.
///
/// An interceptor may reject the call (short-circuiting with a typed
/// failure before the handler runs), augment the capability container
/// (additions are visible to the handler and to later interceptors), and
/// observe the completed call without altering its result.
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Runs before the handler. Returning an error rejects the call.
    async fn on_call(
        &self,
        metadata: &CallMetadata,
        capabilities: &mut CapabilitiesBuilder,
    ) -> Result<(), ServerError> {
        let _ = (metadata, capabilities);
        Ok(())
    }

    /// Observes the call outcome after the handler was invoked (or after
    /// dispatch failed). Must not alter the result.
    ///
    /// For streaming kinds the outcome reflects stream *production*: a
    /// [`CallOutcome::Success`] means the handler returned its stream.
    /// Failed items and early termination within the stream are delivered
    /// to the consumer only and are not reported here.
    async fn on_complete(&self, metadata: &CallMetadata, outcome: &CallOutcome) {
        let _ = (metadata, outcome);
    }
}

/// The composed interceptor chain, built once at server start.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Arc<[Arc<dyn Interceptor>]>,
}

impl InterceptorChain {
    /// Builds a chain from an ordered interceptor list.
    #[must_use]
    pub fn new(interceptors: Vec<Arc<dyn Interceptor>>) -> Self {
        Self {
            interceptors: interceptors.into(),
        }
    }

    /// Returns the number of links in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Returns `true` when no interceptors are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Runs every interceptor in order, stopping at the first rejection.
    ///
    /// # Errors
    ///
    /// Propagates the first rejection unchanged.
    pub async fn on_call(
        &self,
        metadata: &CallMetadata,
        capabilities: &mut CapabilitiesBuilder,
    ) -> Result<(), ServerError> {
        for interceptor in self.interceptors.iter() {
            if let Err(error) = interceptor.on_call(metadata, capabilities).await {
                debug!(
                    target: DISPATCH_TARGET,
                    service = %metadata.service_name,
                    procedure = %metadata.procedure_name,
                    error = %error,
                    "call rejected by interceptor"
                );
                return Err(error);
            }
        }
        Ok(())
    }

    /// Notifies every interceptor of the call outcome, in order.
    pub async fn on_complete(&self, metadata: &CallMetadata, outcome: &CallOutcome) {
        for interceptor in self.interceptors.iter() {
            interceptor.on_complete(metadata, outcome).await;
        }
    }
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("InterceptorChain")
            .field("len", &self.interceptors.len())
            .finish()
    }
}
