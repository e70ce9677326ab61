//! Call routing across the three interaction kinds.
//!
//! Every inbound call follows the same prelude: decode the metadata
//! envelope, resolve the target procedure under the requested interaction
//! kind, run the interceptor chain, and freeze the capability container
//! into the call context. Only then does the matching handler run; any
//! resolution failure aborts beforehand, so a failed call has no partial
//! side effects. The three entry points diverge only in invocation shape.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};

use courier_metadata::{CallMetadata, InteractionKind, JsonMetadataCodec, MetadataCodec};
use futures::stream::{BoxStream, Stream, StreamExt};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};

use crate::capabilities::Capabilities;
use crate::config::ServerConfig;
use crate::context::CallContext;
use crate::errors::ServerError;
use crate::interceptor::{CallOutcome, InterceptorChain};
use crate::payload::Payload;
use crate::registry::{ProcedureDescriptor, ProcedureHandler, RawInputStream, ServiceRegistry};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Stream of outbound payloads for a streaming call.
///
/// Dropping the stream cancels the call's [`CancellationToken`], so a
/// consumer that abandons the call stops the producer within one scheduling
/// step: handlers that merely yield items are never polled again, and
/// handlers that spawned work observe the token.
pub struct PayloadStream {
    inner: BoxStream<'static, Result<Payload, ServerError>>,
    _guard: DropGuard,
}

impl PayloadStream {
    fn new(inner: BoxStream<'static, Result<Payload, ServerError>>, token: CancellationToken) -> Self {
        Self {
            inner,
            _guard: token.drop_guard(),
        }
    }
}

impl std::fmt::Debug for PayloadStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadStream").finish_non_exhaustive()
    }
}

impl Stream for PayloadStream {
    type Item = Result<Payload, ServerError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

struct PreparedCall<'registry> {
    metadata: Arc<CallMetadata>,
    context: CallContext,
    procedure: &'registry ProcedureDescriptor,
}

/// Routes inbound calls to registered handlers.
///
/// The dispatcher owns only immutable, startup-built state (registry,
/// interceptor chain, base capabilities, metadata codec), so one instance is
/// safely shared behind an [`Arc`] across all concurrent calls.
pub struct Dispatcher {
    registry: Arc<ServiceRegistry>,
    chain: InterceptorChain,
    base_capabilities: Capabilities,
    metadata_codec: Arc<dyn MetadataCodec>,
}

impl Dispatcher {
    /// Creates a dispatcher over a registry with default configuration.
    #[must_use]
    pub fn new(registry: ServiceRegistry) -> Self {
        Self::with_config(registry, ServerConfig::default())
    }

    /// Creates a dispatcher over a registry with the given configuration.
    #[must_use]
    pub fn with_config(registry: ServiceRegistry, config: ServerConfig) -> Self {
        let (interceptors, capabilities, metadata_codec) = config.into_dispatch_parts();
        Self {
            registry: Arc::new(registry),
            chain: InterceptorChain::new(interceptors),
            base_capabilities: capabilities,
            metadata_codec: metadata_codec
                .unwrap_or_else(|| Arc::new(JsonMetadataCodec)),
        }
    }

    /// Returns the shared registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    /// Handles a request-response call: one payload in, one payload out.
    ///
    /// # Errors
    ///
    /// Returns the dispatch-layer error when resolution fails before the
    /// handler runs, or the handler's own failure afterwards.
    pub async fn request_response(&self, payload: Payload) -> Result<Payload, ServerError> {
        let prepared = self
            .prepare(&payload, InteractionKind::RequestResponse)
            .await?;
        let PreparedCall {
            metadata,
            context,
            procedure,
        } = prepared;

        let ProcedureHandler::RequestResponse(handler) = &procedure.handler else {
            return Err(self.mismatched_registration(&metadata, InteractionKind::RequestResponse));
        };
        match handler(context, payload.data).await {
            Ok(data) => {
                self.chain.on_complete(&metadata, &CallOutcome::Success).await;
                Ok(Payload::data(data))
            }
            Err(error) => Err(self.fail(&metadata, error).await),
        }
    }

    /// Handles a request-stream call: one payload in, a lazy payload stream
    /// out, terminated by handler completion or failure.
    ///
    /// # Errors
    ///
    /// Returns the dispatch-layer error when resolution fails, or the
    /// handler's synchronous failure while producing its stream.
    pub async fn request_stream(&self, payload: Payload) -> Result<PayloadStream, ServerError> {
        let prepared = self.prepare(&payload, InteractionKind::RequestStream).await?;
        let PreparedCall {
            metadata,
            context,
            procedure,
        } = prepared;

        let ProcedureHandler::RequestStream(handler) = &procedure.handler else {
            return Err(self.mismatched_registration(&metadata, InteractionKind::RequestStream));
        };
        let token = context.cancellation_token();
        match handler(context, payload.data) {
            Ok(stream) => {
                self.chain.on_complete(&metadata, &CallOutcome::Success).await;
                Ok(PayloadStream::new(
                    stream.map(|item| item.map(Payload::data)).boxed(),
                    token,
                ))
            }
            Err(error) => Err(self.fail(&metadata, error).await),
        }
    }

    /// Handles a request-channel call: an initial payload plus further
    /// inbound payloads, answered by an independent outbound stream.
    ///
    /// The envelope is read from the initial payload only; metadata on
    /// subsequent inbound payloads is ignored.
    ///
    /// # Errors
    ///
    /// Returns the dispatch-layer error when resolution fails, or the
    /// handler's synchronous failure while producing its stream.
    pub async fn request_channel(
        &self,
        initial: Payload,
        inbound: BoxStream<'static, Payload>,
    ) -> Result<PayloadStream, ServerError> {
        let prepared = self
            .prepare(&initial, InteractionKind::RequestChannel)
            .await?;
        let PreparedCall {
            metadata,
            context,
            procedure,
        } = prepared;

        let ProcedureHandler::RequestChannel(handler) = &procedure.handler else {
            return Err(self.mismatched_registration(&metadata, InteractionKind::RequestChannel));
        };
        let token = context.cancellation_token();
        let raw_inbound: RawInputStream = inbound.map(|payload| payload.data).boxed();
        match handler(context, initial.data, raw_inbound) {
            Ok(stream) => {
                self.chain.on_complete(&metadata, &CallOutcome::Success).await;
                Ok(PayloadStream::new(
                    stream.map(|item| item.map(Payload::data)).boxed(),
                    token,
                ))
            }
            Err(error) => Err(self.fail(&metadata, error).await),
        }
    }

    /// Shared prelude: envelope decode, procedure resolution, interceptor
    /// chain, context assembly.
    async fn prepare(
        &self,
        payload: &Payload,
        kind: InteractionKind,
    ) -> Result<PreparedCall<'_>, ServerError> {
        let metadata_bytes = payload.metadata_or_missing()?;
        let metadata = Arc::new(self.metadata_codec.decode(metadata_bytes)?);

        let procedure = match self.registry.find_procedure(
            &metadata.service_name,
            &metadata.procedure_name,
            kind,
        ) {
            Ok(procedure) => procedure,
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    service = %metadata.service_name,
                    procedure = %metadata.procedure_name,
                    kind = %kind,
                    error = %error,
                    "call resolution failed"
                );
                return Err(error);
            }
        };

        debug!(
            target: DISPATCH_TARGET,
            service = %metadata.service_name,
            procedure = %metadata.procedure_name,
            kind = %kind,
            "dispatching call"
        );

        let mut builder = self.base_capabilities.to_builder();
        if let Err(error) = self.chain.on_call(&metadata, &mut builder).await {
            return Err(self.fail(&metadata, error).await);
        }

        let context = CallContext::new(
            Arc::clone(&metadata),
            builder.freeze(),
            CancellationToken::new(),
        );
        Ok(PreparedCall {
            metadata,
            context,
            procedure,
        })
    }

    /// Logs a failure, lets the chain observe it, and returns it.
    async fn fail(&self, metadata: &CallMetadata, error: ServerError) -> ServerError {
        warn!(
            target: DISPATCH_TARGET,
            service = %metadata.service_name,
            procedure = %metadata.procedure_name,
            error = %error,
            "call failed"
        );
        self.chain
            .on_complete(metadata, &CallOutcome::failure(&error))
            .await;
        error
    }

    /// Reports a registration whose stored handler shape disagrees with its
    /// registered kind. The registry constructors make this unrepresentable;
    /// the arm exists so dispatch never panics.
    fn mismatched_registration(
        &self,
        metadata: &CallMetadata,
        kind: InteractionKind,
    ) -> ServerError {
        ServerError::procedure_not_found(
            metadata.service_name.as_str(),
            metadata.procedure_name.as_str(),
            kind,
        )
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("chain", &self.chain)
            .finish()
    }
}
