//! Runtime descriptors mapping call targets to executable handlers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use courier_metadata::InteractionKind;
use futures::future::BoxFuture;
use futures::stream::{BoxStream, Stream, StreamExt};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::codec::PayloadCodec;
use crate::context::CallContext;
use crate::errors::{RegistryError, ServerError};

/// Stream of encoded response bodies produced by a streaming handler.
pub type RawOutputStream = BoxStream<'static, Result<Vec<u8>, ServerError>>;

/// Stream of raw inbound body frames on a request channel.
pub type RawInputStream = BoxStream<'static, Vec<u8>>;

type UnaryHandler =
    Arc<dyn Fn(CallContext, Vec<u8>) -> BoxFuture<'static, Result<Vec<u8>, ServerError>> + Send + Sync>;
type StreamHandler =
    Arc<dyn Fn(CallContext, Vec<u8>) -> Result<RawOutputStream, ServerError> + Send + Sync>;
type ChannelHandler = Arc<
    dyn Fn(CallContext, Vec<u8>, RawInputStream) -> Result<RawOutputStream, ServerError>
        + Send
        + Sync,
>;

/// The type-erased handler stored for one procedure.
pub(crate) enum ProcedureHandler {
    /// One request body in, one response body out.
    RequestResponse(UnaryHandler),
    /// One request body in, a stream of response bodies out.
    RequestStream(StreamHandler),
    /// Initial body plus inbound frames in, a stream of response bodies out.
    RequestChannel(ChannelHandler),
}

/// An executable procedure registered under one interaction kind.
///
/// Construction pairs a typed handler with the payload codec that
/// understands its request and response types; the descriptor stores the
/// erased form working on raw body bytes.
pub struct ProcedureDescriptor {
    name: String,
    kind: InteractionKind,
    pub(crate) handler: ProcedureHandler,
}

impl ProcedureDescriptor {
    /// Registers a request-response handler.
    #[must_use]
    pub fn request_response<C, Req, Resp, H, Fut>(
        name: impl Into<String>,
        codec: C,
        handler: H,
    ) -> Self
    where
        C: PayloadCodec,
        Req: DeserializeOwned + Send + 'static,
        Resp: Serialize + Send + 'static,
        H: Fn(CallContext, Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Resp, ServerError>> + Send + 'static,
    {
        let shared = Arc::new(handler);
        let erased: UnaryHandler = Arc::new(move |context, data| {
            let body_codec = codec.clone();
            let invoke = Arc::clone(&shared);
            Box::pin(async move {
                let request: Req = body_codec.decode(&data)?;
                let response = invoke(context, request).await?;
                Ok(body_codec.encode(&response)?)
            })
        });
        Self {
            name: name.into(),
            kind: InteractionKind::RequestResponse,
            handler: ProcedureHandler::RequestResponse(erased),
        }
    }

    /// Registers a request-stream handler.
    ///
    /// The handler returns its output stream synchronously; items are
    /// produced lazily as the consumer polls, in emission order.
    #[must_use]
    pub fn request_stream<C, Req, Resp, H, S>(name: impl Into<String>, codec: C, handler: H) -> Self
    where
        C: PayloadCodec,
        Req: DeserializeOwned + Send + 'static,
        Resp: Serialize + Send + 'static,
        H: Fn(CallContext, Req) -> S + Send + Sync + 'static,
        S: Stream<Item = Result<Resp, ServerError>> + Send + 'static,
    {
        let erased: StreamHandler = Arc::new(move |context, data| {
            let request: Req = codec.decode(&data)?;
            let encode = codec.clone();
            let stream = handler(context, request).map(move |item| {
                item.and_then(|response| encode.encode(&response).map_err(ServerError::from))
            });
            Ok(stream.boxed())
        });
        Self {
            name: name.into(),
            kind: InteractionKind::RequestStream,
            handler: ProcedureHandler::RequestStream(erased),
        }
    }

    /// Registers a request-channel handler.
    ///
    /// The handler receives the decoded initial request plus the decoded
    /// inbound frame stream; inbound and outbound cardinalities are
    /// independent.
    #[must_use]
    pub fn request_channel<C, Req, Resp, H, S>(
        name: impl Into<String>,
        codec: C,
        handler: H,
    ) -> Self
    where
        C: PayloadCodec,
        Req: DeserializeOwned + Send + 'static,
        Resp: Serialize + Send + 'static,
        H: Fn(CallContext, Req, BoxStream<'static, Result<Req, ServerError>>) -> S
            + Send
            + Sync
            + 'static,
        S: Stream<Item = Result<Resp, ServerError>> + Send + 'static,
    {
        let erased: ChannelHandler = Arc::new(move |context, data, inbound| {
            let initial: Req = codec.decode(&data)?;
            let decode = codec.clone();
            let typed_inbound = inbound
                .map(move |frame| decode.decode::<Req>(&frame).map_err(ServerError::from))
                .boxed();
            let encode = codec.clone();
            let stream = handler(context, initial, typed_inbound).map(move |item| {
                item.and_then(|response| encode.encode(&response).map_err(ServerError::from))
            });
            Ok(stream.boxed())
        });
        Self {
            name: name.into(),
            kind: InteractionKind::RequestChannel,
            handler: ProcedureHandler::RequestChannel(erased),
        }
    }

    /// Returns the procedure name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the interaction kind the procedure is registered under.
    #[must_use]
    pub const fn kind(&self) -> InteractionKind {
        self.kind
    }
}

impl fmt::Debug for ProcedureDescriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ProcedureDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// A named service owning its procedures, as supplied to the registry.
#[derive(Debug)]
pub struct ServiceDescriptor {
    name: String,
    procedures: Vec<ProcedureDescriptor>,
}

impl ServiceDescriptor {
    /// Creates an empty service descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            procedures: Vec::new(),
        }
    }

    /// Adds a procedure, builder-style. Duplicates are rejected when the
    /// registry is assembled.
    #[must_use]
    pub fn with_procedure(mut self, procedure: ProcedureDescriptor) -> Self {
        self.procedures.push(procedure);
        self
    }

    /// Returns the service name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

struct ServiceEntry {
    name: String,
    procedures: HashMap<String, ProcedureDescriptor>,
}

/// The server's read-only lookup table from call targets to handlers.
///
/// Built once at server start from a fixed set of service descriptors and
/// shared across all concurrent calls without locking.
pub struct ServiceRegistry {
    services: HashMap<String, ServiceEntry>,
}

impl ServiceRegistry {
    /// Assembles the registry, validating name uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when two services share a name or one
    /// service registers two procedures under the same name.
    pub fn new(
        services: impl IntoIterator<Item = ServiceDescriptor>,
    ) -> Result<Self, RegistryError> {
        let mut table = HashMap::new();
        for descriptor in services {
            let mut procedures = HashMap::new();
            for procedure in descriptor.procedures {
                let procedure_name = procedure.name.clone();
                if procedures.insert(procedure_name.clone(), procedure).is_some() {
                    return Err(RegistryError::DuplicateProcedure {
                        service: descriptor.name,
                        procedure: procedure_name,
                    });
                }
            }
            let entry = ServiceEntry {
                name: descriptor.name.clone(),
                procedures,
            };
            if table.insert(descriptor.name.clone(), entry).is_some() {
                return Err(RegistryError::DuplicateService {
                    service: descriptor.name,
                });
            }
        }
        Ok(Self { services: table })
    }

    /// Looks up a service by name.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::ServiceNotFound`] when no service carries the
    /// name.
    pub(crate) fn find_service(&self, service: &str) -> Result<&ServiceEntry, ServerError> {
        self.services
            .get(service)
            .ok_or_else(|| ServerError::service_not_found(service))
    }

    /// Looks up a procedure by service, name, and interaction kind.
    ///
    /// A procedure registered under a different kind is reported as not
    /// found: the mismatch surfaces during resolution, before any
    /// kind-incompatible invocation could start.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::ServiceNotFound`] or
    /// [`ServerError::ProcedureNotFound`].
    pub fn find_procedure(
        &self,
        service: &str,
        procedure: &str,
        kind: InteractionKind,
    ) -> Result<&ProcedureDescriptor, ServerError> {
        let entry = self.find_service(service)?;
        entry
            .procedures
            .get(procedure)
            .filter(|descriptor| descriptor.kind == kind)
            .ok_or_else(|| ServerError::procedure_not_found(entry.name.as_str(), procedure, kind))
    }

    /// Returns `true` when a service with the given name is registered.
    #[must_use]
    pub fn contains_service(&self, service: &str) -> bool {
        self.services.contains_key(service)
    }

    /// Enumerates every registered (service name, procedure) pair, in
    /// unspecified order.
    pub fn procedures(&self) -> impl Iterator<Item = (&str, &ProcedureDescriptor)> {
        self.services.values().flat_map(|entry| {
            entry
                .procedures
                .values()
                .map(|procedure| (entry.name.as_str(), procedure))
        })
    }

    /// Returns the number of registered services.
    #[must_use]
    pub fn service_count(&self) -> usize {
        self.services.len()
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ServiceRegistry")
            .field("services", &self.services.len())
            .finish()
    }
}
