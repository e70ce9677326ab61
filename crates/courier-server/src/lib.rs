//! Server runtime for the Courier RPC framework.
//!
//! The runtime sits between an externally-provided multiplexed transport
//! and application handlers. Inbound frames arrive as [`Payload`] values
//! (metadata side-channel bytes plus opaque body bytes); the [`Dispatcher`]
//! decodes the envelope, resolves the target procedure in the
//! [`ServiceRegistry`] under the call's interaction kind, threads the call
//! through the [`InterceptorChain`], and invokes the registered handler
//! with a request-scoped [`CallContext`].
//!
//! The registry, interceptor chain, and base capabilities are built once at
//! startup and shared immutably across all concurrent calls; per-call state
//! lives in the context and is dropped with the call. Streaming calls
//! return a [`PayloadStream`] whose drop cancels the call's cancellation
//! token, so abandoned consumers stop producers promptly.

mod capabilities;
mod codec;
mod config;
mod context;
mod dispatcher;
mod errors;
mod interceptor;
mod payload;
mod registry;
mod telemetry;

pub use capabilities::{Capabilities, CapabilitiesBuilder};
pub use codec::{CodecError, JsonPayloadCodec, PayloadCodec};
pub use config::{DEFAULT_LOG_FILTER, DEFAULT_PAGE_SIZE, ServerConfig, ServerConfigBuilder};
pub use context::CallContext;
pub use dispatcher::{Dispatcher, PayloadStream};
pub use errors::{RegistryError, ServerError};
pub use interceptor::{CallOutcome, Interceptor, InterceptorChain};
pub use payload::Payload;
pub use registry::{
    ProcedureDescriptor, RawInputStream, RawOutputStream, ServiceDescriptor, ServiceRegistry,
};
pub use telemetry::{TelemetryError, TelemetryHandle, initialise};
