//! Error types for call dispatch and registry construction.

use courier_metadata::{InteractionKind, MetadataError};
use thiserror::Error;

use crate::codec::CodecError;

/// Errors surfaced while dispatching a call.
///
/// Dispatch-layer failures are fully resolved before any handler runs and
/// are returned through the transport's error signalling for the call; the
/// framework never retries them. Handler-level failures are opaque to the
/// dispatcher and simply propagated.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The metadata envelope was absent or could not be decoded. Raised
    /// before any payload byte is touched.
    #[error("invalid metadata: {0}")]
    InvalidMetadata(#[from] MetadataError),

    /// No registered service carries the requested name.
    #[error("service not found: {service}")]
    ServiceNotFound {
        /// The requested service name.
        service: String,
    },

    /// The service exists but has no procedure under the requested name and
    /// interaction kind. A procedure registered under a different kind is
    /// deliberately invisible here, so kind mismatches surface before any
    /// invocation is attempted.
    #[error("procedure not found: {service}/{procedure} ({kind})")]
    ProcedureNotFound {
        /// The requested service name.
        service: String,
        /// The requested procedure name.
        procedure: String,
        /// The interaction kind the lookup asked for.
        kind: InteractionKind,
    },

    /// A payload body failed to encode or decode.
    #[error("codec failure: {0}")]
    Codec(#[from] CodecError),

    /// An application-level failure raised by the handler itself.
    #[error("handler failure: {message}")]
    Handler {
        /// Description supplied by the handler.
        message: String,
    },
}

impl ServerError {
    /// Creates a `ServiceNotFound` error.
    #[must_use]
    pub fn service_not_found(service: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            service: service.into(),
        }
    }

    /// Creates a `ProcedureNotFound` error.
    #[must_use]
    pub fn procedure_not_found(
        service: impl Into<String>,
        procedure: impl Into<String>,
        kind: InteractionKind,
    ) -> Self {
        Self::ProcedureNotFound {
            service: service.into(),
            procedure: procedure.into(),
            kind,
        }
    }

    /// Creates a handler-level application failure.
    #[must_use]
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler {
            message: message.into(),
        }
    }
}

/// Errors detected while assembling the service registry.
///
/// Registry construction happens once at server start; any failure here is
/// fatal to startup.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two services were registered under the same name.
    #[error("duplicate service registration: {service}")]
    DuplicateService {
        /// The service name registered twice.
        service: String,
    },

    /// One service registered two procedures under the same name.
    #[error("duplicate procedure registration: {service}/{procedure}")]
    DuplicateProcedure {
        /// The owning service name.
        service: String,
        /// The procedure name registered twice.
        procedure: String,
    },
}
