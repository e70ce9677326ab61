//! Schema reflection service for Courier servers.
//!
//! Exposes a server's [`courier_schema::SchemaResolver`] snapshot to remote
//! clients through four request-response procedures: paged listings of the
//! known services and schema files, and batched lookups of type and
//! extension declarations by URL. The service registers like any other —
//! [`SchemaService::into_service`] yields an ordinary descriptor for the
//! registry — and reads the resolver without ever mutating it, so it shares
//! the same snapshot as code emission and dispatch.

mod service;

pub use service::{
    GET_AVAILABLE_FILES, GET_AVAILABLE_SERVICES, GET_EXTEND_DETAILS_BATCH, GET_TYPE_DETAILS_BATCH,
    SERVICE_NAME, SchemaService,
};
