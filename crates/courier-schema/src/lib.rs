//! In-memory schema model and resolver for the Courier reflection surface.
//!
//! The model describes protobuf-like schemas: files owning services, types,
//! and extension blocks; messages owning fields and one-of groups; enums
//! owning constants; options attached at every level. Entities never point
//! at each other directly — every cross-reference is a [`DeclarationUrl`]
//! resolved through the [`SchemaResolver`], which keeps the graph acyclic
//! and allows arbitrary cross-file references.
//!
//! The resolver is built once from a complete file set and is immutable
//! afterwards, so it can be shared across concurrent readers without
//! locking. The [`query`] module defines the paged and batched request
//! shapes used to serve the model to remote reflection clients.

mod extend;
mod file;
mod options;
pub mod query;
mod resolver;
mod service;
mod ty;
mod url;

pub use extend::Extend;
pub use file::SchemaFile;
pub use options::{Options, SchemaOption, OptionValue};
pub use resolver::{Declaration, SchemaResolutionError, SchemaResolver};
pub use service::{Procedure, Service, StreamableUrl};
pub use ty::{EnumConstant, EnumType, Enclosing, Field, Message, OneOf, Type};
pub use url::{DeclarationUrl, TypeMemberUrl};
