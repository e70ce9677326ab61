//! Out-of-band call metadata shared by the Courier runtime.
//!
//! Every call carries a small structured envelope naming the target service
//! and procedure, plus an extra key/value map for transport-adjacent data
//! such as authentication tokens or trace identifiers. The envelope travels
//! in a transport side-channel distinct from the payload, so it has its own
//! codec seam ([`MetadataCodec`]) independent of whatever body serialization
//! the application registers.
//!
//! The crate also defines [`InteractionKind`], the closed set of call shapes
//! a procedure can be registered under. The kind is derived from the
//! request/response streaming flags declared in the schema.

mod envelope;
mod errors;
mod kind;

pub use envelope::{CallMetadata, ExtraMetadata, JsonMetadataCodec, MetadataCodec};
pub use errors::MetadataError;
pub use kind::InteractionKind;
