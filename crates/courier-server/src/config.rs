//! Typed server configuration.

use std::fmt;
use std::sync::Arc;

use courier_metadata::MetadataCodec;

use crate::capabilities::{Capabilities, CapabilitiesBuilder};
use crate::interceptor::Interceptor;

/// Default page size applied when a reflection client asks for size zero.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Default tracing filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Startup configuration for a Courier server.
///
/// Everything here is fixed before the first call is accepted: the ordered
/// interceptor list, the base capabilities every call starts from, the
/// envelope codec, the telemetry filter, and the reflection default page
/// size.
pub struct ServerConfig {
    interceptors: Vec<Arc<dyn Interceptor>>,
    capabilities: Capabilities,
    metadata_codec: Option<Arc<dyn MetadataCodec>>,
    log_filter: String,
    default_page_size: u32,
}

impl ServerConfig {
    /// Starts a configuration builder.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Returns the tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the page size substituted when a client asks for zero.
    #[must_use]
    pub const fn default_page_size(&self) -> u32 {
        self.default_page_size
    }

    /// Decomposes the configuration into the pieces the dispatcher owns.
    pub(crate) fn into_dispatch_parts(
        self,
    ) -> (
        Vec<Arc<dyn Interceptor>>,
        Capabilities,
        Option<Arc<dyn MetadataCodec>>,
    ) {
        (self.interceptors, self.capabilities, self.metadata_codec)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ServerConfig")
            .field("interceptors", &self.interceptors.len())
            .field("capabilities", &self.capabilities)
            .field("log_filter", &self.log_filter)
            .field("default_page_size", &self.default_page_size)
            .finish()
    }
}

/// Builder for [`ServerConfig`].
#[derive(Default)]
pub struct ServerConfigBuilder {
    interceptors: Vec<Arc<dyn Interceptor>>,
    capabilities: CapabilitiesBuilder,
    metadata_codec: Option<Arc<dyn MetadataCodec>>,
    log_filter: Option<String>,
    default_page_size: Option<u32>,
}

impl ServerConfigBuilder {
    /// Appends an interceptor; registration order is execution order.
    #[must_use]
    pub fn interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Provides a base capability available to every call.
    #[must_use]
    pub fn capability<T: Send + Sync + 'static>(mut self, capability: T) -> Self {
        self.capabilities.provide(capability);
        self
    }

    /// Replaces the metadata envelope codec (JSON by default).
    #[must_use]
    pub fn metadata_codec(mut self, codec: Arc<dyn MetadataCodec>) -> Self {
        self.metadata_codec = Some(codec);
        self
    }

    /// Sets the tracing filter expression.
    #[must_use]
    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }

    /// Sets the page size substituted when a client asks for zero.
    #[must_use]
    pub fn default_page_size(mut self, size: u32) -> Self {
        self.default_page_size = Some(size.max(1));
        self
    }

    /// Finalises the configuration.
    #[must_use]
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            interceptors: self.interceptors,
            capabilities: self.capabilities.freeze(),
            metadata_codec: self.metadata_codec,
            log_filter: self
                .log_filter
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned()),
            default_page_size: self.default_page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

impl fmt::Debug for ServerConfigBuilder {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ServerConfigBuilder")
            .field("interceptors", &self.interceptors.len())
            .field("capabilities", &self.capabilities)
            .finish()
    }
}
