//! The reflection service and its procedure handlers.

use std::sync::Arc;

use courier_schema::query::{BatchedRequest, BatchedResponse, PagedRequest, PagedResponse};
use courier_schema::{Extend, SchemaFile, SchemaResolver, Service, Type};
use courier_server::{
    DEFAULT_PAGE_SIZE, PayloadCodec, ProcedureDescriptor, ServerError, ServiceDescriptor,
};
use tracing::debug;

/// Tracing target for reflection queries.
const REFLECT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::service");

/// Fully-qualified name the reflection service registers under.
pub const SERVICE_NAME: &str = "courier.reflection.SchemaService";

/// Procedure name for the paged service listing.
pub const GET_AVAILABLE_SERVICES: &str = "GetAvailableServices";

/// Procedure name for the paged schema file listing.
pub const GET_AVAILABLE_FILES: &str = "GetAvailableFiles";

/// Procedure name for the batched type lookup.
pub const GET_TYPE_DETAILS_BATCH: &str = "GetTypeDetailsBatch";

/// Procedure name for the batched extension lookup.
pub const GET_EXTEND_DETAILS_BATCH: &str = "GetExtendDetailsBatch";

/// Serves a resolver snapshot to remote reflection clients.
///
/// The service holds the resolver behind an [`Arc`] and only ever reads it;
/// because the snapshot is immutable after server start, paged listings are
/// exhaustive for any page size and tokens stay valid for the lifetime of
/// the process.
#[derive(Debug)]
pub struct SchemaService {
    resolver: Arc<SchemaResolver>,
    exclude_packages: Vec<String>,
    default_page_size: u32,
}

impl SchemaService {
    /// Creates a reflection service over a built resolver.
    ///
    /// The framework's own `courier` packages are excluded from the file
    /// listing by default; the service listing is never filtered.
    #[must_use]
    pub fn new(resolver: Arc<SchemaResolver>) -> Self {
        Self {
            resolver,
            exclude_packages: vec!["courier".to_owned()],
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Replaces the package prefixes hidden from the file listing.
    #[must_use]
    pub fn with_excluded_packages(
        mut self,
        prefixes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.exclude_packages = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the page size substituted when a client asks for zero.
    ///
    /// Servers usually forward `ServerConfig::default_page_size` here so the
    /// reflection surface follows the configured paging behaviour.
    #[must_use]
    pub fn with_default_page_size(mut self, size: u32) -> Self {
        self.default_page_size = size.max(1);
        self
    }

    /// Lists the registered services, one page per call.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Handler`] when the request carries a page
    /// token this server did not issue.
    pub fn available_services(
        &self,
        request: &PagedRequest,
    ) -> Result<PagedResponse<Service>, ServerError> {
        let services: Vec<Service> = self.resolver.services().cloned().collect();
        let page = PagedResponse::paginate(&services, request, self.default_page_size)
            .map_err(|error| ServerError::handler(error.to_string()))?;
        debug!(
            target: REFLECT_TARGET,
            items = page.items.len(),
            has_next = page.next_page_token.is_some(),
            "listed services"
        );
        Ok(page)
    }

    /// Lists the schema files outside the excluded packages, one page per
    /// call.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Handler`] when the request carries a page
    /// token this server did not issue.
    pub fn available_files(
        &self,
        request: &PagedRequest,
    ) -> Result<PagedResponse<SchemaFile>, ServerError> {
        let files: Vec<SchemaFile> = self
            .resolver
            .files(&self.exclude_packages)
            .cloned()
            .collect();
        let page = PagedResponse::paginate(&files, request, self.default_page_size)
            .map_err(|error| ServerError::handler(error.to_string()))?;
        debug!(
            target: REFLECT_TARGET,
            items = page.items.len(),
            has_next = page.next_page_token.is_some(),
            "listed files"
        );
        Ok(page)
    }

    /// Resolves a batch of type URLs, omitting misses.
    #[must_use]
    pub fn type_details(&self, request: &BatchedRequest) -> BatchedResponse<Type> {
        let response =
            BatchedResponse::resolve_with(request, |url| self.resolver.resolve_type(url).cloned());
        debug!(
            target: REFLECT_TARGET,
            requested = request.urls.len(),
            found = response.found.len(),
            "resolved type batch"
        );
        response
    }

    /// Resolves a batch of extension block URLs, omitting misses.
    #[must_use]
    pub fn extend_details(&self, request: &BatchedRequest) -> BatchedResponse<Extend> {
        let response = BatchedResponse::resolve_with(request, |url| {
            self.resolver.resolve_extend(url).cloned()
        });
        debug!(
            target: REFLECT_TARGET,
            requested = request.urls.len(),
            found = response.found.len(),
            "resolved extend batch"
        );
        response
    }

    /// Wraps the service into an ordinary registry descriptor.
    ///
    /// All four procedures are request-response and share the supplied
    /// payload codec.
    #[must_use]
    pub fn into_service<C: PayloadCodec>(self, codec: C) -> ServiceDescriptor {
        let shared = Arc::new(self);

        let services = Arc::clone(&shared);
        let list_services = ProcedureDescriptor::request_response(
            GET_AVAILABLE_SERVICES,
            codec.clone(),
            move |_context, request: PagedRequest| {
                let schema = Arc::clone(&services);
                async move { schema.available_services(&request) }
            },
        );

        let files = Arc::clone(&shared);
        let list_files = ProcedureDescriptor::request_response(
            GET_AVAILABLE_FILES,
            codec.clone(),
            move |_context, request: PagedRequest| {
                let schema = Arc::clone(&files);
                async move { schema.available_files(&request) }
            },
        );

        let types = Arc::clone(&shared);
        let type_batch = ProcedureDescriptor::request_response(
            GET_TYPE_DETAILS_BATCH,
            codec.clone(),
            move |_context, request: BatchedRequest| {
                let schema = Arc::clone(&types);
                async move { Ok(schema.type_details(&request)) }
            },
        );

        let extends = Arc::clone(&shared);
        let extend_batch = ProcedureDescriptor::request_response(
            GET_EXTEND_DETAILS_BATCH,
            codec,
            move |_context, request: BatchedRequest| {
                let schema = Arc::clone(&extends);
                async move { Ok(schema.extend_details(&request)) }
            },
        );

        ServiceDescriptor::new(SERVICE_NAME)
            .with_procedure(list_services)
            .with_procedure(list_files)
            .with_procedure(type_batch)
            .with_procedure(extend_batch)
    }
}

#[cfg(test)]
mod tests;
