#![expect(clippy::expect_used, reason = "tests use expect for clarity")]

use std::sync::Arc;

use courier_metadata::{CallMetadata, JsonMetadataCodec};
use courier_schema::query::{BatchedRequest, BatchedResponse, PagedRequest, PagedResponse};
use courier_schema::{
    DeclarationUrl, Extend, Field, Message, Procedure, SchemaFile, SchemaResolver, Service,
    StreamableUrl, Type,
};
use courier_server::{
    Dispatcher, JsonPayloadCodec, Payload, PayloadCodec, ServerError, ServiceRegistry,
};
use rstest::rstest;

use super::*;

fn greeting_file() -> SchemaFile {
    let request_url = DeclarationUrl::declaration("greeting.v1", "HelloRequest");
    let response_url = DeclarationUrl::declaration("greeting.v1", "HelloResponse");

    let mut request_message = Message::new(request_url.clone(), "HelloRequest");
    request_message.fields.push(Field::new(
        1,
        "name",
        DeclarationUrl::new(DeclarationUrl::STRING),
    ));
    let response_message = Message::new(response_url.clone(), "HelloResponse");

    let service = Service::new(
        DeclarationUrl::declaration("greeting.v1", "GreetingService"),
        "GreetingService",
        [Procedure::new(
            "Hello",
            StreamableUrl::single(request_url.clone()),
            StreamableUrl::single(response_url),
        )],
    );
    let extend = Extend::new(
        DeclarationUrl::declaration("greeting.v1", "HelloExtras"),
        request_url,
        "HelloExtras",
        [Field::new(
            100,
            "locale",
            DeclarationUrl::new(DeclarationUrl::STRING),
        )],
    );

    SchemaFile::new("greeting.proto", "greeting.v1")
        .with_services([service])
        .with_types([
            Type::Message(request_message),
            Type::Message(response_message),
        ])
        .with_extends([extend])
}

fn internal_file() -> SchemaFile {
    SchemaFile::new("courier_reflection.proto", "courier.reflection").with_services([
        Service::new(
            DeclarationUrl::declaration("courier.reflection", "SchemaService"),
            "SchemaService",
            [],
        ),
    ])
}

fn resolver() -> Arc<SchemaResolver> {
    Arc::new(SchemaResolver::build([greeting_file(), internal_file()]).expect("build resolver"))
}

#[test]
fn service_listing_covers_every_package() {
    let reflection = SchemaService::new(resolver());

    let page = reflection
        .available_services(&PagedRequest::first(10))
        .expect("list services");

    let names: Vec<&str> = page.items.iter().map(|service| service.name.as_str()).collect();
    assert_eq!(names, ["GreetingService", "SchemaService"]);
    assert!(page.next_page_token.is_none());
}

#[rstest]
#[case::single(1)]
#[case::pair(2)]
#[case::oversized(8)]
fn service_paging_is_exhaustive(#[case] page_size: u32) {
    let reflection = SchemaService::new(resolver());
    let mut collected = Vec::new();
    let mut request = PagedRequest::first(page_size);

    loop {
        let page = reflection
            .available_services(&request)
            .expect("list services");
        collected.extend(page.items.into_iter().map(|service| service.name));
        match page.next_page_token {
            Some(token) => request = PagedRequest::next(token, page_size),
            None => break,
        }
    }

    assert_eq!(collected, ["GreetingService", "SchemaService"]);
}

#[test]
fn file_listing_hides_framework_packages_by_default() {
    let reflection = SchemaService::new(resolver());

    let page = reflection
        .available_files(&PagedRequest::first(10))
        .expect("list files");

    let names: Vec<&str> = page.items.iter().map(|file| file.name.as_str()).collect();
    assert_eq!(names, ["greeting.proto"]);
}

#[test]
fn file_exclusions_are_configurable() {
    let everything = SchemaService::new(resolver()).with_excluded_packages(Vec::<String>::new());
    let full_page = everything
        .available_files(&PagedRequest::first(10))
        .expect("list files");
    assert_eq!(full_page.items.len(), 2);

    let inverted = SchemaService::new(resolver()).with_excluded_packages(["greeting"]);
    let filtered_page = inverted
        .available_files(&PagedRequest::first(10))
        .expect("list files");
    let names: Vec<&str> = filtered_page
        .items
        .iter()
        .map(|file| file.name.as_str())
        .collect();
    assert_eq!(names, ["courier_reflection.proto"]);
}

#[test]
fn zero_page_size_uses_the_configured_default() {
    let reflection = SchemaService::new(resolver()).with_default_page_size(1);

    let page = reflection
        .available_services(&PagedRequest::first(0))
        .expect("list services");

    assert_eq!(page.items.len(), 1);
    assert!(page.next_page_token.is_some());
}

#[test]
fn type_batch_omits_unknown_urls() {
    let reflection = SchemaService::new(resolver());
    let known = DeclarationUrl::declaration("greeting.v1", "HelloRequest");
    let unknown = DeclarationUrl::declaration("greeting.v1", "Missing");

    let response = reflection.type_details(&BatchedRequest::new([known.clone(), unknown.clone()]));

    assert_eq!(response.found.len(), 1);
    assert_eq!(
        response.found.get(&known).map(Type::name),
        Some("HelloRequest")
    );
    assert!(!response.found.contains_key(&unknown));
}

#[test]
fn extend_batch_resolves_extension_blocks() {
    let reflection = SchemaService::new(resolver());
    let url = DeclarationUrl::declaration("greeting.v1", "HelloExtras");

    let response = reflection.extend_details(&BatchedRequest::new([url.clone()]));

    let block = response.found.get(&url).expect("extension block resolves");
    assert_eq!(block.name, "HelloExtras");
    assert!(block.fields.iter().all(|field| field.extension));
}

async fn reflect(
    dispatcher: &Dispatcher,
    procedure: &str,
    body: Vec<u8>,
) -> Result<Payload, ServerError> {
    let metadata = CallMetadata::new(SERVICE_NAME, procedure);
    let payload =
        Payload::for_call(&JsonMetadataCodec, &metadata, body).expect("encode envelope");
    dispatcher.request_response(payload).await
}

fn reflection_dispatcher() -> Dispatcher {
    let descriptor = SchemaService::new(resolver()).into_service(JsonPayloadCodec);
    let registry = ServiceRegistry::new([descriptor]).expect("build registry");
    Dispatcher::new(registry)
}

#[tokio::test]
async fn dispatches_paged_listing_end_to_end() {
    let dispatcher = reflection_dispatcher();

    let body = JsonPayloadCodec
        .encode(&PagedRequest::first(0))
        .expect("encode request");
    let response = reflect(&dispatcher, GET_AVAILABLE_SERVICES, body)
        .await
        .expect("reflection call succeeds");

    let page: PagedResponse<Service> =
        JsonPayloadCodec.decode(&response.data).expect("decode page");
    let names: Vec<&str> = page.items.iter().map(|service| service.name.as_str()).collect();
    assert_eq!(names, ["GreetingService", "SchemaService"]);
}

#[tokio::test]
async fn dispatches_type_batch_end_to_end() {
    let dispatcher = reflection_dispatcher();
    let url = DeclarationUrl::declaration("greeting.v1", "HelloResponse");

    let body = JsonPayloadCodec
        .encode(&BatchedRequest::new([url.clone()]))
        .expect("encode request");
    let response = reflect(&dispatcher, GET_TYPE_DETAILS_BATCH, body)
        .await
        .expect("reflection call succeeds");

    let batch: BatchedResponse<Type> =
        JsonPayloadCodec.decode(&response.data).expect("decode batch");
    assert_eq!(batch.found.get(&url).map(Type::name), Some("HelloResponse"));
}

#[tokio::test]
async fn foreign_page_tokens_surface_as_handler_failures() {
    let dispatcher = reflection_dispatcher();

    let body = serde_json::to_vec(&serde_json::json!({
        "page_token": "not-an-offset",
        "page_size": 2,
    }))
    .expect("encode request");
    let error = reflect(&dispatcher, GET_AVAILABLE_FILES, body)
        .await
        .expect_err("bad token rejected");

    assert!(matches!(
        error,
        ServerError::Handler { message } if message.contains("not-an-offset")
    ));
}
