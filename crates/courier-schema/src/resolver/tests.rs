//! Behaviour tests for resolver construction and lookup.

#![expect(clippy::expect_used, reason = "tests use expect for clarity")]

use rstest::rstest;

use crate::service::{Procedure, StreamableUrl};
use crate::ty::{EnumConstant, EnumType, Field};
use crate::{
    DeclarationUrl, Declaration, Extend, Message, SchemaFile, SchemaResolutionError,
    SchemaResolver, Service, Type,
};

fn url(path: &str) -> DeclarationUrl {
    DeclarationUrl::new(path)
}

fn greeting_file() -> SchemaFile {
    let request = Message::new(url("greeting.v1.HelloRequest"), "HelloRequest");
    let mut response = Message::new(url("greeting.v1.HelloResponse"), "HelloResponse");
    response.fields.push(Field::new(
        1,
        "message",
        DeclarationUrl::new(DeclarationUrl::STRING),
    ));

    let service = Service::new(
        url("greeting.v1.Greeter"),
        "Greeter",
        [Procedure::new(
            "Hello",
            StreamableUrl::single(url("greeting.v1.HelloRequest")),
            StreamableUrl::single(url("greeting.v1.HelloResponse")),
        )],
    );

    SchemaFile::new("greeting.proto", "greeting.v1")
        .with_services([service])
        .with_types([Type::Message(request), Type::Message(response)])
}

fn internal_file() -> SchemaFile {
    SchemaFile::new("reflection.proto", "courier.reflection").with_types([Type::Enum(
        EnumType {
            constants: vec![EnumConstant::new("UNKNOWN", 0)],
            ..EnumType::new(url("courier.reflection.Visibility"), "Visibility")
        },
    )])
}

#[test]
fn resolves_declarations_by_url() {
    let resolver = SchemaResolver::build([greeting_file()]).expect("build resolver");

    assert!(matches!(
        resolver.resolve(&url("greeting.v1.Greeter")),
        Some(Declaration::Service(_))
    ));
    assert!(matches!(
        resolver.resolve(&url("greeting.v1.HelloRequest")),
        Some(Declaration::Type(_))
    ));
    assert!(resolver.resolve(&url("greeting.v1.Missing")).is_none());

    let service = resolver
        .resolve_service(&url("greeting.v1.Greeter"))
        .expect("service present");
    assert_eq!(service.procedures.len(), 1);
}

#[test]
fn indexes_nested_declarations() {
    let nested_enum = Type::Enum(EnumType::new(url("outer.Parent.Kind"), "Kind"));
    let nested_extend = Extend::new(
        url("outer.Parent.Extra"),
        url("outer.Parent"),
        "Extra",
        [Field::new(100, "extra", DeclarationUrl::new(DeclarationUrl::BOOL))],
    );
    let parent = Message {
        nested_types: vec![nested_enum],
        nested_extends: vec![nested_extend],
        ..Message::new(url("outer.Parent"), "Parent")
    };
    let file = SchemaFile::new("outer.proto", "outer").with_types([Type::Message(parent)]);

    let resolver = SchemaResolver::build([file]).expect("build resolver");

    assert!(resolver.resolve_type(&url("outer.Parent.Kind")).is_some());
    assert!(resolver.resolve_extend(&url("outer.Parent.Extra")).is_some());
}

#[test]
fn colliding_urls_fail_the_build() {
    let first = SchemaFile::new("a.proto", "dup")
        .with_types([Type::Message(Message::new(url("dup.Thing"), "Thing"))]);
    let second = SchemaFile::new("b.proto", "dup")
        .with_types([Type::Message(Message::new(url("dup.Thing"), "Thing"))]);

    let error = SchemaResolver::build([first, second]).expect_err("collision must fail");
    assert!(matches!(
        error,
        SchemaResolutionError::UrlCollision { url } if url.as_str() == "dup.Thing"
    ));
}

#[rstest]
#[case::zero(0, 1)]
#[case::duplicate(2, 2)]
fn bad_field_tags_fail_the_build(#[case] first_tag: u32, #[case] second_tag: u32) {
    let message = Message {
        fields: vec![
            Field::new(first_tag, "a", DeclarationUrl::new(DeclarationUrl::BOOL)),
            Field::new(second_tag, "b", DeclarationUrl::new(DeclarationUrl::BOOL)),
        ],
        ..Message::new(url("bad.Tags"), "Tags")
    };
    let file = SchemaFile::new("bad.proto", "bad").with_types([Type::Message(message)]);

    let error = SchemaResolver::build([file]).expect_err("bad tags must fail");
    assert!(matches!(
        error,
        SchemaResolutionError::ZeroTag { .. } | SchemaResolutionError::DuplicateTag { .. }
    ));
}

#[test]
fn duplicate_file_names_fail_the_build() {
    let error = SchemaResolver::build([
        SchemaFile::new("same.proto", "a"),
        SchemaFile::new("same.proto", "b"),
    ])
    .expect_err("duplicate file must fail");
    assert!(matches!(error, SchemaResolutionError::DuplicateFile { name } if name == "same.proto"));
}

#[rstest]
#[case::hide_internal(&["courier"], &["greeting.proto"])]
#[case::hide_exact(&["courier.reflection"], &["greeting.proto"])]
#[case::hide_nothing(&[], &["greeting.proto", "reflection.proto"])]
#[case::hide_all(&["courier", "greeting"], &[])]
fn file_listing_honours_package_exclusions(
    #[case] excluded: &[&str],
    #[case] expected: &[&str],
) {
    let resolver =
        SchemaResolver::build([greeting_file(), internal_file()]).expect("build resolver");
    let prefixes: Vec<String> = excluded.iter().map(|&prefix| prefix.to_owned()).collect();

    let names: Vec<&str> = resolver
        .files(&prefixes)
        .map(|file| file.name.as_str())
        .collect();

    assert_eq!(names, expected);
}

#[test]
fn services_enumerate_in_file_order() {
    let resolver =
        SchemaResolver::build([greeting_file(), internal_file()]).expect("build resolver");

    let names: Vec<&str> = resolver.services().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Greeter"]);
    assert_eq!(resolver.file_count(), 2);
}
