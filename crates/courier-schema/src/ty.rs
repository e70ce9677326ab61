//! Type declarations: messages, enums, and enclosing namespaces.

use serde::{Deserialize, Serialize};

use crate::extend::Extend;
use crate::options::Options;
use crate::url::DeclarationUrl;

/// A single field of a message, one-of group, or extension block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Wire tag; positive and unique within the owning message.
    pub tag: u32,
    /// Field name as written in the schema source.
    pub name: String,
    /// URL of the field's type; may be a scalar, a declaration, or a map
    /// entry URL.
    pub type_url: DeclarationUrl,
    /// Whether the field is repeated.
    #[serde(default)]
    pub repeated: bool,
    /// Whether the field was declared inside an extension block.
    #[serde(default)]
    pub extension: bool,
    /// Whether the field belongs to a one-of group.
    #[serde(default)]
    pub in_one_of: bool,
    /// Options set on the field.
    #[serde(default)]
    pub options: Options,
    /// Leading documentation, empty when absent.
    #[serde(default)]
    pub documentation: String,
}

impl Field {
    /// Creates a plain singular field.
    #[must_use]
    pub fn new(tag: u32, name: impl Into<String>, type_url: DeclarationUrl) -> Self {
        Self {
            tag,
            name: name.into(),
            type_url,
            repeated: false,
            extension: false,
            in_one_of: false,
            options: Options::new(),
            documentation: String::new(),
        }
    }

    /// Marks the field as repeated, builder-style.
    #[must_use]
    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    /// Marks the field as a one-of member, builder-style.
    #[must_use]
    pub fn in_one_of(mut self) -> Self {
        self.in_one_of = true;
        self
    }
}

/// A one-of group: a set of mutually exclusive fields within a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneOf {
    /// Group name.
    pub name: String,
    /// The member fields; each is flagged as a one-of member.
    pub fields: Vec<Field>,
    /// Options set on the group.
    #[serde(default)]
    pub options: Options,
    /// Leading documentation, empty when absent.
    #[serde(default)]
    pub documentation: String,
}

impl OneOf {
    /// Creates a one-of group, flagging every member field.
    #[must_use]
    pub fn new(name: impl Into<String>, fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Field::in_one_of).collect(),
            options: Options::new(),
            documentation: String::new(),
        }
    }
}

/// A message declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Declaration URL of the message.
    pub url: DeclarationUrl,
    /// Simple name of the message.
    pub name: String,
    /// Plain fields declared directly on the message.
    #[serde(default)]
    pub fields: Vec<Field>,
    /// One-of groups declared on the message.
    #[serde(default)]
    pub one_ofs: Vec<OneOf>,
    /// Types nested inside the message.
    #[serde(default)]
    pub nested_types: Vec<Type>,
    /// Extension blocks nested inside the message.
    #[serde(default)]
    pub nested_extends: Vec<Extend>,
    /// Options set on the message.
    #[serde(default)]
    pub options: Options,
    /// Leading documentation, empty when absent.
    #[serde(default)]
    pub documentation: String,
}

impl Message {
    /// Creates an empty message declaration.
    #[must_use]
    pub fn new(url: DeclarationUrl, name: impl Into<String>) -> Self {
        Self {
            url,
            name: name.into(),
            fields: Vec::new(),
            one_ofs: Vec::new(),
            nested_types: Vec::new(),
            nested_extends: Vec::new(),
            options: Options::new(),
            documentation: String::new(),
        }
    }

    /// Iterates over every field the message owns, including one-of members.
    pub fn all_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields
            .iter()
            .chain(self.one_ofs.iter().flat_map(|group| group.fields.iter()))
    }
}

/// A single enum constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumConstant {
    /// Constant name.
    pub name: String,
    /// Numeric value of the constant.
    pub value: i32,
    /// Options set on the constant.
    #[serde(default)]
    pub options: Options,
    /// Leading documentation, empty when absent.
    #[serde(default)]
    pub documentation: String,
}

impl EnumConstant {
    /// Creates a constant without options or documentation.
    #[must_use]
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into(),
            value,
            options: Options::new(),
            documentation: String::new(),
        }
    }
}

/// An enum declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumType {
    /// Declaration URL of the enum.
    pub url: DeclarationUrl,
    /// Simple name of the enum.
    pub name: String,
    /// The constants, in declaration order.
    #[serde(default)]
    pub constants: Vec<EnumConstant>,
    /// Options set on the enum.
    #[serde(default)]
    pub options: Options,
    /// Leading documentation, empty when absent.
    #[serde(default)]
    pub documentation: String,
}

impl EnumType {
    /// Creates an empty enum declaration.
    #[must_use]
    pub fn new(url: DeclarationUrl, name: impl Into<String>) -> Self {
        Self {
            url,
            name: name.into(),
            constants: Vec::new(),
            options: Options::new(),
            documentation: String::new(),
        }
    }
}

/// A non-instantiable namespace that only owns nested declarations.
///
/// Produced when a schema unit declares nested types whose enclosing
/// message was elided; it exists purely so the nested declarations keep a
/// resolvable parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enclosing {
    /// Declaration URL of the namespace.
    pub url: DeclarationUrl,
    /// Simple name of the namespace.
    pub name: String,
    /// Types nested inside the namespace.
    #[serde(default)]
    pub nested_types: Vec<Type>,
    /// Extension blocks nested inside the namespace.
    #[serde(default)]
    pub nested_extends: Vec<Extend>,
    /// Leading documentation, empty when absent.
    #[serde(default)]
    pub documentation: String,
}

impl Enclosing {
    /// Creates an empty enclosing namespace.
    #[must_use]
    pub fn new(url: DeclarationUrl, name: impl Into<String>) -> Self {
        Self {
            url,
            name: name.into(),
            nested_types: Vec::new(),
            nested_extends: Vec::new(),
            documentation: String::new(),
        }
    }
}

/// A type declaration, polymorphic over the closed variant set fixed by the
/// schema grammar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Type {
    /// A message with fields and nested declarations.
    Message(Message),
    /// An enum with constants.
    Enum(EnumType),
    /// A namespace-only declaration.
    Enclosing(Enclosing),
}

impl Type {
    /// Returns the declaration URL of the type.
    #[must_use]
    pub const fn url(&self) -> &DeclarationUrl {
        match self {
            Self::Message(message) => &message.url,
            Self::Enum(enum_type) => &enum_type.url,
            Self::Enclosing(enclosing) => &enclosing.url,
        }
    }

    /// Returns the simple name of the type.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Message(message) => &message.name,
            Self::Enum(enum_type) => &enum_type.name,
            Self::Enclosing(enclosing) => &enclosing.name,
        }
    }

    /// Returns the type's documentation string, empty when absent.
    #[must_use]
    pub fn documentation(&self) -> &str {
        match self {
            Self::Message(message) => &message.documentation,
            Self::Enum(enum_type) => &enum_type.documentation,
            Self::Enclosing(enclosing) => &enclosing.documentation,
        }
    }

    /// Returns the types nested directly inside this one.
    #[must_use]
    pub fn nested_types(&self) -> &[Type] {
        match self {
            Self::Message(message) => &message.nested_types,
            Self::Enum(_) => &[],
            Self::Enclosing(enclosing) => &enclosing.nested_types,
        }
    }

    /// Returns the extension blocks nested directly inside this type.
    #[must_use]
    pub fn nested_extends(&self) -> &[Extend] {
        match self {
            Self::Message(message) => &message.nested_extends,
            Self::Enum(_) => &[],
            Self::Enclosing(enclosing) => &enclosing.nested_extends,
        }
    }
}
