//! Declaration URLs: the cross-reference currency of the schema model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Globally unique string key identifying a type, service, or scalar.
///
/// URLs are the only cross-reference mechanism between schema entities:
/// never a direct pointer, always resolved through the resolver. They are
/// stable across regenerations of the same schema. Scalars use bare
/// lowercase names (`bool`, `int32`, ...), declarations use dotted
/// `package.Name` paths, and map entries use `map<key;value>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclarationUrl(String);

impl DeclarationUrl {
    /// Scalar URL for `bool`.
    pub const BOOL: &'static str = "bool";
    /// Scalar URL for `int32`.
    pub const INT32: &'static str = "int32";
    /// Scalar URL for `int64`.
    pub const INT64: &'static str = "int64";
    /// Scalar URL for `uint32`.
    pub const UINT32: &'static str = "uint32";
    /// Scalar URL for `uint64`.
    pub const UINT64: &'static str = "uint64";
    /// Scalar URL for `sint32`.
    pub const SINT32: &'static str = "sint32";
    /// Scalar URL for `sint64`.
    pub const SINT64: &'static str = "sint64";
    /// Scalar URL for `fixed32`.
    pub const FIXED32: &'static str = "fixed32";
    /// Scalar URL for `fixed64`.
    pub const FIXED64: &'static str = "fixed64";
    /// Scalar URL for `sfixed32`.
    pub const SFIXED32: &'static str = "sfixed32";
    /// Scalar URL for `sfixed64`.
    pub const SFIXED64: &'static str = "sfixed64";
    /// Scalar URL for `float`.
    pub const FLOAT: &'static str = "float";
    /// Scalar URL for `double`.
    pub const DOUBLE: &'static str = "double";
    /// Scalar URL for `string`.
    pub const STRING: &'static str = "string";
    /// Scalar URL for `bytes`.
    pub const BYTES: &'static str = "bytes";

    const SCALARS: &'static [&'static str] = &[
        Self::BOOL,
        Self::INT32,
        Self::INT64,
        Self::UINT32,
        Self::UINT64,
        Self::SINT32,
        Self::SINT64,
        Self::FIXED32,
        Self::FIXED64,
        Self::SFIXED32,
        Self::SFIXED64,
        Self::FLOAT,
        Self::DOUBLE,
        Self::STRING,
        Self::BYTES,
    ];

    /// Creates a URL from its string form.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Builds a declaration URL from a package and a dotted name path.
    ///
    /// An empty package yields the bare name, so file-level declarations in
    /// unpackaged schemas remain addressable.
    #[must_use]
    pub fn declaration(package: &str, name: &str) -> Self {
        if package.is_empty() {
            Self(name.to_owned())
        } else {
            Self(format!("{package}.{name}"))
        }
    }

    /// Builds the URL of a map entry type from its key and value URLs.
    #[must_use]
    pub fn map(key: &Self, value: &Self) -> Self {
        Self(format!("map<{};{}>", key.0, value.0))
    }

    /// Returns the string form of the URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` when the URL names a built-in scalar.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        Self::SCALARS.contains(&self.0.as_str())
    }

    /// Returns `true` when the URL names a map entry type.
    #[must_use]
    pub fn is_map(&self) -> bool {
        self.0.starts_with("map<") && self.0.ends_with('>')
    }

    /// Returns the simple (unqualified) name of the declaration.
    ///
    /// For scalars and maps this is the whole URL.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        if self.is_map() {
            return &self.0;
        }
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Returns the package portion of the URL, empty for unqualified names.
    #[must_use]
    pub fn package(&self) -> &str {
        if self.is_map() {
            return "";
        }
        match self.0.rfind('.') {
            Some(split) => self.0.get(..split).unwrap_or(""),
            None => "",
        }
    }
}

impl fmt::Display for DeclarationUrl {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&str> for DeclarationUrl {
    fn from(url: &str) -> Self {
        Self(url.to_owned())
    }
}

impl From<String> for DeclarationUrl {
    fn from(url: String) -> Self {
        Self(url)
    }
}

/// URL addressing a single member (field or constant) of a declaration.
///
/// Rendered as `declaration#member`, these keys identify option fields and
/// the keys of message-typed option values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeMemberUrl(String);

impl TypeMemberUrl {
    /// Builds a member URL from the owning declaration and member name.
    #[must_use]
    pub fn new(declaration: &DeclarationUrl, member: &str) -> Self {
        Self(format!("{declaration}#{member}"))
    }

    /// Returns the string form of the member URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the owning declaration's URL.
    #[must_use]
    pub fn declaration(&self) -> DeclarationUrl {
        match self.0.split_once('#') {
            Some((declaration, _)) => DeclarationUrl::new(declaration),
            None => DeclarationUrl::new(self.0.clone()),
        }
    }

    /// Returns the member name, empty when absent.
    #[must_use]
    pub fn member(&self) -> &str {
        self.0.split_once('#').map_or("", |(_, member)| member)
    }
}

impl fmt::Display for TypeMemberUrl {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&str> for TypeMemberUrl {
    fn from(url: &str) -> Self {
        Self(url.to_owned())
    }
}
