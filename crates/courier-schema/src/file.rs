//! Schema files: the unit of schema ownership.

use serde::{Deserialize, Serialize};

use crate::extend::Extend;
use crate::options::Options;
use crate::service::Service;
use crate::ty::Type;

/// One schema unit: a file owning services, types, and extension blocks.
///
/// A file is created once per schema unit and is immutable thereafter; the
/// resolver indexes its contents without ever mutating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaFile {
    /// Source file name, unique within the schema set.
    pub name: String,
    /// Package the file declares, empty when unpackaged.
    #[serde(default)]
    pub package: String,
    /// File-level options.
    #[serde(default)]
    pub options: Options,
    /// Services declared at file level.
    #[serde(default)]
    pub services: Vec<Service>,
    /// Types declared at file level.
    #[serde(default)]
    pub types: Vec<Type>,
    /// Extension blocks declared at file level.
    #[serde(default)]
    pub extends: Vec<Extend>,
}

impl SchemaFile {
    /// Creates an empty file for the given name and package.
    #[must_use]
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            options: Options::new(),
            services: Vec::new(),
            types: Vec::new(),
            extends: Vec::new(),
        }
    }

    /// Adds file-level services, builder-style.
    #[must_use]
    pub fn with_services(mut self, services: impl IntoIterator<Item = Service>) -> Self {
        self.services.extend(services);
        self
    }

    /// Adds file-level types, builder-style.
    #[must_use]
    pub fn with_types(mut self, types: impl IntoIterator<Item = Type>) -> Self {
        self.types.extend(types);
        self
    }

    /// Adds file-level extension blocks, builder-style.
    #[must_use]
    pub fn with_extends(mut self, extends: impl IntoIterator<Item = Extend>) -> Self {
        self.extends.extend(extends);
        self
    }

    /// Returns `true` when the file's package equals or sits beneath the
    /// given package prefix.
    #[must_use]
    pub fn package_matches(&self, prefix: &str) -> bool {
        if prefix.is_empty() {
            return true;
        }
        self.package == prefix
            || self
                .package
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::exact("courier.reflection", "courier.reflection", true)]
    #[case::child("courier.reflection.v1", "courier.reflection", true)]
    #[case::parent_only("courier", "courier.reflection", false)]
    #[case::sibling_prefix("courierx.types", "courier", false)]
    #[case::unrelated("greeting.v1", "courier", false)]
    #[case::empty_prefix("greeting.v1", "", true)]
    fn package_prefix_matching(#[case] package: &str, #[case] prefix: &str, #[case] matches: bool) {
        let file = SchemaFile::new("test.proto", package);
        assert_eq!(file.package_matches(prefix), matches);
    }
}
