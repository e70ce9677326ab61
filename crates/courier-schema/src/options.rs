//! Options attached to schema declarations.

use serde::{Deserialize, Serialize};

use crate::url::TypeMemberUrl;

/// The value carried by a schema option.
///
/// The three shapes are distinct on the wire and must stay distinct:
/// message-typed options nest structured values, and collapsing a
/// [`OptionValue::MessageMap`] into a flat string map would lose the member
/// keys. The enum is externally tagged in serde so each variant round-trips
/// exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionValue {
    /// A plain textual value.
    Raw(String),
    /// A flat string-to-string map value.
    RawMap(Vec<(String, String)>),
    /// A message-typed value: member URL to nested value.
    MessageMap(Vec<(TypeMemberUrl, OptionValue)>),
}

/// A single option: a named, URL-qualified member set to a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaOption {
    /// Short name of the option as written in the schema source.
    pub name: String,
    /// Member URL of the option field being set.
    pub field_url: TypeMemberUrl,
    /// The assigned value.
    pub value: OptionValue,
}

impl SchemaOption {
    /// Creates an option assignment.
    #[must_use]
    pub fn new(name: impl Into<String>, field_url: TypeMemberUrl, value: OptionValue) -> Self {
        Self {
            name: name.into(),
            field_url,
            value,
        }
    }
}

/// An ordered collection of options attached to one declaration.
///
/// Order is preserved from the schema source; lookup is by the option
/// field's member URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(Vec<SchemaOption>);

impl Options {
    /// Creates an empty option set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value assigned to the given option field, when present.
    #[must_use]
    pub fn get(&self, field_url: &TypeMemberUrl) -> Option<&OptionValue> {
        self.0
            .iter()
            .find(|option| &option.field_url == field_url)
            .map(|option| &option.value)
    }

    /// Iterates over the options in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &SchemaOption> {
        self.0.iter()
    }

    /// Returns `true` when no options are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<SchemaOption> for Options {
    fn from_iter<I: IntoIterator<Item = SchemaOption>>(options: I) -> Self {
        Self(options.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "tests use expect for clarity")]

    use crate::url::DeclarationUrl;

    use super::*;

    fn member(name: &str) -> TypeMemberUrl {
        TypeMemberUrl::new(&DeclarationUrl::new("courier.OptionSet"), name)
    }

    #[test]
    fn message_map_round_trips_without_collapsing() {
        let value = OptionValue::MessageMap(vec![
            (member("retention"), OptionValue::Raw("30d".to_owned())),
            (
                member("labels"),
                OptionValue::RawMap(vec![("tier".to_owned(), "gold".to_owned())]),
            ),
        ]);

        let encoded = serde_json::to_string(&value).expect("encode option value");
        let decoded: OptionValue = serde_json::from_str(&encoded).expect("decode option value");

        assert_eq!(decoded, value);
        assert!(matches!(decoded, OptionValue::MessageMap(_)));
    }

    #[test]
    fn nested_message_maps_preserve_structure() {
        let inner = OptionValue::MessageMap(vec![(
            member("ttl"),
            OptionValue::Raw("60s".to_owned()),
        )]);
        let outer = OptionValue::MessageMap(vec![(member("cache"), inner.clone())]);

        let encoded = serde_json::to_string(&outer).expect("encode option value");
        let decoded: OptionValue = serde_json::from_str(&encoded).expect("decode option value");

        let OptionValue::MessageMap(entries) = decoded else {
            panic!("expected message map");
        };
        assert_eq!(entries.len(), 1);
        let (_, nested) = entries.first().expect("one entry");
        assert_eq!(nested, &inner);
    }

    #[test]
    fn lookup_by_field_url() {
        let options: Options = [
            SchemaOption::new("deprecated", member("deprecated"), OptionValue::Raw("true".to_owned())),
            SchemaOption::new("retention", member("retention"), OptionValue::Raw("30d".to_owned())),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            options.get(&member("retention")),
            Some(&OptionValue::Raw("30d".to_owned()))
        );
        assert_eq!(options.get(&member("unknown")), None);
        assert_eq!(options.len(), 2);
    }
}
