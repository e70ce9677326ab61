//! Extension blocks adding fields to an existing message.

use serde::{Deserialize, Serialize};

use crate::ty::Field;
use crate::url::DeclarationUrl;

/// An extension block: extra fields declared for a message it does not own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extend {
    /// Declaration URL of the extension block itself.
    pub url: DeclarationUrl,
    /// URL of the message being extended.
    pub extends_url: DeclarationUrl,
    /// Simple name of the extension block.
    pub name: String,
    /// The fields the block contributes; each is flagged as an extension.
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Leading documentation, empty when absent.
    #[serde(default)]
    pub documentation: String,
}

impl Extend {
    /// Creates an extension block, flagging every contributed field.
    #[must_use]
    pub fn new(
        url: DeclarationUrl,
        extends_url: DeclarationUrl,
        name: impl Into<String>,
        fields: impl IntoIterator<Item = Field>,
    ) -> Self {
        Self {
            url,
            extends_url,
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|mut field| {
                    field.extension = true;
                    field
                })
                .collect(),
            documentation: String::new(),
        }
    }
}
