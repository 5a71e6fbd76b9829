use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form nested key/value payload of a [`Document`].
pub type DocumentBody = Map<String, Value>;

/// A schema-flexible document: a name plus an arbitrarily nested body.
///
/// A document carries no identity of its own. The id is issued by the document store
/// when the document is saved and is never written back into the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    #[serde(default)]
    pub doc: DocumentBody,
}

impl Document {
    #[must_use]
    pub fn new(name: impl Into<String>, doc: DocumentBody) -> Self {
        Self { name: name.into(), doc }
    }
}
