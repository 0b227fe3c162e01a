use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the store-assigned identifier.
pub const ID_FIELD: &str = "id";
/// Field holding the required, non-blank description.
pub const TEXT_FIELD: &str = "text";
/// Field holding the completion flag.
pub const COMPLETED_FIELD: &str = "completed";

/// Ordered sequence of documents, unique by id. Insertion order is the only
/// ordering guarantee.
pub type Collection = Vec<Document>;

/// A flat JSON record in the collection.
///
/// The store only interprets `id`, `text` and `completed`; every other field
/// is carried through untouched and keeps its position within the record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

/// A field value that violates the document rules.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// `text` is missing, not a string, or blank.
    #[error("Todo text is required.")]
    TextRequired,

    /// `completed` is present but not a boolean.
    #[error("Todo completed flag must be a boolean.")]
    CompletedNotBoolean,
}

impl Document {
    /// Build a new document from client-supplied fields.
    ///
    /// `text` must be a non-blank string. Any `id` or `completed` in `fields`
    /// is overwritten: the document gets `id` and starts out not completed.
    pub fn create(id: impl Into<String>, mut fields: Map<String, Value>) -> Result<Self, FieldError> {
        validate_new(&fields)?;
        fields.insert(ID_FIELD.into(), Value::String(id.into()));
        fields.insert(COMPLETED_FIELD.into(), Value::Bool(false));
        Ok(Self(fields))
    }

    /// Wrap raw fields without validation. Used by the codec, which checks
    /// ids itself.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// The document id, if present and a string.
    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_FIELD).and_then(Value::as_str)
    }

    pub fn text(&self) -> Option<&str> {
        self.0.get(TEXT_FIELD).and_then(Value::as_str)
    }

    /// Completion flag; absent or non-boolean reads as `false`.
    pub fn completed(&self) -> bool {
        self.0
            .get(COMPLETED_FIELD)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    /// Shallow-merge `patch` over this document.
    ///
    /// Existing keys keep their position, new keys are appended. The `id`
    /// field is never overwritten.
    pub fn merge(&mut self, patch: &Map<String, Value>) {
        for (key, value) in patch {
            if key == ID_FIELD {
                continue;
            }
            self.0.insert(key.clone(), value.clone());
        }
    }
}

/// Check client fields for a new document: `text` must be a non-blank
/// string.
pub fn validate_new(fields: &Map<String, Value>) -> Result<(), FieldError> {
    check_text(fields.get(TEXT_FIELD))
}

/// Check a partial update before it is merged.
///
/// Only the fields present in `patch` are checked: `text` must stay a
/// non-blank string and `completed` must stay a boolean.
pub fn validate_patch(patch: &Map<String, Value>) -> Result<(), FieldError> {
    if let Some(text) = patch.get(TEXT_FIELD) {
        check_text(Some(text))?;
    }
    match patch.get(COMPLETED_FIELD) {
        Some(Value::Bool(_)) | None => Ok(()),
        Some(_) => Err(FieldError::CompletedNotBoolean),
    }
}

fn check_text(value: Option<&Value>) -> Result<(), FieldError> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(()),
        _ => Err(FieldError::TextRequired),
    }
}
