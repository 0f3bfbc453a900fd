//! JSON Patch and Merge Patch builders

use serde_json::{json, Value as JsonValue};

/// Content type for RFC 6902 patch requests
pub const JSON_PATCH_CONTENT_TYPE: &str = "application/json-patch+json";
/// Content type for RFC 7386 merge patch requests
pub const MERGE_PATCH_CONTENT_TYPE: &str = "application/merge-patch+json";

/// Fluent builder for an RFC 6902 JSON Patch document.
///
/// Operations serialize in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct JsonPatch {
    operations: Vec<JsonValue>,
}

impl JsonPatch {
    pub fn new() -> Self {
        JsonPatch::default()
    }

    pub fn add(mut self, path: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.operations
            .push(json!({"op": "add", "path": path.into(), "value": value.into()}));
        self
    }

    pub fn remove(mut self, path: impl Into<String>) -> Self {
        self.operations
            .push(json!({"op": "remove", "path": path.into()}));
        self
    }

    pub fn replace(mut self, path: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.operations
            .push(json!({"op": "replace", "path": path.into(), "value": value.into()}));
        self
    }

    pub fn test(mut self, path: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.operations
            .push(json!({"op": "test", "path": path.into(), "value": value.into()}));
        self
    }

    pub fn copy(mut self, from: impl Into<String>, path: impl Into<String>) -> Self {
        self.operations
            .push(json!({"op": "copy", "from": from.into(), "path": path.into()}));
        self
    }

    #[allow(clippy::should_implement_trait)]
    pub fn r#move(mut self, from: impl Into<String>, path: impl Into<String>) -> Self {
        self.operations
            .push(json!({"op": "move", "from": from.into(), "path": path.into()}));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// The patch document as a JSON array
    pub fn to_value(&self) -> JsonValue {
        JsonValue::Array(self.operations.clone())
    }

    pub const fn content_type(&self) -> &'static str {
        JSON_PATCH_CONTENT_TYPE
    }
}

/// An RFC 7386 merge patch: a raw JSON document merged into the target.
#[derive(Debug, Clone)]
pub struct MergePatch {
    document: JsonValue,
}

impl MergePatch {
    pub fn new(document: JsonValue) -> Self {
        MergePatch { document }
    }

    pub fn to_value(&self) -> JsonValue {
        self.document.clone()
    }

    pub const fn content_type(&self) -> &'static str {
        MERGE_PATCH_CONTENT_TYPE
    }
}

impl From<JsonValue> for MergePatch {
    fn from(document: JsonValue) -> Self {
        MergePatch::new(document)
    }
}
