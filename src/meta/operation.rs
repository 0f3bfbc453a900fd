//! Operation metadata and the canonical action table

use serde::{Deserialize, Serialize};

/// One supported API action on a resource type.
///
/// `action` is the public vocabulary key (`"list-all"`, `"watch"`,
/// `"put-status"`, ...); [`kubernetes_action`] maps it to the literal
/// wire verb when the request is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationMeta {
    /// Action key this operation is looked up by
    pub action: String,
    /// URI template with `{name}`/`{namespace}` placeholders
    pub path: String,
    /// Name of the request-body model; presence implies a body is required
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// What the server responds with
    pub response: ResponseModel,
}

/// Declared response contract of an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseModel {
    /// The response deserializes into the resource's own type
    SelfModel,
    /// The response deserializes into the named model (e.g. `"Status"`)
    Named(String),
    /// No model; the raw body is handed back as a string
    None,
}

impl OperationMeta {
    /// Whether this operation requires a request body
    pub fn requires_body(&self) -> bool {
        self.body.is_some()
    }

    /// Whether the caller should expect a JSON model back
    pub fn expects_model(&self) -> bool {
        self.response != ResponseModel::None
    }
}

/// Map a public action key to the canonical wire verb.
///
/// The pluralized collection spellings collapse onto their HTTP-semantic
/// verb; every other key passes through unchanged.
pub fn kubernetes_action(action: &str) -> &str {
    match action {
        "watch-all" => "watch",
        "list-all" => "list",
        "deletecollection-all" => "deletecollection",
        other => other,
    }
}
