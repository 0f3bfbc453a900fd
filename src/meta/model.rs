//! Parsed, merged metadata for one resource type

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::{KubewireError, Result};

use super::kind::KindMeta;
use super::operation::OperationMeta;
use super::property::PropertyMeta;

/// Everything the dispatcher knows about one resource type: its Kind
/// identity, its property mapping, and its supported operations.
///
/// Built by [`schema::parse`](super::schema::parse) folding a type's
/// ancestor chain base-most first, so after the merge there is exactly
/// one operation per action key and the descendant's declaration wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Registry identity of the resource type (e.g. `core.v1.Pod`)
    pub type_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<KindMeta>,
    pub properties: IndexMap<String, PropertyMeta>,
    pub operations: IndexMap<String, OperationMeta>,
}

impl ModelMeta {
    pub fn new(type_id: impl Into<String>) -> Self {
        ModelMeta {
            type_id: type_id.into(),
            kind: None,
            properties: IndexMap::new(),
            operations: IndexMap::new(),
        }
    }

    /// Look up the operation for an action key.
    ///
    /// Unknown keys are a hard error naming the Kind (or the raw type id
    /// when the type declares no Kind) rather than a silent no-op.
    pub fn operation(&self, action: &str) -> Result<&OperationMeta> {
        self.operations
            .get(action)
            .ok_or_else(|| KubewireError::UnknownOperation {
                operation: action.to_string(),
                resource: self.describe(),
            })
    }

    /// Fold another layer of declarations into this metadata.
    ///
    /// Called once per ancestor-chain layer, base-most first: entries
    /// from later layers overwrite earlier ones by key, and a layer that
    /// declares a Kind replaces whatever an ancestor declared.
    pub fn fold_layer(
        &mut self,
        kind: Option<KindMeta>,
        properties: impl IntoIterator<Item = PropertyMeta>,
        operations: impl IntoIterator<Item = OperationMeta>,
    ) {
        if kind.is_some() {
            self.kind = kind;
        }
        for prop in properties {
            self.properties.insert(prop.name.clone(), prop);
        }
        for op in operations {
            self.operations.insert(op.action.clone(), op);
        }
    }

    fn describe(&self) -> String {
        match &self.kind {
            Some(kind) => kind.to_string(),
            None => self.type_id.clone(),
        }
    }
}
