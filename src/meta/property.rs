//! Per-field property metadata

use serde::{Deserialize, Serialize};

/// Mapping of one logical field to its wire attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMeta {
    /// Logical field name
    pub name: String,
    /// Attribute name on the wire
    pub attribute: String,
    pub kind: PropertyKind,
}

/// Discriminates how a property's value is (de)serialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    /// Plain JSON scalar
    Scalar,
    /// Nested single resource of the named model type
    Model(String),
    /// Repeated nested resources of the named model type
    Collection(String),
    /// RFC 3339 timestamp
    DateTime,
}
