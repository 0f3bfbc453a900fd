//! Static resource schemas and the global registry
//!
//! The original driver for this metadata was runtime reflection over
//! annotated model classes. Here every resource type instead declares a
//! `static` [`ResourceSchema`] and the same inheritance-merge semantics
//! are applied over the explicit `parent` chain: ancestors are folded
//! base-most first and the descendant wins on key collision.

use std::sync::RwLock;

use once_cell::sync::Lazy;

use super::kind::KindMeta;
use super::model::ModelMeta;
use super::operation::{OperationMeta, ResponseModel};
use super::property::{PropertyKind, PropertyMeta};

/// Declarative description of one resource type.
///
/// All fields are `'static` so schemas can be declared as constants next
/// to the model structs they describe.
#[derive(Debug)]
pub struct ResourceSchema {
    /// Stable registry identity, e.g. `core.v1.Pod`
    pub type_id: &'static str,
    /// Base schema this type extends, if any
    pub parent: Option<&'static ResourceSchema>,
    pub kind: Option<KindDecl>,
    pub operations: &'static [OperationDecl],
    pub properties: &'static [PropertyDecl],
}

#[derive(Debug)]
pub struct KindDecl {
    pub kind: &'static str,
    pub version: &'static str,
    pub group: Option<&'static str>,
}

#[derive(Debug)]
pub struct OperationDecl {
    pub action: &'static str,
    pub path: &'static str,
    pub body: Option<&'static str>,
    pub response: ResponseDecl,
}

#[derive(Debug)]
pub enum ResponseDecl {
    SelfModel,
    Named(&'static str),
    None,
}

#[derive(Debug)]
pub struct PropertyDecl {
    pub name: &'static str,
    pub attribute: &'static str,
    pub kind: PropertyKindDecl,
}

#[derive(Debug)]
pub enum PropertyKindDecl {
    Scalar,
    Model(&'static str),
    Collection(&'static str),
    DateTime,
}

impl KindDecl {
    fn to_meta(&self) -> KindMeta {
        KindMeta {
            kind: self.kind.to_string(),
            version: self.version.to_string(),
            group: self.group.map(str::to_string),
        }
    }
}

impl OperationDecl {
    fn to_meta(&self) -> OperationMeta {
        OperationMeta {
            action: self.action.to_string(),
            path: self.path.to_string(),
            body: self.body.map(str::to_string),
            response: match &self.response {
                ResponseDecl::SelfModel => ResponseModel::SelfModel,
                ResponseDecl::Named(name) => ResponseModel::Named(name.to_string()),
                ResponseDecl::None => ResponseModel::None,
            },
        }
    }
}

impl PropertyDecl {
    fn to_meta(&self) -> PropertyMeta {
        PropertyMeta {
            name: self.name.to_string(),
            attribute: self.attribute.to_string(),
            kind: match &self.kind {
                PropertyKindDecl::Scalar => PropertyKind::Scalar,
                PropertyKindDecl::Model(name) => PropertyKind::Model(name.to_string()),
                PropertyKindDecl::Collection(name) => PropertyKind::Collection(name.to_string()),
                PropertyKindDecl::DateTime => PropertyKind::DateTime,
            },
        }
    }
}

/// Parse a schema into merged [`ModelMeta`].
///
/// The ancestor chain is collected derived-to-base, then folded in
/// reverse so each descendant layer overwrites its base by key. A type
/// that declares nothing yields empty collections, not an error.
pub fn parse(schema: &'static ResourceSchema) -> ModelMeta {
    let mut chain = Vec::new();
    let mut current = Some(schema);
    while let Some(layer) = current {
        chain.push(layer);
        current = layer.parent;
    }

    let mut meta = ModelMeta::new(schema.type_id);
    for layer in chain.into_iter().rev() {
        meta.fold_layer(
            layer.kind.as_ref().map(KindDecl::to_meta),
            layer.properties.iter().map(PropertyDecl::to_meta),
            layer.operations.iter().map(OperationDecl::to_meta),
        );
    }
    meta
}

static REGISTRY: Lazy<RwLock<Vec<&'static ResourceSchema>>> = Lazy::new(|| {
    RwLock::new(vec![
        &crate::models::pod::POD_SCHEMA,
        &crate::models::pod::POD_LIST_SCHEMA,
    ])
});

/// Register an application-defined resource schema.
///
/// Registration makes the type resolvable through the Kind index used
/// when watch events are mapped back to resource types. Registering the
/// same schema twice is a no-op.
pub fn register_schema(schema: &'static ResourceSchema) {
    let mut registry = REGISTRY.write().expect("schema registry poisoned");
    if !registry
        .iter()
        .any(|existing| existing.type_id == schema.type_id)
    {
        registry.push(schema);
    }
}

/// Snapshot of every registered schema
pub fn registered_schemas() -> Vec<&'static ResourceSchema> {
    REGISTRY.read().expect("schema registry poisoned").clone()
}

/// Find a registered schema by its type id
pub fn schema_by_type_id(type_id: &str) -> Option<&'static ResourceSchema> {
    registered_schemas()
        .into_iter()
        .find(|schema| schema.type_id == type_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    static BASE: ResourceSchema = ResourceSchema {
        type_id: "test.v1.Base",
        parent: None,
        kind: Some(KindDecl {
            kind: "Base",
            version: "v1",
            group: Some("test"),
        }),
        operations: &[
            OperationDecl {
                action: "get",
                path: "/apis/test/v1/bases/{name}",
                body: None,
                response: ResponseDecl::SelfModel,
            },
            OperationDecl {
                action: "delete",
                path: "/apis/test/v1/bases/{name}",
                body: None,
                response: ResponseDecl::Named("Status"),
            },
        ],
        properties: &[PropertyDecl {
            name: "metadata",
            attribute: "metadata",
            kind: PropertyKindDecl::Model("ObjectMeta"),
        }],
    };

    static DERIVED: ResourceSchema = ResourceSchema {
        type_id: "test.v1.Derived",
        parent: Some(&BASE),
        kind: None,
        operations: &[OperationDecl {
            action: "get",
            path: "/apis/test/v1/deriveds/{name}",
            body: None,
            response: ResponseDecl::SelfModel,
        }],
        properties: &[],
    };

    #[test]
    fn test_child_operation_overrides_parent() {
        let meta = parse(&DERIVED);
        assert_eq!(
            meta.operation("get").unwrap().path,
            "/apis/test/v1/deriveds/{name}"
        );
        // Non-overridden operation inherited from the base
        assert_eq!(
            meta.operation("delete").unwrap().path,
            "/apis/test/v1/bases/{name}"
        );
        assert_eq!(meta.operations.len(), 2);
    }

    #[test]
    fn test_kind_inherited_from_nearest_declaring_ancestor() {
        let meta = parse(&DERIVED);
        let kind = meta.kind.unwrap();
        assert_eq!(kind.kind, "Base");
        assert_eq!(kind.api_version(), "test/v1");
    }

    #[test]
    fn test_empty_declarations_parse_to_empty_collections() {
        static BARE: ResourceSchema = ResourceSchema {
            type_id: "test.v1.Bare",
            parent: None,
            kind: None,
            operations: &[],
            properties: &[],
        };
        let meta = parse(&BARE);
        assert!(meta.kind.is_none());
        assert!(meta.operations.is_empty());
        assert!(meta.properties.is_empty());
    }

    #[test]
    fn test_register_is_idempotent() {
        register_schema(&BASE);
        register_schema(&BASE);
        let count = registered_schemas()
            .iter()
            .filter(|s| s.type_id == "test.v1.Base")
            .count();
        assert_eq!(count, 1);
    }
}
