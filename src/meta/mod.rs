//! Resource metadata model
//!
//! Every resource type carries a static, declarative description of
//! itself: its Kind/Version/Group, its property mapping, and the set of
//! API operations it supports. The dispatcher resolves these
//! descriptions instead of hard-coding URL patterns per verb.
//!
//! - [`schema`] - Static per-type declarations and the global registry
//! - [`model`] - The parsed, merged metadata for one type
//! - [`cache`] - Process-wide memoization and the Kind lookup index

pub mod cache;
pub mod kind;
pub mod model;
pub mod operation;
pub mod property;
pub mod schema;

pub use cache::{MetadataCache, MetadataStore};
pub use kind::KindMeta;
pub use model::ModelMeta;
pub use operation::{kubernetes_action, OperationMeta, ResponseModel};
pub use property::{PropertyKind, PropertyMeta};
pub use schema::{
    register_schema, registered_schemas, KindDecl, OperationDecl, PropertyDecl, PropertyKindDecl,
    ResourceSchema, ResponseDecl,
};
