//! The typed resource boundary

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::meta::ResourceSchema;
use crate::models::ObjectMeta;

/// A strongly-typed Kubernetes resource.
///
/// Implementors pair a serde-mapped struct with a static
/// [`ResourceSchema`] describing its Kind and supported operations.
/// The dispatcher never inspects the struct itself; everything it needs
/// comes from the schema and the [`ObjectMeta`] accessors.
pub trait Resource: Serialize + DeserializeOwned + Sized {
    /// The list envelope returned by this resource's list operations
    type List: DeserializeOwned;

    fn schema() -> &'static ResourceSchema;

    fn metadata(&self) -> Option<&ObjectMeta>;

    fn metadata_mut(&mut self) -> &mut ObjectMeta;

    fn name(&self) -> Option<&str> {
        self.metadata().and_then(|m| m.name.as_deref())
    }

    fn namespace(&self) -> Option<&str> {
        self.metadata().and_then(|m| m.namespace.as_deref())
    }
}
