//! Process-wide metadata cache and Kind lookup index

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::errors::{KubewireError, Result};

use super::model::ModelMeta;
use super::schema::{self, ResourceSchema};

/// Key the full Kind index is stored under in an external store
const KIND_INDEX_KEY: &str = "kubewire.meta.kind-index";

/// Pluggable external cache store for cross-process metadata reuse.
///
/// Individual type metadata is stored as serialized JSON under a
/// per-type key; the Kind index is one serialized map under a fixed key.
pub trait MetadataStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// Memoized map from resource type to its parsed [`ModelMeta`], plus a
/// lazily-built secondary index from `(apiVersion, kind)` to type id.
///
/// The schema is static per client version, so entries are populated
/// once and never invalidated within a run. Concurrent first-populate
/// races are tolerated: parsing is pure, the second writer wins with an
/// identical value.
pub struct MetadataCache {
    store: Option<Arc<dyn MetadataStore>>,
    models: RwLock<HashMap<&'static str, Arc<ModelMeta>>>,
    kind_index: OnceCell<HashMap<String, &'static str>>,
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataCache {
    /// Cache backed only by the in-process map
    pub fn new() -> Self {
        MetadataCache {
            store: None,
            models: RwLock::new(HashMap::new()),
            kind_index: OnceCell::new(),
        }
    }

    /// Cache backed by an external store in addition to the in-process map
    pub fn with_store(store: Arc<dyn MetadataStore>) -> Self {
        MetadataCache {
            store: Some(store),
            models: RwLock::new(HashMap::new()),
            kind_index: OnceCell::new(),
        }
    }

    /// Resolve the merged metadata for a resource type, memoized.
    pub fn get(&self, schema: &'static ResourceSchema) -> Arc<ModelMeta> {
        if let Some(meta) = self
            .models
            .read()
            .expect("metadata cache poisoned")
            .get(schema.type_id)
        {
            return Arc::clone(meta);
        }

        let meta = Arc::new(self.load(schema));
        self.models
            .write()
            .expect("metadata cache poisoned")
            .insert(schema.type_id, Arc::clone(&meta));
        meta
    }

    /// Look up the resource type id registered for `(apiVersion, kind)`.
    ///
    /// Builds the full index on first use by scanning every registered
    /// schema; an empty registry at that point is a fatal configuration
    /// error, because a silently empty index would make every watch
    /// event unmappable.
    pub fn resource_type_from_kind(
        &self,
        api_version: &str,
        kind: &str,
    ) -> Result<Option<&'static ResourceSchema>> {
        let index = self
            .kind_index
            .get_or_try_init(|| self.build_kind_index())?;
        Ok(index
            .get(&index_key(api_version, kind))
            .and_then(|type_id| schema::schema_by_type_id(type_id)))
    }

    fn load(&self, schema: &'static ResourceSchema) -> ModelMeta {
        if let Some(store) = &self.store {
            let key = model_key(schema.type_id);
            if let Some(raw) = store.get(&key) {
                match serde_json::from_str(&raw) {
                    Ok(meta) => {
                        debug!(type_id = schema.type_id, "metadata cache hit (external)");
                        return meta;
                    }
                    Err(e) => {
                        warn!(type_id = schema.type_id, error = %e, "discarding unreadable external cache entry");
                    }
                }
            }
            let meta = schema::parse(schema);
            if let Ok(raw) = serde_json::to_string(&meta) {
                store.set(&key, &raw);
            }
            return meta;
        }

        schema::parse(schema)
    }

    fn build_kind_index(&self) -> Result<HashMap<String, &'static str>> {
        if let Some(store) = &self.store {
            if let Some(raw) = store.get(KIND_INDEX_KEY) {
                if let Ok(stored) = serde_json::from_str::<HashMap<String, String>>(&raw) {
                    debug!(entries = stored.len(), "kind index loaded from external store");
                    // Map stored type ids back onto the live registry,
                    // dropping entries for types no longer registered.
                    let index = stored
                        .into_iter()
                        .filter_map(|(key, type_id)| {
                            schema::schema_by_type_id(&type_id).map(|schema| (key, schema.type_id))
                        })
                        .collect::<HashMap<_, _>>();
                    if !index.is_empty() {
                        return Ok(index);
                    }
                }
            }
        }

        let schemas = schema::registered_schemas();
        if schemas.is_empty() {
            return Err(KubewireError::Config(
                "no resource schemas registered; the Kind index cannot be built".to_string(),
            ));
        }

        let mut index = HashMap::new();
        for schema in schemas {
            // Types without a Kind declaration (list envelopes, bases)
            // are not addressable by watch events.
            let Some(kind) = &schema.kind else { continue };
            let api_version = match kind.group {
                Some(group) => format!("{}/{}", group, kind.version),
                None => kind.version.to_string(),
            };
            index.insert(index_key(&api_version, kind.kind), schema.type_id);
        }
        debug!(entries = index.len(), "kind index built from schema registry");

        if let Some(store) = &self.store {
            let stored: HashMap<&str, &str> = index
                .iter()
                .map(|(key, type_id)| (key.as_str(), *type_id))
                .collect();
            if let Ok(raw) = serde_json::to_string(&stored) {
                store.set(KIND_INDEX_KEY, &raw);
            }
        }

        Ok(index)
    }
}

fn model_key(type_id: &str) -> String {
    format!("kubewire.meta.{}", type_id)
}

fn index_key(api_version: &str, kind: &str) -> String {
    format!("{}/{}", api_version, kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pod::POD_SCHEMA;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapStore {
        entries: Mutex<HashMap<String, String>>,
        gets: Mutex<Vec<String>>,
    }

    impl MetadataStore for MapStore {
        fn get(&self, key: &str) -> Option<String> {
            self.gets.lock().unwrap().push(key.to_string());
            self.entries.lock().unwrap().get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
        }
    }

    #[test]
    fn test_get_memoizes() {
        let cache = MetadataCache::new();
        let first = cache.get(&POD_SCHEMA);
        let second = cache.get(&POD_SCHEMA);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_external_store_populated_on_miss() {
        let store = Arc::new(MapStore::default());
        let cache = MetadataCache::with_store(Arc::clone(&store) as Arc<dyn MetadataStore>);

        let meta = cache.get(&POD_SCHEMA);
        assert_eq!(meta.kind.as_ref().unwrap().kind, "Pod");

        let raw = store
            .entries
            .lock()
            .unwrap()
            .get("kubewire.meta.core.v1.Pod")
            .cloned()
            .expect("store populated");
        let stored: ModelMeta = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, *meta);
    }

    #[test]
    fn test_external_store_hit_skips_parse() {
        let store = Arc::new(MapStore::default());
        let seeded = schema::parse(&POD_SCHEMA);
        store.set(
            "kubewire.meta.core.v1.Pod",
            &serde_json::to_string(&seeded).unwrap(),
        );

        let cache = MetadataCache::with_store(Arc::clone(&store) as Arc<dyn MetadataStore>);
        let meta = cache.get(&POD_SCHEMA);
        assert_eq!(*meta, seeded);
    }

    #[test]
    fn test_kind_index_resolves_pod() {
        let cache = MetadataCache::new();
        let schema = cache.resource_type_from_kind("v1", "Pod").unwrap();
        assert_eq!(schema.unwrap().type_id, "core.v1.Pod");
    }

    #[test]
    fn test_kind_index_misses_unknown_kind() {
        let cache = MetadataCache::new();
        assert!(cache
            .resource_type_from_kind("v1", "Nonexistent")
            .unwrap()
            .is_none());
    }
}
