//! Operation dispatch
//!
//! [`KindClient`] turns a typed action on a resource type into one
//! transport call: resolve the operation metadata, attach the body and
//! expected response model, compute the effective namespace, build the
//! URI, and hand off to the transport.

use std::marker::PhantomData;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;

use crate::errors::{KubewireError, Result};
use crate::meta::{MetadataCache, ModelMeta};
use crate::models::{DeleteOptions, Status, WatchEvent};
use crate::patch::{JsonPatch, MergePatch};
use crate::resource::Resource;
use crate::transport::{ApiOutput, Flow, HttpTransport, SendOptions, Verb};
use crate::uri::{build_uri, Query};

/// Typed dispatcher for one resource type.
///
/// Obtained from [`Client::kind`](crate::Client::kind); scoped to the
/// client's default namespace unless narrowed with
/// [`within`](Self::within).
pub struct KindClient<R: Resource> {
    transport: Arc<HttpTransport>,
    cache: Arc<MetadataCache>,
    default_namespace: String,
    namespace_override: Option<String>,
    _marker: PhantomData<R>,
}

impl<R: Resource> Clone for KindClient<R> {
    fn clone(&self) -> Self {
        KindClient {
            transport: Arc::clone(&self.transport),
            cache: Arc::clone(&self.cache),
            default_namespace: self.default_namespace.clone(),
            namespace_override: self.namespace_override.clone(),
            _marker: PhantomData,
        }
    }
}

impl<R: Resource> KindClient<R> {
    pub(crate) fn new(
        transport: Arc<HttpTransport>,
        cache: Arc<MetadataCache>,
        default_namespace: String,
    ) -> Self {
        KindClient {
            transport,
            cache,
            default_namespace,
            namespace_override: None,
            _marker: PhantomData,
        }
    }

    /// A copy of this dispatcher explicitly scoped to `namespace`.
    ///
    /// The scope takes precedence over any namespace carried by a
    /// resource instance and over the client default.
    pub fn within(&self, namespace: impl Into<String>) -> Self {
        let mut scoped = self.clone();
        scoped.namespace_override = Some(namespace.into());
        scoped
    }

    /// Effective namespace: explicit scope > `instance_namespace` >
    /// client default.
    fn effective_namespace(&self, instance_namespace: Option<&str>) -> String {
        self.namespace_override
            .as_deref()
            .or(instance_namespace)
            .unwrap_or(&self.default_namespace)
            .to_string()
    }

    /// Merged metadata for this resource type
    pub fn meta(&self) -> Arc<ModelMeta> {
        self.cache.get(R::schema())
    }

    pub async fn create(&self, resource: &R) -> Result<R> {
        let output = self
            .dispatch("post", None, Some(resource), SendOptions::default())
            .await?;
        into_model(output)
    }

    pub async fn read(&self, name: &str) -> Result<R> {
        let output = self
            .dispatch("get", Some(name), None, SendOptions::default())
            .await?;
        into_model(output)
    }

    /// Replace the resource (PUT); the instance must carry its name.
    pub async fn replace(&self, resource: &R) -> Result<R> {
        let name = resource
            .name()
            .ok_or_else(|| KubewireError::Argument("resource has no name".to_string()))?
            .to_string();
        let output = self
            .dispatch("put", Some(&name), Some(resource), SendOptions::default())
            .await?;
        into_model(output)
    }

    pub async fn patch(&self, name: &str, patch: &JsonPatch) -> Result<R> {
        let options = SendOptions {
            body: Some(patch.to_value()),
            content_type: Some(patch.content_type()),
            ..Default::default()
        };
        into_model(self.dispatch("patch", Some(name), None, options).await?)
    }

    pub async fn merge_patch(&self, name: &str, patch: &MergePatch) -> Result<R> {
        let options = SendOptions {
            body: Some(patch.to_value()),
            content_type: Some(patch.content_type()),
            ..Default::default()
        };
        into_model(self.dispatch("patch", Some(name), None, options).await?)
    }

    pub async fn delete(&self, name: &str, query: Query) -> Result<Status> {
        let options = SendOptions {
            query,
            ..Default::default()
        };
        into_model(self.dispatch("delete", Some(name), None, options).await?)
    }

    /// Delete with an explicit [`DeleteOptions`] body (grace period,
    /// propagation policy, dry run).
    pub async fn delete_with(
        &self,
        name: &str,
        delete_options: &DeleteOptions,
        query: Query,
    ) -> Result<Status> {
        let options = SendOptions {
            body: Some(serde_json::to_value(delete_options)?),
            query,
            ..Default::default()
        };
        into_model(self.dispatch("delete", Some(name), None, options).await?)
    }

    /// Delete the whole collection in the effective namespace
    pub async fn delete_all(&self, query: Query) -> Result<Status> {
        let options = SendOptions {
            query,
            ..Default::default()
        };
        into_model(self.dispatch("deletecollection", None, None, options).await?)
    }

    pub async fn list(&self, query: Query) -> Result<R::List> {
        let options = SendOptions {
            query,
            ..Default::default()
        };
        into_model(self.dispatch("list", None, None, options).await?)
    }

    /// List across all namespaces
    pub async fn list_all(&self, query: Query) -> Result<R::List> {
        let options = SendOptions {
            query,
            ..Default::default()
        };
        into_model(self.dispatch("list-all", None, None, options).await?)
    }

    /// Watch the collection in the effective namespace.
    ///
    /// Blocks until the stream ends, the handler returns
    /// [`Flow::Stop`], or an error occurs.
    pub async fn watch<F>(&self, query: Query, handler: F) -> Result<()>
    where
        F: FnMut(WatchEvent) -> Flow + Send + 'static,
    {
        self.watch_action("watch", query, handler).await
    }

    /// Watch the collection across all namespaces
    pub async fn watch_all<F>(&self, query: Query, handler: F) -> Result<()>
    where
        F: FnMut(WatchEvent) -> Flow + Send + 'static,
    {
        self.watch_action("watch-all", query, handler).await
    }

    pub async fn get_status(&self, name: &str) -> Result<R> {
        into_model(
            self.dispatch("get-status", Some(name), None, SendOptions::default())
                .await?,
        )
    }

    pub async fn put_status(&self, resource: &R) -> Result<R> {
        let name = resource
            .name()
            .ok_or_else(|| KubewireError::Argument("resource has no name".to_string()))?
            .to_string();
        let output = self
            .dispatch("put-status", Some(&name), Some(resource), SendOptions::default())
            .await?;
        into_model(output)
    }

    pub async fn patch_status(&self, name: &str, patch: &JsonPatch) -> Result<R> {
        let options = SendOptions {
            body: Some(patch.to_value()),
            content_type: Some(patch.content_type()),
            ..Default::default()
        };
        into_model(self.dispatch("patch-status", Some(name), None, options).await?)
    }

    /// Proxy a request through the API server to the resource; the raw
    /// response body is returned unparsed.
    pub async fn proxy(&self, name: &str, path: &str, query: Query) -> Result<String> {
        let meta = self.meta();
        let op = meta.operation("proxy")?;
        let verb = Verb::from_action("proxy")?;

        let mut substitutions = IndexMap::new();
        substitutions.insert("{namespace}", self.effective_namespace(None));
        substitutions.insert("{name}", name.to_string());
        substitutions.insert("{path}", path.trim_start_matches('/').to_string());
        let uri = build_uri(&op.path, &substitutions, &query)?;

        let options = SendOptions {
            query,
            ..Default::default()
        };
        match self.transport.send(&uri, verb, options).await? {
            ApiOutput::Raw(body) => Ok(body),
            ApiOutput::Model(value) => Ok(value.to_string()),
            ApiOutput::StreamClosed => Err(KubewireError::Protocol(
                "proxy request produced a stream".to_string(),
            )),
        }
    }

    async fn watch_action<F>(&self, action: &str, mut query: Query, handler: F) -> Result<()>
    where
        F: FnMut(WatchEvent) -> Flow + Send + 'static,
    {
        if !query.contains("watch") {
            query.push("watch", "true");
        }
        let options = SendOptions {
            query,
            watch_handler: Some(Box::new(handler)),
            ..Default::default()
        };
        self.dispatch(action, None, None, options).await?;
        Ok(())
    }

    /// Resolve and send one operation.
    ///
    /// The effective namespace is the explicit [`within`](Self::within)
    /// scope when one is set, else the namespace carried by the
    /// instance, else the client default that seeded this dispatcher.
    pub(crate) async fn dispatch(
        &self,
        action: &str,
        name: Option<&str>,
        instance: Option<&R>,
        mut options: SendOptions,
    ) -> Result<ApiOutput> {
        let meta = self.meta();
        let op = meta.operation(action)?;
        let verb = Verb::from_action(action)?;

        if op.requires_body() && options.body.is_none() {
            match instance {
                Some(instance) => options.body = Some(serde_json::to_value(instance)?),
                None => {
                    return Err(KubewireError::Argument(format!(
                        "operation '{}' requires a request body",
                        action
                    )))
                }
            }
        }
        options.expect_model = op.expects_model();

        let namespace = self.effective_namespace(instance.and_then(|i| i.namespace()));

        let mut substitutions = IndexMap::new();
        substitutions.insert("{namespace}", namespace);
        if let Some(name) = name {
            substitutions.insert("{name}", name.to_string());
        }

        let uri = build_uri(&op.path, &substitutions, &options.query)?;
        self.transport.send(&uri, verb, options).await
    }

    /// Build the URI for an operation without sending, used by the
    /// WebSocket services to address their upgrade endpoints.
    pub(crate) fn operation_uri(
        &self,
        action: &str,
        name: &str,
        namespace: Option<&str>,
        query: &Query,
    ) -> Result<String> {
        let meta = self.meta();
        let op = meta.operation(action)?;
        let mut substitutions = IndexMap::new();
        substitutions.insert(
            "{namespace}",
            match namespace {
                Some(namespace) => namespace.to_string(),
                None => self.effective_namespace(None),
            },
        );
        substitutions.insert("{name}", name.to_string());
        build_uri(&op.path, &substitutions, query)
    }
}

fn into_model<T: DeserializeOwned>(output: ApiOutput) -> Result<T> {
    match output {
        ApiOutput::Model(value) => Ok(serde_json::from_value(value)?),
        // Servers occasionally answer without a JSON content type;
        // give the body one chance to parse before giving up.
        ApiOutput::Raw(body) => Ok(serde_json::from_str(&body)?),
        ApiOutput::StreamClosed => Err(KubewireError::Protocol(
            "expected a response model, got a consumed stream".to_string(),
        )),
    }
}
