//! API server client
//!
//! [`Client`] owns the HTTP transport and the metadata cache and hands
//! out per-kind dispatchers. It is cheap to clone; clones share both.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::dispatch::KindClient;
use crate::errors::Result;
use crate::meta::{MetadataCache, MetadataStore};
use crate::resource::Resource;
use crate::transport::HttpTransport;
use crate::ws::WsConnection;

/// Entry point for talking to one API server.
#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    transport: Arc<HttpTransport>,
    cache: Arc<MetadataCache>,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Client {
            config,
            transport: Arc::new(transport),
            cache: Arc::new(MetadataCache::new()),
        })
    }

    /// Client whose metadata cache is additionally backed by an
    /// external store.
    pub fn with_metadata_store(config: ClientConfig, store: Arc<dyn MetadataStore>) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Client {
            config,
            transport: Arc::new(transport),
            cache: Arc::new(MetadataCache::with_store(store)),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Shared metadata cache, usable for Kind lookups on watch events.
    pub fn metadata(&self) -> &Arc<MetadataCache> {
        &self.cache
    }

    /// Typed dispatcher for one resource type, scoped to the client's
    /// default namespace.
    pub fn kind<R: Resource>(&self) -> KindClient<R> {
        KindClient::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.cache),
            self.config.default_namespace().to_string(),
        )
    }

    /// Open a WebSocket to an already-built operation URI.
    pub(crate) async fn ws_connect(
        &self,
        path_and_query: &str,
        subprotocol: &str,
    ) -> Result<WsConnection> {
        WsConnection::connect(&self.config, path_and_query, subprotocol).await
    }
}
