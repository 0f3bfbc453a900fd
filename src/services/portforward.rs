//! Port forwarding request builder

use crate::client::Client;
use crate::errors::{KubewireError, Result};
use crate::models::Pod;
use crate::uri::Query;
use crate::ws::{PortForwardListener, PortForwardSession, PORT_FORWARD_SUBPROTOCOL};

/// Forward one or more pod ports over a multiplexed WebSocket.
///
/// Each requested port gets a data channel and an error channel; the
/// session delivers them to the listener once the server has announced
/// every channel.
#[derive(Debug, Clone)]
pub struct PortForwardRequest {
    name: String,
    namespace: Option<String>,
    ports: Vec<u16>,
}

impl PortForwardRequest {
    pub fn new(pod_name: impl Into<String>) -> Self {
        PortForwardRequest {
            name: pod_name.into(),
            namespace: None,
            ports: Vec::new(),
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// The pod ports to forward, sent as repeated `ports` keys.
    pub fn ports<I>(mut self, ports: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        self.ports = ports.into_iter().collect();
        self
    }

    fn query(&self) -> Result<Query> {
        if self.ports.is_empty() {
            return Err(KubewireError::Argument(
                "port forwarding requires at least one port".to_string(),
            ));
        }
        let mut query = Query::new();
        query.push_many("ports", &self.ports);
        Ok(query)
    }

    /// Open the connection without driving it.
    pub async fn connect(&self, client: &Client) -> Result<PortForwardSession> {
        let query = self.query()?;
        let uri = client.kind::<Pod>().operation_uri(
            "connect-portforward",
            &self.name,
            self.namespace.as_deref(),
            &query,
        )?;
        let conn = client.ws_connect(&uri, PORT_FORWARD_SUBPROTOCOL).await?;
        Ok(PortForwardSession::new(conn, self.ports.len()))
    }

    /// Connect and drive the session until it ends.
    pub async fn run<L: PortForwardListener + ?Sized>(
        &self,
        client: &Client,
        listener: &mut L,
    ) -> Result<()> {
        self.connect(client).await?.run(listener).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ports_expand_to_repeated_keys() {
        let query = PortForwardRequest::new("web")
            .ports([8080, 9090])
            .query()
            .unwrap();
        assert_eq!(query.encode(), "ports=8080&ports=9090");
    }

    #[test]
    fn test_no_ports_is_rejected() {
        let err = PortForwardRequest::new("web").query().unwrap_err();
        assert!(matches!(err, KubewireError::Argument(_)));
    }
}
