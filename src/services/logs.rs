//! Container log retrieval

use crate::client::Client;
use crate::dispatch::KindClient;
use crate::errors::{KubewireError, Result};
use crate::models::Pod;
use crate::transport::{ApiOutput, Flow, SendOptions};
use crate::uri::Query;

/// Fetch or follow a container's log.
#[derive(Debug, Clone, Default)]
pub struct LogRequest {
    name: String,
    namespace: Option<String>,
    container: Option<String>,
    tail_lines: Option<u64>,
    since_seconds: Option<u64>,
    timestamps: bool,
    previous: bool,
}

impl LogRequest {
    pub fn new(pod_name: impl Into<String>) -> Self {
        LogRequest {
            name: pod_name.into(),
            ..Default::default()
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    /// Only the most recent `lines` lines
    pub fn tail_lines(mut self, lines: u64) -> Self {
        self.tail_lines = Some(lines);
        self
    }

    /// Only entries newer than `seconds` ago
    pub fn since_seconds(mut self, seconds: u64) -> Self {
        self.since_seconds = Some(seconds);
        self
    }

    /// Prefix each line with its RFC 3339 timestamp
    pub fn timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    /// Log of the previous container instance, after a restart
    pub fn previous(mut self, enabled: bool) -> Self {
        self.previous = enabled;
        self
    }

    fn query(&self) -> Query {
        let mut query = Query::new();
        if let Some(container) = &self.container {
            query.push("container", container);
        }
        if let Some(lines) = self.tail_lines {
            query.push("tailLines", lines);
        }
        if let Some(seconds) = self.since_seconds {
            query.push("sinceSeconds", seconds);
        }
        if self.timestamps {
            query.push("timestamps", true);
        }
        if self.previous {
            query.push("previous", true);
        }
        query
    }

    fn scoped(&self, client: &Client) -> KindClient<Pod> {
        let kind = client.kind::<Pod>();
        match &self.namespace {
            Some(namespace) => kind.within(namespace),
            None => kind,
        }
    }

    /// The whole log as one string.
    pub async fn read(&self, client: &Client) -> Result<String> {
        let options = SendOptions {
            query: self.query(),
            ..Default::default()
        };
        let output = self
            .scoped(client)
            .dispatch("get-log", Some(&self.name), None, options)
            .await?;
        match output {
            ApiOutput::Raw(body) => Ok(body),
            ApiOutput::Model(value) => Ok(value.to_string()),
            ApiOutput::StreamClosed => Err(KubewireError::Protocol(
                "log request produced a stream".to_string(),
            )),
        }
    }

    /// Stream the log, delivering each body chunk to `handler` as it
    /// arrives. Blocks until the stream ends or the handler returns
    /// [`Flow::Stop`].
    pub async fn follow<F>(&self, client: &Client, handler: F) -> Result<()>
    where
        F: FnMut(&[u8]) -> Flow + Send + 'static,
    {
        let mut query = self.query();
        query.push("follow", true);
        let options = SendOptions {
            query,
            follow_handler: Some(Box::new(handler)),
            ..Default::default()
        };
        self.scoped(client)
            .dispatch("get-log", Some(&self.name), None, options)
            .await?;
        Ok(())
    }
}
