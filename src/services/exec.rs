//! Exec and attach request builders

use crate::client::Client;
use crate::errors::{KubewireError, Result};
use crate::models::Pod;
use crate::uri::Query;
use crate::ws::{ExecListener, ExecSession, EXEC_SUBPROTOCOL};

/// Stdio wiring shared by exec and attach.
///
/// Defaults mirror `kubectl`: stdout and stderr on, stdin and tty off.
#[derive(Debug, Clone)]
struct StdioFlags {
    stdin: bool,
    stdout: bool,
    stderr: bool,
    tty: bool,
}

impl Default for StdioFlags {
    fn default() -> Self {
        StdioFlags {
            stdin: false,
            stdout: true,
            stderr: true,
            tty: false,
        }
    }
}

impl StdioFlags {
    fn apply(&self, query: &mut Query) {
        query.push("stdin", self.stdin);
        query.push("stdout", self.stdout);
        query.push("stderr", self.stderr);
        query.push("tty", self.tty);
    }
}

/// Run a command in a container over a multiplexed WebSocket.
///
/// ```no_run
/// # use kubewire::{Client, Flow};
/// # use kubewire::services::ExecRequest;
/// # use kubewire::ws::{FnExecListener, StdChannel};
/// # async fn example(client: Client) -> kubewire::Result<()> {
/// let mut listener = FnExecListener::new(|channel, data| {
///     if channel == StdChannel::Stdout {
///         print!("{}", String::from_utf8_lossy(data));
///     }
///     Flow::Continue
/// });
/// ExecRequest::new("web")
///     .command(["ls", "-l", "/tmp"])
///     .run(&client, &mut listener)
///     .await
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ExecRequest {
    name: String,
    namespace: Option<String>,
    container: Option<String>,
    command: Vec<String>,
    stdio: StdioFlags,
}

impl ExecRequest {
    pub fn new(pod_name: impl Into<String>) -> Self {
        ExecRequest {
            name: pod_name.into(),
            namespace: None,
            container: None,
            command: Vec::new(),
            stdio: StdioFlags::default(),
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Target container; required only for multi-container pods.
    pub fn container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    /// The command and its arguments, sent as repeated `command` keys.
    pub fn command<I, S>(mut self, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command = command.into_iter().map(Into::into).collect();
        self
    }

    pub fn stdin(mut self, enabled: bool) -> Self {
        self.stdio.stdin = enabled;
        self
    }

    pub fn stdout(mut self, enabled: bool) -> Self {
        self.stdio.stdout = enabled;
        self
    }

    pub fn stderr(mut self, enabled: bool) -> Self {
        self.stdio.stderr = enabled;
        self
    }

    pub fn tty(mut self, enabled: bool) -> Self {
        self.stdio.tty = enabled;
        self
    }

    fn query(&self) -> Result<Query> {
        if self.command.is_empty() {
            return Err(KubewireError::Argument(
                "exec requires a command".to_string(),
            ));
        }
        let mut query = Query::new();
        if let Some(container) = &self.container {
            query.push("container", container);
        }
        query.push_many("command", &self.command);
        self.stdio.apply(&mut query);
        Ok(query)
    }

    /// Open the connection without driving it, for callers that need
    /// the writer handle before frames start flowing.
    pub async fn connect(&self, client: &Client) -> Result<ExecSession> {
        let query = self.query()?;
        let uri = client.kind::<Pod>().operation_uri(
            "connect-exec",
            &self.name,
            self.namespace.as_deref(),
            &query,
        )?;
        let conn = client.ws_connect(&uri, EXEC_SUBPROTOCOL).await?;
        Ok(ExecSession::new(conn))
    }

    /// Connect and drive the session until it ends.
    pub async fn run<L: ExecListener + ?Sized>(
        &self,
        client: &Client,
        listener: &mut L,
    ) -> Result<()> {
        self.connect(client).await?.run(listener).await
    }
}

/// Attach to the running process of a container.
///
/// Same wire protocol as [`ExecRequest`], but no command is sent; the
/// connection joins the container's existing stdio.
#[derive(Debug, Clone)]
pub struct AttachRequest {
    name: String,
    namespace: Option<String>,
    container: Option<String>,
    stdio: StdioFlags,
}

impl AttachRequest {
    pub fn new(pod_name: impl Into<String>) -> Self {
        AttachRequest {
            name: pod_name.into(),
            namespace: None,
            container: None,
            stdio: StdioFlags::default(),
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

    pub fn stdin(mut self, enabled: bool) -> Self {
        self.stdio.stdin = enabled;
        self
    }

    pub fn stdout(mut self, enabled: bool) -> Self {
        self.stdio.stdout = enabled;
        self
    }

    pub fn stderr(mut self, enabled: bool) -> Self {
        self.stdio.stderr = enabled;
        self
    }

    pub fn tty(mut self, enabled: bool) -> Self {
        self.stdio.tty = enabled;
        self
    }

    fn query(&self) -> Query {
        let mut query = Query::new();
        if let Some(container) = &self.container {
            query.push("container", container);
        }
        self.stdio.apply(&mut query);
        query
    }

    pub async fn connect(&self, client: &Client) -> Result<ExecSession> {
        let query = self.query();
        let uri = client.kind::<Pod>().operation_uri(
            "connect-attach",
            &self.name,
            self.namespace.as_deref(),
            &query,
        )?;
        let conn = client.ws_connect(&uri, EXEC_SUBPROTOCOL).await?;
        Ok(ExecSession::new(conn))
    }

    pub async fn run<L: ExecListener + ?Sized>(
        &self,
        client: &Client,
        listener: &mut L,
    ) -> Result<()> {
        self.connect(client).await?.run(listener).await
    }
}
