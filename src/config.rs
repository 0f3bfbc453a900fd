//! Client configuration
//!
//! All wiring is explicit: the embedding application constructs a
//! [`ClientConfig`] and hands it to [`Client::new`](crate::Client::new).
//! Nothing is discovered from the environment and no kubeconfig file is
//! parsed here.

use std::time::Duration;

use url::Url;

use crate::errors::{KubewireError, Result};

/// Immutable connection configuration for one API server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    server: Url,
    bearer_token: Option<String>,
    ca_certificate_pem: Option<Vec<u8>>,
    insecure_skip_tls_verify: bool,
    default_namespace: String,
    timeout: Option<Duration>,
}

impl ClientConfig {
    /// Start building a configuration for the given API server URL
    pub fn builder(server: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder {
            server: server.into(),
            bearer_token: None,
            ca_certificate_pem: None,
            insecure_skip_tls_verify: false,
            default_namespace: "default".to_string(),
            timeout: None,
        }
    }

    pub fn server(&self) -> &Url {
        &self.server
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }

    pub fn ca_certificate_pem(&self) -> Option<&[u8]> {
        self.ca_certificate_pem.as_deref()
    }

    pub fn insecure_skip_tls_verify(&self) -> bool {
        self.insecure_skip_tls_verify
    }

    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The server URL rewritten for a WebSocket upgrade, with
    /// `path_and_query` appended.
    pub fn ws_url(&self, path_and_query: &str) -> Result<Url> {
        let mut url = self.server.join(path_and_query)?;
        let scheme = match url.scheme() {
            "https" | "wss" => "wss",
            "http" | "ws" => "ws",
            other => {
                return Err(KubewireError::Config(format!(
                    "cannot upgrade scheme '{}' to WebSocket",
                    other
                )))
            }
        };
        url.set_scheme(scheme)
            .map_err(|_| KubewireError::Config("invalid WebSocket URL".to_string()))?;
        Ok(url)
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    server: String,
    bearer_token: Option<String>,
    ca_certificate_pem: Option<Vec<u8>>,
    insecure_skip_tls_verify: bool,
    default_namespace: String,
    timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// PEM-encoded CA bundle to trust instead of the system roots
    pub fn ca_certificate_pem(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.ca_certificate_pem = Some(pem.into());
        self
    }

    /// Disable server certificate verification (test clusters only)
    pub fn insecure_skip_tls_verify(mut self, skip: bool) -> Self {
        self.insecure_skip_tls_verify = skip;
        self
    }

    pub fn default_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.default_namespace = namespace.into();
        self
    }

    /// Request timeout applied to plain (non-streaming) requests
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<ClientConfig> {
        let server = Url::parse(&self.server)
            .map_err(|e| KubewireError::Config(format!("invalid server URL: {}", e)))?;
        if !matches!(server.scheme(), "http" | "https") {
            return Err(KubewireError::Config(format!(
                "server URL must be http or https, got '{}'",
                server.scheme()
            )));
        }
        if self.default_namespace.is_empty() {
            return Err(KubewireError::Config(
                "default namespace cannot be empty".to_string(),
            ));
        }
        Ok(ClientConfig {
            server,
            bearer_token: self.bearer_token,
            ca_certificate_pem: self.ca_certificate_pem,
            insecure_skip_tls_verify: self.insecure_skip_tls_verify,
            default_namespace: self.default_namespace,
            timeout: self.timeout,
        })
    }
}
