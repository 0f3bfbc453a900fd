//! HTTP transport
//!
//! One shared reqwest client configured from [`ClientConfig`]. The
//! transport's whole contract is `send(uri, verb, options)`; what
//! happens to the response is decided by the [`handlers`] chain.

pub mod handlers;
pub mod options;
pub mod verb;

pub use options::{ApiOutput, Flow, FollowHandler, SendOptions, WatchHandler};
pub use verb::Verb;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Certificate;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::errors::{KubewireError, Result};

pub const USER_AGENT_STRING: &str = concat!("kubewire/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP transport for one API server.
pub struct HttpTransport {
    client: reqwest::Client,
    base: Url,
    timeout: Option<std::time::Duration>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = config.bearer_token() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| KubewireError::Config("bearer token contains invalid header characters".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(USER_AGENT_STRING)
            .default_headers(headers);

        if let Some(pem) = config.ca_certificate_pem() {
            for cert in parse_ca_bundle(pem)? {
                builder = builder.add_root_certificate(cert);
            }
        }
        if config.insecure_skip_tls_verify() {
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(HttpTransport {
            client: builder.build()?,
            base: config.server().clone(),
            timeout: config.timeout(),
        })
    }

    /// Send one request and run the response through the handler chain.
    ///
    /// `uri` is the already-built path (with query string) relative to
    /// the configured server.
    pub async fn send(&self, uri: &str, verb: Verb, options: SendOptions) -> Result<ApiOutput> {
        let url = self.base.join(uri)?;
        debug!(%url, verb = verb.as_str(), "sending request");

        let mut request = self.client.request(verb.http_method(), url);

        // The configured timeout covers plain request/response calls;
        // watch and follow streams are open-ended and must not be
        // bounded by it.
        let streaming = options.watch_handler.is_some() || options.follow_handler.is_some();
        if let Some(timeout) = self.timeout {
            if !streaming {
                request = request.timeout(timeout);
            }
        }

        if let Some(body) = &options.body {
            let content_type = options.content_type.unwrap_or("application/json");
            request = request
                .header(CONTENT_TYPE, content_type)
                .body(serde_json::to_vec(body)?);
        }

        let response = request.send().await?;
        handlers::handle_response(response, options, uri).await
    }
}

fn parse_ca_bundle(pem: &[u8]) -> Result<Vec<Certificate>> {
    let mut reader = std::io::BufReader::new(pem);
    let mut certs = Vec::new();
    for der in rustls_pemfile::certs(&mut reader) {
        let der = der.map_err(|e| KubewireError::Ssl(format!("invalid CA bundle: {}", e)))?;
        certs.push(
            Certificate::from_der(&der)
                .map_err(|e| KubewireError::Ssl(format!("invalid CA certificate: {}", e)))?,
        );
    }
    if certs.is_empty() {
        return Err(KubewireError::Ssl(
            "CA bundle contains no certificates".to_string(),
        ));
    }
    Ok(certs)
}
