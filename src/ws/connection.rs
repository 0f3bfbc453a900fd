//! WebSocket connection plumbing

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async_tls_with_config,
    tungstenite::{
        client::IntoClientRequest,
        http::{header, HeaderValue},
        protocol::Message,
    },
    Connector, MaybeTlsStream, WebSocketStream,
};
use tracing::debug;

use crate::config::ClientConfig;
use crate::errors::{KubewireError, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One WebSocket connection to the API server.
///
/// The sub-protocol sessions own this; callers interact through the
/// session's listener and writer handles.
pub struct WsConnection {
    stream: WsStream,
}

impl WsConnection {
    /// Connect to the API server, advertising `subprotocol`.
    ///
    /// `path_and_query` is the already-built operation URI; the server
    /// URL's scheme is rewritten to ws/wss.
    pub async fn connect(
        config: &ClientConfig,
        path_and_query: &str,
        subprotocol: &str,
    ) -> Result<Self> {
        let url = config.ws_url(path_and_query)?;
        let use_tls = url.scheme() == "wss";

        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| KubewireError::WebSocket(format!("Invalid WebSocket URL: {}", e)))?;

        let headers = request.headers_mut();
        if let Some(token) = config.bearer_token() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                KubewireError::Config("bearer token contains invalid header characters".to_string())
            })?;
            headers.insert(header::AUTHORIZATION, value);
        }
        if let Ok(value) = HeaderValue::from_str(subprotocol) {
            headers.insert("Sec-WebSocket-Protocol", value);
        }

        let connector = if use_tls {
            Some(Connector::Rustls(Arc::new(build_tls_config(config)?)))
        } else {
            None
        };

        let (stream, response) = connect_async_tls_with_config(request, None, false, connector)
            .await
            .map_err(|e| KubewireError::WebSocket(format!("Connection failed: {}", e)))?;

        if let Some(proto) = response.headers().get("Sec-WebSocket-Protocol") {
            debug!(negotiated = ?proto, "websocket subprotocol negotiated");
        }

        Ok(WsConnection { stream })
    }

    /// Send one binary frame
    pub async fn send_frame(&mut self, data: Vec<u8>) -> Result<()> {
        self.stream
            .send(Message::Binary(data))
            .await
            .map_err(|e| KubewireError::WebSocket(format!("Send failed: {}", e)))
    }

    /// Next data frame's raw bytes, or `None` once the peer closed.
    ///
    /// Pings are answered inline; pongs and other control frames are
    /// skipped.
    pub async fn next_frame(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Binary(data))) => return Ok(Some(data)),
                Some(Ok(Message::Text(text))) => return Ok(Some(text.into_bytes())),
                Some(Ok(Message::Ping(data))) => {
                    let _ = self.stream.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Pong(_))) | Some(Ok(Message::Frame(_))) => {}
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Err(e)) => {
                    return Err(KubewireError::WebSocket(format!("Receive error: {}", e)))
                }
            }
        }
    }

    /// Close the connection; already-closed connections are not an error.
    pub async fn close(&mut self) -> Result<()> {
        match self.stream.close(None).await {
            Ok(()) => Ok(()),
            Err(tokio_tungstenite::tungstenite::Error::ConnectionClosed)
            | Err(tokio_tungstenite::tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(KubewireError::WebSocket(format!("Close failed: {}", e))),
        }
    }
}

/// Outbound traffic queued by writer handles for the session loop
#[derive(Debug)]
pub(crate) enum Outbound {
    Frame(Vec<u8>),
    Close,
}

/// Cloneable handle for writing frames from inside a listener callback.
///
/// Writes are queued and flushed by the session's frame loop, so
/// listener callbacks stay synchronous.
#[derive(Clone)]
pub struct WsWriter {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl WsWriter {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Outbound>) -> Self {
        WsWriter { tx }
    }

    /// Queue one raw frame
    pub fn send_frame(&self, data: Vec<u8>) -> Result<()> {
        self.tx
            .send(Outbound::Frame(data))
            .map_err(|_| KubewireError::WebSocket("connection closed".to_string()))
    }

    /// Request the session loop to close the connection
    pub fn close(&self) -> Result<()> {
        self.tx
            .send(Outbound::Close)
            .map_err(|_| KubewireError::WebSocket("connection closed".to_string()))
    }
}

fn build_tls_config(config: &ClientConfig) -> Result<rustls::ClientConfig> {
    if config.insecure_skip_tls_verify() {
        return Ok(rustls::ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoVerifier))
            .with_no_client_auth());
    }

    let mut root_store = rustls::RootCertStore::empty();
    if let Some(pem) = config.ca_certificate_pem() {
        let mut reader = std::io::BufReader::new(pem);
        for der in rustls_pemfile::certs(&mut reader) {
            let der = der.map_err(|e| KubewireError::Ssl(format!("invalid CA bundle: {}", e)))?;
            root_store
                .add(der)
                .map_err(|e| KubewireError::Ssl(format!("invalid CA certificate: {}", e)))?;
        }
    } else {
        let cert_result = rustls_native_certs::load_native_certs();
        for cert in cert_result.certs {
            root_store.add(cert).ok();
        }
        if root_store.is_empty() {
            root_store =
                rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        }
    }

    Ok(rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth())
}

/// Certificate verifier that accepts all certificates (insecure)
#[derive(Debug)]
struct NoVerifier;

impl rustls::client::danger::ServerCertVerifier for NoVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> std::result::Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        vec![
            rustls::SignatureScheme::RSA_PKCS1_SHA256,
            rustls::SignatureScheme::RSA_PKCS1_SHA384,
            rustls::SignatureScheme::RSA_PKCS1_SHA512,
            rustls::SignatureScheme::ECDSA_NISTP256_SHA256,
            rustls::SignatureScheme::ECDSA_NISTP384_SHA384,
            rustls::SignatureScheme::ECDSA_NISTP521_SHA512,
            rustls::SignatureScheme::RSA_PSS_SHA256,
            rustls::SignatureScheme::RSA_PSS_SHA384,
            rustls::SignatureScheme::RSA_PSS_SHA512,
            rustls::SignatureScheme::ED25519,
        ]
    }
}
