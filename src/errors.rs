//! Error types for kubewire

use thiserror::Error;

use crate::models::Status;

/// Main error type for kubewire
#[derive(Error, Debug)]
pub enum KubewireError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Unresolved URI template parameter: {0}")]
    UnresolvedParameter(String),

    #[error("Unknown operation '{operation}' for {resource}")]
    UnknownOperation { operation: String, resource: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("HTTP {status}: {reason}")]
    Transport { status: u16, reason: String },

    #[error("API error ({}): {}", .0.code.unwrap_or(0), .0.message.as_deref().unwrap_or("unknown"))]
    Api(Status),

    #[error("SSL error: {0}")]
    Ssl(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),
}

impl KubewireError {
    /// Status code of the failed request, when one was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            KubewireError::Transport { status, .. } => Some(*status),
            KubewireError::Api(status) => status.code.map(|c| c as u16),
            KubewireError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The full server-provided Status payload, for API errors.
    pub fn api_status(&self) -> Option<&Status> {
        match self {
            KubewireError::Api(status) => Some(status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, KubewireError>;
