//! HTTP response handler chain
//!
//! An ordered chain: Error, Follow, Watch, Success. The transport asks
//! each handler in turn whether it supports the response; the first
//! match processes it. A response no handler claims is a protocol error
//! naming the request path.

pub mod error;
pub mod follow;
pub mod success;
pub mod watch;

use reqwest::header::CONTENT_TYPE;
use reqwest::Response;
use tracing::debug;

use crate::errors::{KubewireError, Result};

use super::options::{ApiOutput, SendOptions};

/// Dispatch a response to the first handler that supports it.
pub async fn handle_response(
    response: Response,
    mut options: SendOptions,
    path: &str,
) -> Result<ApiOutput> {
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let content_type = content_type.as_deref();

    if error::supports(status) {
        debug!(%status, path, "response dispatched to error handler");
        return error::handle(response).await;
    }
    if follow::supports(status, content_type, &options) {
        if let Some(handler) = options.follow_handler.take() {
            debug!(path, "response dispatched to follow handler");
            return follow::handle(response, handler).await;
        }
    }
    if watch::supports(status, content_type, &options) {
        if let Some(handler) = options.watch_handler.take() {
            debug!(path, "response dispatched to watch handler");
            return watch::handle(response, handler).await;
        }
    }
    if success::supports(status) {
        return success::handle(response, content_type.map(str::to_string), &options).await;
    }

    Err(KubewireError::Protocol(format!(
        "no response handler matched for '{}' (HTTP {})",
        path, status
    )))
}

/// True when the content type's essence matches `expected`
fn content_type_is(content_type: Option<&str>, expected: &str) -> bool {
    content_type
        .and_then(|v| v.parse::<mime::Mime>().ok())
        .map(|m| m.essence_str() == expected)
        .unwrap_or(false)
}
