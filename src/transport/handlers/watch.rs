//! Watch stream handling
//!
//! A watch response body is an open-ended stream of discrete JSON
//! documents, one per event, separated by newlines. The body is decoded
//! incrementally; a single-parse of the whole body would never return.

use futures::StreamExt;
use reqwest::{Response, StatusCode};
use tracing::debug;

use crate::errors::{KubewireError, Result};
use crate::models::WatchEvent;
use crate::transport::options::{ApiOutput, Flow, SendOptions, WatchHandler};

use super::content_type_is;

/// Claimed only when the caller opted into `watch=true`, supplied a
/// handler, and the server answered 2xx with a JSON stream.
pub fn supports(status: StatusCode, content_type: Option<&str>, options: &SendOptions) -> bool {
    status.is_success()
        && options.query.get("watch") == Some("true")
        && options.watch_handler.is_some()
        && content_type_is(content_type, "application/json")
}

/// Decode newline-delimited events and hand each to the handler.
///
/// `Flow::Stop` ends consumption without reading further events; the
/// stream is closed on every exit path, including decode errors.
pub async fn handle(response: Response, mut handler: WatchHandler) -> Result<ApiOutput> {
    let mut stream = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        buffer.extend_from_slice(&chunk);

        while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = buffer.drain(..=pos).collect();
            match deliver(&line, &mut handler)? {
                Flow::Continue => {}
                Flow::Stop => {
                    debug!("watch handler requested stop");
                    drop(stream);
                    return Ok(ApiOutput::StreamClosed);
                }
            }
        }
    }

    // A final event without a trailing newline arrives here at EOF.
    if !buffer.is_empty() {
        deliver(&buffer, &mut handler)?;
    }
    Ok(ApiOutput::StreamClosed)
}

fn deliver(line: &[u8], handler: &mut WatchHandler) -> Result<Flow> {
    let text = std::str::from_utf8(line)
        .map_err(|e| KubewireError::Protocol(format!("watch stream is not valid UTF-8: {}", e)))?
        .trim();
    if text.is_empty() {
        return Ok(Flow::Continue);
    }
    let event: WatchEvent = serde_json::from_str(text)?;
    Ok(handler(event))
}
