//! Followed log stream handling

use futures::StreamExt;
use reqwest::{Response, StatusCode};
use tracing::debug;

use crate::errors::Result;
use crate::transport::options::{ApiOutput, Flow, FollowHandler, SendOptions};

use super::content_type_is;

/// Claimed only when the caller opted into `follow`, supplied a
/// handler, and the server answered 2xx with a plain-text stream.
pub fn supports(status: StatusCode, content_type: Option<&str>, options: &SendOptions) -> bool {
    status.is_success()
        && options.query.get("follow") == Some("true")
        && options.follow_handler.is_some()
        && content_type_is(content_type, "text/plain")
}

/// Read the body chunk by chunk, invoking the handler once per chunk.
///
/// `Flow::Stop` ends consumption early; either way the stream is closed
/// before returning.
pub async fn handle(response: Response, mut handler: FollowHandler) -> Result<ApiOutput> {
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if handler(&chunk) == Flow::Stop {
            debug!("follow handler requested stop");
            break;
        }
    }
    drop(stream);
    Ok(ApiOutput::StreamClosed)
}
