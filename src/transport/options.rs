//! Request options and streaming handler types

use serde_json::Value as JsonValue;

use crate::models::WatchEvent;
use crate::uri::Query;

/// What a streaming handler wants done after one delivery.
///
/// Only an explicit [`Flow::Stop`] ends consumption; every other
/// outcome continues until end-of-stream. A distinct enum rather than a
/// boolean, so no "falsy" value can be mistaken for a stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Invoked once per decoded watch event
pub type WatchHandler = Box<dyn FnMut(WatchEvent) -> Flow + Send>;

/// Invoked once per body chunk of a followed log stream
pub type FollowHandler = Box<dyn FnMut(&[u8]) -> Flow + Send>;

/// Options assembled by the dispatcher for one transport call
#[derive(Default)]
pub struct SendOptions {
    /// Serialized request body, when the operation declares one
    pub body: Option<JsonValue>,
    /// Content type override (patches); plain JSON otherwise
    pub content_type: Option<&'static str>,
    /// Whether a JSON response model is expected back
    pub expect_model: bool,
    pub query: Query,
    pub watch_handler: Option<WatchHandler>,
    pub follow_handler: Option<FollowHandler>,
}

impl std::fmt::Debug for SendOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendOptions")
            .field("body", &self.body.is_some())
            .field("content_type", &self.content_type)
            .field("expect_model", &self.expect_model)
            .field("query", &self.query)
            .field("watch_handler", &self.watch_handler.is_some())
            .field("follow_handler", &self.follow_handler.is_some())
            .finish()
    }
}

/// What a completed transport call produced
#[derive(Debug)]
pub enum ApiOutput {
    /// Deserialized JSON response body
    Model(JsonValue),
    /// Raw body for proxy-style and log passthrough responses
    Raw(String),
    /// A watch/follow stream that was consumed to its end (or stopped
    /// by the handler); the underlying body is closed
    StreamClosed,
}

impl ApiOutput {
    pub fn into_model(self) -> Option<JsonValue> {
        match self {
            ApiOutput::Model(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_raw(self) -> Option<String> {
        match self {
            ApiOutput::Raw(body) => Some(body),
            _ => None,
        }
    }
}
