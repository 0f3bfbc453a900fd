//! Canonical wire verbs

use reqwest::Method;

use crate::errors::{KubewireError, Result};
use crate::meta::kubernetes_action;

/// The canonical verb vocabulary used at the transport boundary.
///
/// Each verb maps 1:1 to a standard HTTP method. `Connect` maps to GET:
/// it is the pre-upgrade request issued before a WebSocket handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Post,
    Get,
    Patch,
    Put,
    Connect,
    Delete,
    DeleteCollection,
    List,
    Watch,
    WatchList,
}

impl Verb {
    /// Resolve the wire verb for a public action key.
    ///
    /// The key is canonicalized first (collection spellings collapse to
    /// their base verb) and status/log sub-resource actions share the
    /// verb of their base action.
    pub fn from_action(action: &str) -> Result<Verb> {
        match kubernetes_action(action) {
            "post" => Ok(Verb::Post),
            "get" | "get-status" | "get-log" => Ok(Verb::Get),
            "put" | "put-status" => Ok(Verb::Put),
            "patch" | "patch-status" => Ok(Verb::Patch),
            "delete" => Ok(Verb::Delete),
            "deletecollection" => Ok(Verb::DeleteCollection),
            "list" => Ok(Verb::List),
            "watch" => Ok(Verb::Watch),
            "watchlist" => Ok(Verb::WatchList),
            "connect" | "proxy" | "connect-exec" | "connect-attach" | "connect-portforward" => {
                Ok(Verb::Connect)
            }
            other => Err(KubewireError::Argument(format!(
                "no wire verb for action '{}'",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Post => "post",
            Verb::Get => "get",
            Verb::Patch => "patch",
            Verb::Put => "put",
            Verb::Connect => "connect",
            Verb::Delete => "delete",
            Verb::DeleteCollection => "deletecollection",
            Verb::List => "list",
            Verb::Watch => "watch",
            Verb::WatchList => "watchlist",
        }
    }

    pub fn http_method(&self) -> Method {
        match self {
            Verb::Post => Method::POST,
            Verb::Patch => Method::PATCH,
            Verb::Put => Method::PUT,
            Verb::Delete | Verb::DeleteCollection => Method::DELETE,
            Verb::Get | Verb::Connect | Verb::List | Verb::Watch | Verb::WatchList => Method::GET,
        }
    }
}
