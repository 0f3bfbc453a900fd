//! kubewire - a metadata-driven Kubernetes API client.
//!
//! Every API call is resolved through a static schema registry: each
//! resource type declares its Kind, properties, and the operations it
//! supports (path template, HTTP verb, body and response models), and
//! the dispatcher turns a typed call into a request from that metadata
//! alone. On top of the plain request/response path sit the streaming
//! surfaces: NDJSON watch streams, followed logs, and the WebSocket
//! sub-protocols used by exec, attach, and port forwarding.
//!
//! ```no_run
//! use kubewire::{Client, ClientConfig, Query, Resource};
//! use kubewire::models::Pod;
//!
//! # async fn example() -> kubewire::Result<()> {
//! let config = ClientConfig::builder("https://api.cluster:6443")
//!     .bearer_token("...")
//!     .build()?;
//! let client = Client::new(config)?;
//!
//! let pods = client.kind::<Pod>().list(Query::new()).await?;
//! for pod in pods.items {
//!     println!("{}", pod.name().unwrap_or("<unnamed>"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod meta;
pub mod models;
pub mod patch;
pub mod resource;
pub mod services;
pub mod transport;
pub mod uri;
pub mod ws;

pub use client::Client;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use dispatch::KindClient;
pub use errors::{KubewireError, Result};
pub use patch::{JsonPatch, MergePatch};
pub use resource::Resource;
pub use transport::{ApiOutput, Flow};
pub use uri::Query;
