//! WebSocket sub-protocol layer
//!
//! Kubernetes multiplexes several logical streams over one WebSocket
//! using small byte-framing sub-protocols. Each use case has its own
//! framing:
//!
//! - [`exec`] - stdio channels for exec and attach (`channel.k8s.io`)
//! - [`portforward`] - paired data/error channels per forwarded port
//!   (`v4.channel.k8s.io`)
//! - [`generic`] - no framing at all; raw frames passed through
//!
//! [`connection`] holds the shared connect/TLS/frame plumbing.

pub mod connection;
pub mod exec;
pub mod generic;
pub mod portforward;

pub use connection::{WsConnection, WsWriter};
pub use exec::{ExecListener, ExecSession, ExecWriter, FnExecListener, StdChannel, EXEC_SUBPROTOCOL};
pub use generic::{FnFrameListener, FrameListener, GenericSession};
pub use portforward::{
    ChannelKind, FnPortForwardListener, PortChannel, PortChannels, PortForwardListener,
    PortForwardSession, PORT_FORWARD_SUBPROTOCOL,
};
