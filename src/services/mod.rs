//! Pod sub-resource services
//!
//! Request builders for the operations that go beyond plain
//! request/response: exec, attach, log retrieval and following, and
//! port forwarding. Builders are immutable; every method consumes and
//! returns the builder, and the built request can be reused.

mod exec;
mod logs;
mod portforward;

pub use exec::{AttachRequest, ExecRequest};
pub use logs::LogRequest;
pub use portforward::PortForwardRequest;
