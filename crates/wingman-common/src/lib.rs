// wingman-common — wire codec, reliable UDP channel, and the plumbing both
// the server and client network layers are built on.
//
// Mirrors the split the original workspace uses for its own `myq2-common`
// crate: protocol-level concerns shared by both sides of the connection
// live here, independent of server or client policy.

pub mod addr;
pub mod channel;
pub mod compression;
pub mod config;
pub mod error;
pub mod queue;
pub mod wire;

pub use error::{ConfigError, ProtocolError, ResourceError, SessionError, TransportError};
