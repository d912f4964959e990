//! SOCKS5 protocol engine
//!
//! Everything protocol-shaped lives here: wire constants, the typed packet
//! codec, auth method negotiation, the per-connection state machine, and the
//! byte relay that takes over once a CONNECT succeeds. The listener in
//! [`crate::server`] only accepts sockets and hands them to [`Connection`].

pub mod conn;
pub mod consts;
pub mod handshake;
pub mod packet;
pub mod relay;
pub mod types;

pub use conn::{Connection, DEFAULT_DIAL_TIMEOUT};
pub use packet::{Initiation, Reply, Request};
pub use relay::relay;
pub use types::{Command, TargetAddr};
