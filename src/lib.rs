//! # Sockgate - Minimal SOCKS5 Proxy Server
//!
//! Sockgate is an auth-less SOCKS5 proxy endpoint implementing the RFC 1928
//! subset that matters for plumbing traffic out of a host: CONNECT. Clients
//! negotiate the no-authentication method, name a destination by IPv4,
//! IPv6, or domain, and get a bidirectional byte relay to it.
//!
//! ## Features
//!
//! - **CONNECT only**: BIND and UDP ASSOCIATE are refused with the
//!   dedicated reply code instead of a general failure
//! - **Injected dialing**: every outbound connect goes through a [`Dialer`]
//!   capability, so embedders can route into userspace network stacks or
//!   apply their own policy
//! - **Bounded handshakes**: each client packet is consumed with a single
//!   bounded read; no attacker-controlled length drives allocation
//! - **Dial deadline**: destinations that do not answer within the timeout
//!   fail with a clean reply instead of hanging the client
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sockgate::config::Config;
//! use sockgate::server::Server;
//! use tokio::sync::broadcast;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let server = Server::bind(&config.server).await?;
//!     let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
//!
//!     server.run(shutdown_rx).await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! SOCKS5 Client -> Sockgate -> Dialer -> Target
//! ```
//!
//! The listener in [`server`] only accepts sockets; each one is handed to a
//! [`Connection`](socks::Connection) that walks the protocol phases and, on
//! a successful CONNECT, ends in a relay.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod dialer;
pub mod error;
pub mod server;
pub mod socks;

// Re-export commonly used items
pub use config::{load_config, Config};
pub use dialer::{DialedStream, Dialer, NetDialer};
pub use error::{ReplyCode, Socks5Error};
pub use server::Server;

/// Version of the sockgate library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the application
pub const NAME: &str = env!("CARGO_PKG_NAME");
