//! Outbound dial capability
//!
//! The proxy never opens outbound sockets on its own; every dial goes
//! through a [`Dialer`] injected at construction. Production code installs
//! [`NetDialer`]; tests and embedders substitute their own to observe,
//! filter, or reroute dials.

use async_trait::async_trait;
use std::fmt::Debug;
use std::io;
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

/// Stream handed back by a successful dial.
///
/// Besides async I/O it exposes the local address of the outbound socket,
/// which the success reply reports to the client as the bound address.
pub trait DialedStream: AsyncRead + AsyncWrite + Unpin + Send + Debug {
    /// Local address the outbound socket is bound to
    fn local_addr(&self) -> io::Result<SocketAddr>;
}

impl DialedStream for TcpStream {
    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpStream::local_addr(self)
    }
}

/// Capability to open outbound connections.
///
/// Mirrors the shape of a TCP connect: a network name (only `"tcp"` is
/// passed today) and a `host:port` address string, with domain names left
/// unresolved so the implementation controls resolution. Implementations
/// own the policy; the connection handling never touches the network
/// directly.
#[async_trait]
pub trait Dialer: Send + Sync + Debug {
    /// Open a connection to `addr` on the given network.
    async fn dial(&self, network: &str, addr: &str) -> io::Result<Box<dyn DialedStream>>;
}

/// [`Dialer`] that opens plain TCP connections on the host network.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetDialer;

#[async_trait]
impl Dialer for NetDialer {
    async fn dial(&self, network: &str, addr: &str) -> io::Result<Box<dyn DialedStream>> {
        if network != "tcp" {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("unsupported network: {}", network),
            ));
        }
        let stream = TcpStream::connect(addr).await?;
        Ok(Box::new(stream))
    }
}
