//! SOCKS5 listener
//!
//! Binds the configured address, accepts TCP clients, and spawns a
//! [`Connection`] per socket. The accept loop itself never touches the
//! protocol.

use crate::config::ServerConfig;
use crate::dialer::{Dialer, NetDialer};
use crate::socks::Connection;
use anyhow::{Context, Result};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// SOCKS5 proxy server
pub struct Server {
    listener: TcpListener,
    dialer: Arc<dyn Dialer>,
    dial_timeout: Duration,
}

impl Server {
    /// Bind the configured listen address, dialing destinations on the host
    /// network. The returned server owns the socket but accepts nothing
    /// until [`run`](Server::run).
    pub async fn bind(config: &ServerConfig) -> Result<Self> {
        Self::bind_with_dialer(config, Arc::new(NetDialer)).await
    }

    /// Bind with a custom dial capability.
    pub async fn bind_with_dialer(
        config: &ServerConfig,
        dialer: Arc<dyn Dialer>,
    ) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)
            .await
            .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
        Ok(Self {
            listener,
            dialer,
            dial_timeout: Duration::from_secs(config.dial_timeout),
        })
    }

    /// Local address of the bound listener. Useful when the configuration
    /// asked for port 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until the shutdown signal fires.
    ///
    /// Each accepted socket gets its own task; one misbehaving client never
    /// takes the listener down. Accept errors are logged and the loop keeps
    /// going.
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
        info!("SOCKS5 server listening on {}", self.listener.local_addr()?);

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(pair) => pair,
                        Err(e) => {
                            warn!("Failed to accept connection: {}", e);
                            continue;
                        }
                    };
                    debug!("accepted client {}", peer);

                    let dialer = Arc::clone(&self.dialer);
                    let dial_timeout = self.dial_timeout;
                    tokio::spawn(async move {
                        let conn = Connection::new(stream, dialer)
                            .with_dial_timeout(dial_timeout);
                        if let Err(e) = conn.run().await {
                            warn!("client connection failed: {}", e);
                        }
                    });
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }

        Ok(())
    }
}
