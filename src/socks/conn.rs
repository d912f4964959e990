//! Per-connection SOCKS5 orchestration
//!
//! [`Connection`] owns one accepted client stream and drives it through the
//! protocol as an explicit state machine: negotiate an auth method, decode
//! the request, dial the destination through the injected [`Dialer`], then
//! hand both streams to the relay. Each client packet is consumed with a
//! single bounded read and parsed from the buffer.
//!
//! Only the dial carries a deadline. The handshake reads wait as long as the
//! transport does; callers that want to bound a whole session can wrap
//! [`Connection::run`] in `tokio::time::timeout`.

use super::consts::*;
use super::handshake;
use super::packet::{Initiation, Reply, Request};
use super::relay::relay;
use super::types::{Command, TargetAddr};
use crate::dialer::{DialedStream, Dialer};
use crate::error::Socks5Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// Time allowed for the outbound dial before the client gets a failure reply.
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(5);

/// Where a connection currently stands in the protocol.
///
/// `run` advances through these in order; there is no way back. Failure and
/// orderly close are not states, they are the `Err`/`Ok` ways out of the
/// loop.
enum Phase {
    /// Waiting for the version/method-selection packet
    AwaitingInit,
    /// Method accepted, waiting for the connection request
    AwaitingRequest,
    /// Request validated, dialing its destination
    Dialing(Request),
    /// Destination connected and success reply sent; pumping bytes
    Relaying(Box<dyn DialedStream>),
}

/// One accepted client connection.
///
/// Generic over the client stream so it runs equally over a plain
/// [`TcpStream`](tokio::net::TcpStream) or an in-memory duplex in tests.
pub struct Connection<C> {
    client: C,
    dialer: Arc<dyn Dialer>,
    dial_timeout: Duration,
}

impl<C> Connection<C>
where
    C: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an accepted client stream. All outbound connects go through
    /// `dialer`; the dial deadline defaults to [`DEFAULT_DIAL_TIMEOUT`].
    pub fn new(client: C, dialer: Arc<dyn Dialer>) -> Self {
        Self {
            client,
            dialer,
            dial_timeout: DEFAULT_DIAL_TIMEOUT,
        }
    }

    /// Replace the dial deadline.
    pub fn with_dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout = timeout;
        self
    }

    /// Drive the connection from handshake to relay teardown.
    ///
    /// Returns `Ok(())` only when a relay was established and ended in an
    /// orderly way. Every abort returns `Err` after the client has been
    /// given whatever answer the protocol owes it: the no-acceptable-methods
    /// byte during the handshake, a failure reply after the request. Reply
    /// writes on the failure paths are best effort; the original error wins.
    pub async fn run(mut self) -> Result<(), Socks5Error> {
        let mut phase = Phase::AwaitingInit;

        let dest = loop {
            phase = match phase {
                Phase::AwaitingInit => {
                    let mut buf = [0u8; MAX_INIT_PACKET_SIZE];
                    let n = self.client.read(&mut buf).await?;
                    let selected = Initiation::decode(&buf[..n])
                        .and_then(|init| handshake::negotiate(&init));
                    match selected {
                        Ok(method) => {
                            self.client
                                .write_all(&handshake::selection_message(method))
                                .await?;
                            Phase::AwaitingRequest
                        }
                        Err(err) => {
                            let msg =
                                handshake::selection_message(AUTH_METHOD_NOT_ACCEPTABLE);
                            let _ = self.client.write_all(&msg).await;
                            return Err(err);
                        }
                    }
                }
                Phase::AwaitingRequest => {
                    let mut buf = [0u8; MAX_REQUEST_PACKET_SIZE];
                    let n = self.client.read(&mut buf).await?;
                    match Request::decode(&buf[..n]).and_then(validate_command) {
                        Ok(request) => Phase::Dialing(request),
                        Err(err) => {
                            self.send_failure(&err).await;
                            return Err(err);
                        }
                    }
                }
                Phase::Dialing(request) => match self.dial(&request).await {
                    Ok((dest, reply)) => {
                        self.client.write_all(&reply.encode()).await?;
                        info!("SOCKS5 connection established to {}", request.target);
                        Phase::Relaying(dest)
                    }
                    Err(err) => {
                        self.send_failure(&err).await;
                        return Err(err);
                    }
                },
                Phase::Relaying(dest) => break dest,
            };
        };

        relay(self.client, dest).await;
        Ok(())
    }

    /// Dial the request's destination within the deadline. On success the
    /// reply carries the local address of the outbound socket.
    async fn dial(
        &self,
        request: &Request,
    ) -> Result<(Box<dyn DialedStream>, Reply), Socks5Error> {
        let target = request.target.to_string();
        debug!("dialing {}", target);

        let dest =
            match tokio::time::timeout(self.dial_timeout, self.dialer.dial("tcp", &target))
                .await
            {
                Ok(Ok(stream)) => stream,
                Ok(Err(e)) => return Err(Socks5Error::Dial(e)),
                Err(_) => return Err(Socks5Error::DialTimeout(self.dial_timeout)),
            };

        let bind = dest.local_addr().map_err(Socks5Error::Dial)?;
        Ok((dest, Reply::success(TargetAddr::from(bind))))
    }

    /// Best-effort failure reply; a client that already hung up is not an
    /// additional error.
    async fn send_failure(&mut self, err: &Socks5Error) {
        let reply = Reply::failure(err.reply_code());
        if let Err(write_err) = self.client.write_all(&reply.encode()).await {
            debug!("failed to write failure reply: {}", write_err);
        }
    }
}

/// This server only serves CONNECT. BIND and UDP ASSOCIATE are decoded so
/// they can be refused with the dedicated reply code instead of a general
/// failure, and their destinations are never dialed.
fn validate_command(request: Request) -> Result<Request, Socks5Error> {
    match request.command {
        Command::Connect => Ok(request),
        Command::Bind | Command::UdpAssociate => Err(Socks5Error::CommandNotSupported(
            request.command.to_byte(),
        )),
    }
}
