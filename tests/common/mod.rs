//! Test utilities for sockgate integration tests
//!
//! This module provides common helpers used across integration tests.

use sockgate::config::ServerConfig;
use sockgate::server::Server;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Spawn a TCP echo server on an ephemeral port
pub async fn spawn_echo_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(pair) => pair,
                Err(_) => break,
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            if socket.write_all(&buf[..n]).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            });
        }
    });

    addr
}

/// Spawn a sockgate server on an ephemeral port.
///
/// Returns the listen address, the shutdown sender (keep it alive for the
/// duration of the test), and the join handle of the serve task.
pub async fn spawn_proxy() -> (
    SocketAddr,
    broadcast::Sender<bool>,
    JoinHandle<anyhow::Result<()>>,
) {
    let config = ServerConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        dial_timeout: 5,
    };
    let server = Server::bind(&config).await.unwrap();
    let addr = server.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let handle = tokio::spawn(server.run(shutdown_rx));

    (addr, shutdown_tx, handle)
}

/// Drive the no-auth handshake as a SOCKS5 client
pub async fn handshake_no_auth(stream: &mut TcpStream) {
    stream.write_all(&[0x05, 0x01, 0x00]).await.unwrap();
    let mut selection = [0u8; 2];
    stream.read_exact(&mut selection).await.unwrap();
    assert_eq!(selection, [0x05, 0x00]);
}

/// Build a CONNECT request for an IPv4 destination
pub fn connect_request_ipv4(ip: [u8; 4], port: u16) -> Vec<u8> {
    let mut request = vec![0x05, 0x01, 0x00, 0x01];
    request.extend_from_slice(&ip);
    request.extend_from_slice(&port.to_be_bytes());
    request
}

/// Build a CONNECT request for a domain destination
pub fn connect_request_domain(domain: &str, port: u16) -> Vec<u8> {
    let mut request = vec![0x05, 0x01, 0x00, 0x03, domain.len() as u8];
    request.extend_from_slice(domain.as_bytes());
    request.extend_from_slice(&port.to_be_bytes());
    request
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echo_server_round_trips() {
        let addr = spawn_echo_server().await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        stream.write_all(b"hello").await.unwrap();
        let mut buf = [0u8; 5];
        stream.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn connect_request_builders_layout() {
        let request = connect_request_ipv4([192, 168, 1, 1], 8080);
        assert_eq!(request[0], 5); // SOCKS5 version
        assert_eq!(request[1], 1); // CONNECT
        assert_eq!(request[3], 1); // IPv4
        assert_eq!(&request[4..8], &[192, 168, 1, 1]);

        let request = connect_request_domain("example.com", 443);
        assert_eq!(request[3], 3); // domain
        assert_eq!(request[4], 11); // length
        assert_eq!(&request[5..16], b"example.com");
    }
}
