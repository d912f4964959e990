//! End-to-end tests over real sockets
//!
//! Each test starts a sockgate listener on an ephemeral port and speaks
//! SOCKS5 to it as an ordinary TCP client.

mod common;

use async_trait::async_trait;
use common::*;
use sockgate::config::ServerConfig;
use sockgate::dialer::{DialedStream, Dialer};
use sockgate::server::Server;
use std::io;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

#[tokio::test]
async fn proxies_tcp_to_an_echo_server() {
    let echo_addr = spawn_echo_server().await;
    let (proxy_addr, _shutdown_tx, _server) = spawn_proxy().await;

    let mut client = TcpStream::connect(proxy_addr).await.unwrap();
    handshake_no_auth(&mut client).await;

    let octets = match echo_addr.ip() {
        IpAddr::V4(ip) => ip.octets(),
        IpAddr::V6(_) => unreachable!("echo server binds IPv4"),
    };
    client
        .write_all(&connect_request_ipv4(octets, echo_addr.port()))
        .await
        .unwrap();

    let mut reply = [0u8; 10];
    client.read_exact(&mut reply).await.unwrap();
    assert_eq!(reply[0], 0x05);
    assert_eq!(reply[1], 0x00); // success
    assert_eq!(reply[3], 0x01); // outbound socket is IPv4

    client.write_all(b"round and round").await.unwrap();
    let mut buf = [0u8; 15];
    client.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"round and round");
}

#[tokio::test]
async fn resolves_domain_destinations() {
    let echo_addr = spawn_echo_server().await;
    let (proxy_addr, _shutdown_tx, _server) = spawn_proxy().await;

    let mut client = TcpStream::connect(proxy_addr).await.unwrap();
    handshake_no_auth(&mut client).await;

    client
        .write_all(&connect_request_domain("localhost", echo_addr.port()))
        .await
        .unwrap();

    let mut reply = [0u8; 10];
    client.read_exact(&mut reply).await.unwrap();
    assert_eq!(reply[1], 0x00);

    client.write_all(b"by name").await.unwrap();
    let mut buf = [0u8; 7];
    client.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"by name");
}

#[tokio::test]
async fn refused_destination_reports_general_failure() {
    // Bind then drop to get a port with nothing listening on it.
    let dead_addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let (proxy_addr, _shutdown_tx, _server) = spawn_proxy().await;

    let mut client = TcpStream::connect(proxy_addr).await.unwrap();
    handshake_no_auth(&mut client).await;

    client
        .write_all(&connect_request_ipv4([127, 0, 0, 1], dead_addr.port()))
        .await
        .unwrap();

    let mut reply = [0u8; 10];
    client.read_exact(&mut reply).await.unwrap();
    assert_eq!(reply, [0x05, 0x01, 0x00, 0x01, 0, 0, 0, 0, 0, 0]);

    // Server closes after a failure reply.
    let mut buf = [0u8; 1];
    assert_eq!(client.read(&mut buf).await.unwrap(), 0);
}

#[tokio::test]
async fn bind_command_is_refused() {
    let (proxy_addr, _shutdown_tx, _server) = spawn_proxy().await;

    let mut client = TcpStream::connect(proxy_addr).await.unwrap();
    handshake_no_auth(&mut client).await;

    let mut request = connect_request_ipv4([127, 0, 0, 1], 80);
    request[1] = 0x02; // BIND
    client.write_all(&request).await.unwrap();

    let mut reply = [0u8; 10];
    client.read_exact(&mut reply).await.unwrap();
    assert_eq!(reply, [0x05, 0x07, 0x00, 0x01, 0, 0, 0, 0, 0, 0]);
}

#[tokio::test]
async fn auth_requiring_clients_are_turned_away() {
    let (proxy_addr, _shutdown_tx, _server) = spawn_proxy().await;

    let mut client = TcpStream::connect(proxy_addr).await.unwrap();
    client.write_all(&[0x05, 0x01, 0x02]).await.unwrap();

    let mut selection = [0u8; 2];
    client.read_exact(&mut selection).await.unwrap();
    assert_eq!(selection, [0x05, 0xFF]);

    let mut buf = [0u8; 1];
    assert_eq!(client.read(&mut buf).await.unwrap(), 0);
}

/// Dialer that never completes; exercises the dial deadline end to end.
#[derive(Debug)]
struct HangingDialer;

#[async_trait]
impl Dialer for HangingDialer {
    async fn dial(&self, _network: &str, _addr: &str) -> io::Result<Box<dyn DialedStream>> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn slow_destinations_time_out() {
    let config = ServerConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        dial_timeout: 1,
    };
    let server = Server::bind_with_dialer(&config, Arc::new(HangingDialer))
        .await
        .unwrap();
    let proxy_addr = server.local_addr().unwrap();
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let _server = tokio::spawn(server.run(shutdown_rx));

    let mut client = TcpStream::connect(proxy_addr).await.unwrap();
    handshake_no_auth(&mut client).await;

    client
        .write_all(&connect_request_ipv4([10, 0, 0, 1], 80))
        .await
        .unwrap();

    let mut reply = [0u8; 10];
    client.read_exact(&mut reply).await.unwrap();
    assert_eq!(reply, [0x05, 0x01, 0x00, 0x01, 0, 0, 0, 0, 0, 0]);
}

#[tokio::test]
async fn shutdown_closes_the_listener() {
    let (proxy_addr, shutdown_tx, server) = spawn_proxy().await;

    shutdown_tx.send(true).unwrap();
    server.await.unwrap().unwrap();

    assert!(TcpStream::connect(proxy_addr).await.is_err());
}
