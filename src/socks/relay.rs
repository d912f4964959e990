//! Bidirectional TCP relay
//!
//! Once a CONNECT request has been dialed and the success reply written,
//! the connection degrades to a dumb pipe: bytes are copied both ways until
//! either direction ends.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

/// Relay data bidirectionally between the client and the dialed destination.
///
/// Copies run concurrently; the first direction to hit EOF or an I/O error
/// ends the whole relay. Both streams are dropped on return, which tears
/// down whichever direction was still in flight. Relay-phase errors are
/// logged, not surfaced: there is no way to report them to the client
/// mid-stream, so the function is infallible by construction.
pub async fn relay<A, B>(client: A, dest: B)
where
    A: AsyncRead + AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    let (mut client_read, mut client_write) = tokio::io::split(client);
    let (mut dest_read, mut dest_write) = tokio::io::split(dest);

    let client_to_dest = tokio::io::copy(&mut client_read, &mut dest_write);
    let dest_to_client = tokio::io::copy(&mut dest_read, &mut client_write);

    tokio::select! {
        result = client_to_dest => {
            match result {
                Ok(bytes) => debug!("client->dest finished: {} bytes", bytes),
                Err(e) => debug!("client->dest error: {}", e),
            }
        }
        result = dest_to_client => {
            match result {
                Ok(bytes) => debug!("dest->client finished: {} bytes", bytes),
                Err(e) => debug!("dest->client error: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn relays_both_directions() {
        let (mut client, relay_client_side) = duplex(1024);
        let (mut dest, relay_dest_side) = duplex(1024);

        tokio::spawn(relay(relay_client_side, relay_dest_side));

        client.write_all(b"ping").await.unwrap();
        let mut buf = [0u8; 4];
        dest.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"ping");

        dest.write_all(b"pong").await.unwrap();
        client.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"pong");
    }

    #[tokio::test]
    async fn relays_payloads_larger_than_the_pipe_buffer() {
        let (mut client, relay_client_side) = duplex(1024);
        let (mut dest, relay_dest_side) = duplex(1024);

        tokio::spawn(relay(relay_client_side, relay_dest_side));

        let payload: Vec<u8> = (0..50_000).map(|i| (i % 251) as u8).collect();
        let expected = payload.clone();

        let writer = tokio::spawn(async move {
            client.write_all(&payload).await.unwrap();
            client.shutdown().await.unwrap();
        });

        let mut received = vec![0u8; expected.len()];
        dest.read_exact(&mut received).await.unwrap();
        assert_eq!(received, expected);
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn relay_ends_when_either_side_closes() {
        let (client, relay_client_side) = duplex(64);
        let (mut dest, relay_dest_side) = duplex(64);

        let handle = tokio::spawn(relay(relay_client_side, relay_dest_side));

        // Client hangs up before sending anything.
        drop(client);

        handle.await.unwrap();

        // The relay dropped its destination side, so the peer sees EOF.
        let mut buf = [0u8; 1];
        assert_eq!(dest.read(&mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn relay_flushes_buffered_bytes_before_teardown() {
        let (mut client, relay_client_side) = duplex(1024);
        let (mut dest, relay_dest_side) = duplex(1024);

        let handle = tokio::spawn(relay(relay_client_side, relay_dest_side));

        client.write_all(b"last words").await.unwrap();
        client.shutdown().await.unwrap();
        drop(client);

        handle.await.unwrap();

        let mut received = Vec::new();
        dest.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, b"last words");
    }
}
