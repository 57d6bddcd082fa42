//! Shared mock endpoints for integration tests.
//!
//! Every endpoint binds `127.0.0.1:0` and returns its address, so tests can
//! run in parallel without port bookkeeping.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A running mock endpoint and the number of requests it has accepted.
pub struct MockEndpoint {
    pub addr: SocketAddr,
    pub hits: Arc<AtomicUsize>,
}

impl MockEndpoint {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Consume the request head so closing the socket doesn't reset the connection.
async fn read_request_head(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
}

async fn spawn_responder(declared_len: usize, status: u16, body: Vec<u8>) -> MockEndpoint {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let body = Arc::new(body);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let body = body.clone();
                    tokio::spawn(async move {
                        read_request_head(&mut socket).await;
                        let head = format!(
                            "HTTP/1.1 {} Mock\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                            status, declared_len
                        );
                        let _ = socket.write_all(head.as_bytes()).await;
                        let _ = socket.write_all(&body).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockEndpoint { addr, hits }
}

/// Answers every request with `status` and `body`.
pub async fn start_fixed(status: u16, body: Vec<u8>) -> MockEndpoint {
    spawn_responder(body.len(), status, body).await
}

/// Serves `len` bytes of payload with a 200.
pub async fn start_payload(len: usize) -> MockEndpoint {
    start_fixed(200, vec![b'x'; len]).await
}

/// Declares `declared` bytes but sends only `sent` before closing.
pub async fn start_truncated(declared: usize, sent: usize) -> MockEndpoint {
    spawn_responder(declared, 200, vec![b'x'; sent]).await
}

/// Accepts connections and never answers.
pub async fn start_silent() -> MockEndpoint {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            held.push(socket);
        }
    });

    MockEndpoint { addr, hits }
}

/// An address with nothing listening on it.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
