use std::mem;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;
use tracing::debug;

use crate::http::parser::{ParseError, parse_request};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::write_response;
use crate::router::Router;
use crate::server::registry::ConnectionRegistry;

/// Releases the registry slot on every exit path, panics included.
struct RegistryGuard {
    registry: Arc<ConnectionRegistry>,
    id: u64,
}

impl Drop for RegistryGuard {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}

pub enum ConnectionState {
    Idle,
    Parsing,
    Dispatching(Request),
    Responding(Response),
    Closed,
}

/// Handles one accepted connection: parse a single request, dispatch it,
/// write the response, close. Protocol errors (no request line, malformed
/// request line, a read timeout while parsing) close the connection with
/// nothing written back.
pub struct Connection {
    peer: SocketAddr,
    reader: Option<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
    router: Arc<Router>,
    read_timeout: Duration,
    buffer_size: usize,
    state: ConnectionState,
    _guard: RegistryGuard,
}

impl Connection {
    pub fn new(
        id: u64,
        stream: TcpStream,
        peer: SocketAddr,
        router: Arc<Router>,
        registry: Arc<ConnectionRegistry>,
        read_timeout: Duration,
        buffer_size: usize,
    ) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            peer,
            reader: Some(BufReader::new(read_half)),
            writer: write_half,
            router,
            read_timeout,
            buffer_size,
            state: ConnectionState::Idle,
            _guard: RegistryGuard { registry, id },
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        loop {
            match mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Idle => {
                    self.state = ConnectionState::Parsing;
                }

                ConnectionState::Parsing => {
                    // The reader being gone here would mean a connection was
                    // driven twice; surface it, do not paper over it.
                    let reader = self
                        .reader
                        .take()
                        .context("connection reader already consumed")?;

                    let parsed = timeout(
                        self.read_timeout,
                        parse_request(reader, self.peer, self.read_timeout, self.buffer_size),
                    )
                    .await;

                    match parsed {
                        Err(_) => {
                            debug!(peer = %self.peer, "Timed out waiting for a request");
                        }
                        Ok(Err(ParseError::ConnectionClosed)) => {
                            debug!(peer = %self.peer, "Peer closed before sending a request");
                        }
                        Ok(Err(e)) => {
                            debug!(peer = %self.peer, error = %e, "Dropping unparseable request");
                        }
                        Ok(Ok(request)) => {
                            self.state = ConnectionState::Dispatching(request);
                        }
                    }
                }

                ConnectionState::Dispatching(mut request) => {
                    let response = self.router.dispatch(&mut request).await;
                    self.state = ConnectionState::Responding(response);
                }

                ConnectionState::Responding(response) => {
                    write_response(response, &mut self.writer, self.buffer_size)
                        .await
                        .context("failed writing response")?;
                    let _ = self.writer.shutdown().await;
                }

                ConnectionState::Closed => break,
            }
        }

        Ok(())
    }
}
