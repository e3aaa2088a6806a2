//! TCP accept loop.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::command::CommandQueue;

use super::{ConnectionError, ConnectionHandler, Responder};

/// Pause after a failed accept, e.g. when out of file descriptors.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Size limits applied to every connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionLimits {
    /// Longest accepted request line.
    pub max_line_len: usize,
    /// Longest reply frame body.
    pub max_frame_len: usize,
}

/// Error binding the listening socket.
#[derive(Debug, thiserror::Error)]
#[error("cannot listen on {addr}: {source}")]
pub struct BindError {
    pub addr: SocketAddr,
    #[source]
    pub source: std::io::Error,
}

/// Accepts clients and spawns one [`ConnectionHandler`] task per client.
pub struct Listener {
    inner: TcpListener,
    queue: CommandQueue,
    limits: ConnectionLimits,
}

impl Listener {
    pub async fn bind(
        addr: SocketAddr,
        queue: CommandQueue,
        limits: ConnectionLimits,
    ) -> Result<Self, BindError> {
        let inner = TcpListener::bind(addr)
            .await
            .map_err(|source| BindError { addr, source })?;
        Ok(Self {
            inner,
            queue,
            limits,
        })
    }

    /// The bound address. Useful when binding port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// Accept connections forever.
    pub async fn run(self) {
        loop {
            match self.inner.accept().await {
                Ok((stream, peer)) => self.spawn_handler(stream, peer),
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }

    fn spawn_handler(&self, stream: TcpStream, peer: SocketAddr) {
        let (reader, writer) = stream.into_split();
        let responder = Responder::new(writer, self.limits.max_frame_len);
        let id = responder.id();
        let handler =
            ConnectionHandler::new(reader, responder, self.queue.clone(), self.limits.max_line_len);

        info!(connection = %id, %peer, "client connected");
        tokio::spawn(async move {
            match handler.run().await {
                Ok(()) => info!(connection = %id, %peer, "client disconnected"),
                Err(ConnectionError::Read(e)) => {
                    debug!(connection = %id, %peer, error = %e, "client dropped")
                }
                Err(e) => warn!(connection = %id, %peer, error = %e, "connection closed"),
            }
        });
    }
}
