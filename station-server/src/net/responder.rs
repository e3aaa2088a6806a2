//! Write handle for replies to one connection.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::AsyncWrite;
use tokio::sync::Mutex;

use super::framer::{FrameWriter, frame_writer, write_frame};

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique connection number, for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The write half of a client connection, shared by everything that
/// answers that client.
///
/// Both the dispatcher (command replies) and the connection handler
/// (protocol errors) write here. Whole frames are written under a lock, so
/// replies never interleave on the wire.
#[derive(Clone)]
pub struct Responder {
    id: ConnectionId,
    frames: Arc<Mutex<FrameWriter<BoxedWriter>>>,
}

impl Responder {
    pub fn new<W>(writer: W, max_frame_len: usize) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let writer: BoxedWriter = Box::new(writer);
        Self {
            id: ConnectionId::next(),
            frames: Arc::new(Mutex::new(frame_writer(writer, max_frame_len))),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Send one framed reply.
    pub async fn send(&self, body: &str) -> io::Result<()> {
        let mut frames = self.frames.lock().await;
        write_frame(&mut *frames, body).await
    }
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder").field("id", &self.id).finish()
    }
}
