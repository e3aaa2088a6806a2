//! Minimal programmatic client.
//!
//! Sends one request line at a time and waits for its framed reply.

use std::net::SocketAddr;
use std::time::Duration;

use futures::SinkExt;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio_util::codec::{FramedWrite, LinesCodec, LinesCodecError};
use tracing::warn;

use super::framer::{DEFAULT_MAX_FRAME_LEN, FrameReader, frame_reader, read_frame};

/// Errors from the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Every connection attempt failed
    #[error("could not connect to {addr} after {attempts} attempts: {source}")]
    Connect {
        addr: SocketAddr,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    /// Sending the request line failed
    #[error("send failed: {0}")]
    Send(#[from] LinesCodecError),

    /// Receiving the reply failed
    #[error("receive failed: {0}")]
    Receive(#[from] std::io::Error),

    /// The server closed the connection before replying
    #[error("connection closed by server")]
    Closed,
}

/// Connection settings for [`StationClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub addr: SocketAddr,
    /// Connection attempts before giving up.
    pub max_attempts: u32,
    /// Wait between attempts.
    pub retry_wait: Duration,
    pub max_frame_len: usize,
}

impl ClientConfig {
    /// Five attempts two seconds apart.
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            max_attempts: 5,
            retry_wait: Duration::from_secs(2),
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }

    pub fn with_retries(mut self, max_attempts: u32, retry_wait: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_wait = retry_wait;
        self
    }
}

/// A connected client.
pub struct StationClient {
    lines: FramedWrite<OwnedWriteHalf, LinesCodec>,
    frames: FrameReader<OwnedReadHalf>,
}

impl StationClient {
    /// Connect, retrying on failure as configured.
    pub async fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut attempt = 1;
        loop {
            match TcpStream::connect(config.addr).await {
                Ok(stream) => {
                    let (reader, writer) = stream.into_split();
                    return Ok(Self {
                        lines: FramedWrite::new(writer, LinesCodec::new()),
                        frames: frame_reader(reader, config.max_frame_len),
                    });
                }
                Err(source) if attempt >= config.max_attempts => {
                    return Err(ClientError::Connect {
                        addr: config.addr,
                        attempts: attempt,
                        source,
                    });
                }
                Err(e) => {
                    warn!(addr = %config.addr, attempt, error = %e, "connect failed, retrying");
                    tokio::time::sleep(config.retry_wait).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Send one request line and wait for the reply.
    pub async fn request(&mut self, line: &str) -> Result<String, ClientError> {
        self.lines.send(line).await?;
        read_frame(&mut self.frames)
            .await?
            .ok_or(ClientError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        // Bind then drop to get a port nobody listens on
        let addr = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let config = ClientConfig::new(addr).with_retries(2, Duration::from_millis(10));

        let err = StationClient::connect(&config).await.err().unwrap();
        assert!(matches!(err, ClientError::Connect { attempts: 2, .. }));
    }

    #[test]
    fn retries_are_at_least_one() {
        let addr: SocketAddr = "127.0.0.1:54000".parse().unwrap();
        let config = ClientConfig::new(addr).with_retries(0, Duration::ZERO);
        assert_eq!(config.max_attempts, 1);
        assert_eq!(ClientConfig::new(addr).max_attempts, 5);
    }
}
