//! Per-client request reader.

use std::borrow::Cow;

use futures::StreamExt;
use tokio::io::AsyncRead;
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, FramedRead};
use tracing::debug;

use crate::command::{Command, CommandQueue, QueueClosed, parse_request};

use super::Responder;

/// Default upper bound on one request line, excluding the newline.
pub const DEFAULT_MAX_LINE_LEN: usize = 1024;

/// Why a connection handler stopped before the client hung up.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Reading a request line failed, or the line was too long
    #[error("read failed: {0}")]
    Read(#[from] AnyDelimiterCodecError),

    /// Writing an error reply failed
    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),

    /// The dispatcher is gone
    #[error(transparent)]
    QueueClosed(#[from] QueueClosed),
}

/// Reads request lines from one client and queues them as commands.
///
/// The handler only receives. Replies to well-formed requests are written
/// by the dispatcher through the connection's [`Responder`]; the handler
/// writes only the immediate error for a request it cannot parse.
pub struct ConnectionHandler<R> {
    lines: FramedRead<R, AnyDelimiterCodec>,
    responder: Responder,
    queue: CommandQueue,
}

impl<R: AsyncRead + Unpin> ConnectionHandler<R> {
    pub fn new(reader: R, responder: Responder, queue: CommandQueue, max_line_len: usize) -> Self {
        Self {
            lines: FramedRead::new(reader, request_codec(max_line_len)),
            responder,
            queue,
        }
    }

    /// Handle requests until the client closes its side.
    ///
    /// Each line is parsed and queued before the next one is read, so a
    /// client's requests enter the queue in the order it sent them.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        let id = self.responder.id();
        while let Some(line) = self.lines.next().await {
            let raw = line?;
            let line = decode_line(&raw);
            match parse_request(&line) {
                Ok(request) => {
                    debug!(connection = %id, request = request.name(), "queued");
                    self.queue
                        .push(Command::new(request, self.responder.clone()))?;
                }
                Err(e) => {
                    debug!(connection = %id, line = %line, "rejected request");
                    self.responder.send(&format!("{e}\n")).await?;
                }
            }
        }
        Ok(())
    }
}

/// Splits the input on `\n`, with a cap on line length.
fn request_codec(max_line_len: usize) -> AnyDelimiterCodec {
    AnyDelimiterCodec::new_with_max_length(b"\n".to_vec(), b"\n".to_vec(), max_line_len)
}

/// Text of one raw line, without a trailing `\r`. Bytes that are not UTF-8
/// become U+FFFD, so such a line still gets a reply.
fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Request;
    use crate::domain::TrainId;
    use crate::net::framer::{frame_reader, read_frame};
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn queues_parsed_requests_in_order() {
        let (queue, mut consumer) = CommandQueue::new();
        let (out, _client_out) = tokio::io::duplex(1024);
        let input: &[u8] = b"GET_SCHEDULE Iasi Bucharest\r\nhelp\nGET_TRAIN_INFO 3";

        ConnectionHandler::new(input, Responder::new(out, 1024), queue, 64)
            .run()
            .await
            .unwrap();

        // The handler owned the only producer, so the queue now drains to None
        let mut requests = Vec::new();
        while let Some(command) = consumer.pop().await {
            requests.push(command.request);
        }
        assert_eq!(
            requests,
            [
                Request::Schedule {
                    from: Some("Iasi".into()),
                    to: Some("Bucharest".into())
                },
                Request::Help,
                Request::TrainInfo {
                    id: TrainId::new(3)
                },
            ]
        );
    }

    #[tokio::test]
    async fn bad_requests_are_answered_without_queueing() {
        let (queue, consumer) = CommandQueue::new();
        let (out, client_out) = tokio::io::duplex(1024);
        let input: &[u8] = b"FLY_ME_TO_THE_MOON\nGET_TRAIN_INFO\nREPORT_DELAY 1 x y\n";

        ConnectionHandler::new(input, Responder::new(out, 1024), queue, 64)
            .run()
            .await
            .unwrap();

        assert!(consumer.is_empty());
        let mut frames = frame_reader(client_out, 1024);
        assert_eq!(
            read_frame(&mut frames).await.unwrap().unwrap(),
            "ERROR: Unknown command. Type 'help' for list.\n"
        );
        assert_eq!(
            read_frame(&mut frames).await.unwrap().unwrap(),
            "Error: Use GET_TRAIN_INFO <ID>\n"
        );
        assert_eq!(
            read_frame(&mut frames).await.unwrap().unwrap(),
            "Error: Use REPORT_DELAY <ID> <Min> <Est>\n"
        );
    }

    #[tokio::test]
    async fn non_utf8_line_is_answered_and_the_connection_continues() {
        let (queue, mut consumer) = CommandQueue::new();
        let (out, client_out) = tokio::io::duplex(1024);
        let input: &[u8] = b"\xff\xfeGET\r\nGET_DEPARTURES Ia\xffsi\nhelp\n";

        ConnectionHandler::new(input, Responder::new(out, 1024), queue, 64)
            .run()
            .await
            .unwrap();

        let mut frames = frame_reader(client_out, 1024);
        assert_eq!(
            read_frame(&mut frames).await.unwrap().unwrap(),
            "ERROR: Unknown command. Type 'help' for list.\n"
        );

        let mut requests = Vec::new();
        while let Some(command) = consumer.pop().await {
            requests.push(command.request);
        }
        assert_eq!(
            requests,
            [
                Request::Departures {
                    station: Some("Ia\u{fffd}si".into())
                },
                Request::Help,
            ]
        );
    }

    #[test]
    fn decode_line_strips_carriage_return() {
        assert_eq!(decode_line(b"help\r"), "help");
        assert_eq!(decode_line(b"help"), "help");
        assert_eq!(decode_line(b"\xc3"), "\u{fffd}");
    }

    #[tokio::test]
    async fn overlong_line_ends_the_connection() {
        let (queue, consumer) = CommandQueue::new();
        let (out, _client_out) = tokio::io::duplex(1024);
        let long = format!("GET_SCHEDULE {}\n", "x".repeat(100));

        let result = ConnectionHandler::new(long.as_bytes(), Responder::new(out, 1024), queue, 32)
            .run()
            .await;

        assert!(matches!(
            result,
            Err(ConnectionError::Read(
                AnyDelimiterCodecError::MaxChunkLengthExceeded
            ))
        ));
        assert!(consumer.is_empty());
    }

    #[tokio::test]
    async fn queue_closed_ends_the_connection() {
        let (queue, consumer) = CommandQueue::new();
        drop(consumer);
        let (out, _client_out) = tokio::io::duplex(1024);

        let result = ConnectionHandler::new(&b"help\n"[..], Responder::new(out, 1024), queue, 64)
            .run()
            .await;
        assert!(matches!(result, Err(ConnectionError::QueueClosed(_))));
    }

    #[tokio::test]
    async fn reads_wait_for_complete_lines() {
        let (queue, mut consumer) = CommandQueue::new();
        let (out, _client_out) = tokio::io::duplex(1024);
        let (mut client_in, server_in) = tokio::io::duplex(1024);

        let handler = tokio::spawn(
            ConnectionHandler::new(server_in, Responder::new(out, 1024), queue, 64).run(),
        );

        client_in.write_all(b"GET_DEPAR").await.unwrap();
        tokio::task::yield_now().await;
        assert!(consumer.is_empty());

        client_in.write_all(b"TURES Roman\n").await.unwrap();
        let command = consumer.pop().await.unwrap();
        assert_eq!(
            command.request,
            Request::Departures {
                station: Some("Roman".into())
            }
        );

        drop(client_in);
        handler.await.unwrap().unwrap();
    }
}
