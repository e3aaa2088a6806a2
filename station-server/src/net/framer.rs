//! Length-prefixed message framing.
//!
//! Every server reply is a 4-byte big-endian length `N` followed by `N`
//! bytes of UTF-8 body. There is no trailing delimiter. Client requests go
//! the other way as plain newline-terminated lines and do not use this
//! framing.

use std::io;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec};

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Default upper bound on a frame body.
pub const DEFAULT_MAX_FRAME_LEN: usize = 1024 * 1024;

/// Frame sink over a byte stream.
pub type FrameWriter<W> = FramedWrite<W, LengthDelimitedCodec>;

/// Frame source over a byte stream.
pub type FrameReader<R> = FramedRead<R, LengthDelimitedCodec>;

/// Codec for the reply framing, rejecting bodies over `max_frame_len`.
pub fn frame_codec(max_frame_len: usize) -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .length_field_length(LENGTH_PREFIX_LEN)
        .big_endian()
        .max_frame_length(max_frame_len)
        .new_codec()
}

pub fn frame_writer<W: AsyncWrite>(writer: W, max_frame_len: usize) -> FrameWriter<W> {
    FramedWrite::new(writer, frame_codec(max_frame_len))
}

pub fn frame_reader<R: AsyncRead>(reader: R, max_frame_len: usize) -> FrameReader<R> {
    FramedRead::new(reader, frame_codec(max_frame_len))
}

/// Write one frame and flush it.
///
/// Returns once the whole frame has been handed to the underlying stream.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    frames: &mut FrameWriter<W>,
    body: &str,
) -> io::Result<()> {
    frames.send(Bytes::copy_from_slice(body.as_bytes())).await
}

/// Read one complete frame.
///
/// Returns `Ok(None)` on a clean end of stream between frames. A stream
/// that ends part way through a frame, an oversized length or a body that
/// is not UTF-8 is an error.
pub async fn read_frame<R: AsyncRead + Unpin>(
    frames: &mut FrameReader<R>,
) -> io::Result<Option<String>> {
    let Some(frame) = frames.next().await else {
        return Ok(None);
    };
    let body = frame?;
    String::from_utf8(body.to_vec())
        .map(Some)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
