//! Network layer: framing, per-connection handling and the accept loop.

mod client;
mod connection;
mod framer;
mod listener;
mod responder;

pub use client::{ClientConfig, ClientError, StationClient};
pub use connection::{ConnectionError, ConnectionHandler, DEFAULT_MAX_LINE_LEN};
pub use framer::{
    DEFAULT_MAX_FRAME_LEN, FrameReader, FrameWriter, LENGTH_PREFIX_LEN, frame_codec,
    frame_reader, frame_writer, read_frame, write_frame,
};
pub use listener::{BindError, ConnectionLimits, Listener};
pub use responder::{ConnectionId, Responder};
