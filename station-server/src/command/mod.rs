//! Commands: parsed requests queued for the dispatcher.
//!
//! Connection handlers turn request lines into [`Command`]s and push them
//! onto the [`CommandQueue`]. A single [`Dispatcher`] pops them in order,
//! runs each against the schedule store, and writes the reply back to the
//! connection the command came from.

mod dispatch;
mod parse;
mod queue;
mod request;

pub use dispatch::Dispatcher;
pub use parse::{MAX_DELAY_MINS, RequestError, parse_request};
pub use queue::{CommandConsumer, CommandQueue, QueueClosed};
pub use request::{Command, DELAY_UPDATED, HELP_TEXT, Request};
