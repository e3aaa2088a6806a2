//! The single consumer of the command queue.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::ScheduleStore;

use super::{Command, CommandConsumer};

/// Applies queued commands to the store one at a time.
///
/// There must only ever be one dispatcher per store: it is what serialises
/// every query and update in arrival order.
pub struct Dispatcher {
    store: Arc<ScheduleStore>,
    commands: CommandConsumer,
}

impl Dispatcher {
    pub fn new(store: Arc<ScheduleStore>, commands: CommandConsumer) -> Self {
        Self { store, commands }
    }

    /// Run until every producer is gone and the queue is drained.
    pub async fn run(mut self) {
        info!("dispatcher started, waiting for commands");
        while let Some(command) = self.commands.pop().await {
            self.dispatch(command).await;
        }
        info!("dispatcher stopped: command queue closed");
    }

    /// Run on a background task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn dispatch(&self, command: Command) {
        let Command { request, reply_to } = command;
        debug!(connection = %reply_to.id(), request = request.name(), "executing");

        let reply = request.execute(&self.store);

        // A failed write means the client is gone; its handler will notice
        // on its next read and clean up.
        if let Err(e) = reply_to.send(&reply).await {
            debug!(connection = %reply_to.id(), error = %e, "could not deliver reply");
        }
    }
}
