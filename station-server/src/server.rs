//! Wiring: listener, command queue, dispatcher and store.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

use crate::command::{CommandQueue, Dispatcher};
use crate::config::ServerConfig;
use crate::net::{BindError, Listener};
use crate::store::ScheduleStore;

/// Errors that stop the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Bind(#[from] BindError),

    #[error("cannot read bound address: {0}")]
    LocalAddr(#[source] std::io::Error),

    #[error("dispatcher failed: {0}")]
    DispatcherFailed(#[source] JoinError),

    #[error("dispatcher stopped unexpectedly")]
    DispatcherStopped,
}

/// A bound server, ready to run.
pub struct StationServer {
    listener: Listener,
    dispatcher: Dispatcher,
    addr: SocketAddr,
}

impl StationServer {
    /// Bind the listening socket and set up the dispatcher over `store`.
    pub async fn bind(config: &ServerConfig, store: Arc<ScheduleStore>) -> Result<Self, ServerError> {
        let (queue, consumer) = CommandQueue::new();
        let listener = Listener::bind(config.addr, queue, config.limits()).await?;
        let addr = listener.local_addr().map_err(ServerError::LocalAddr)?;
        Ok(Self {
            listener,
            dispatcher: Dispatcher::new(store, consumer),
            addr,
        })
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the dispatcher and accept clients until the dispatcher ends.
    ///
    /// The dispatcher is the only consumer of the queue, so once it is gone
    /// no client can be answered and the server gives up.
    pub async fn run(self) -> Result<(), ServerError> {
        info!(addr = %self.addr, "listening");
        let dispatcher = self.dispatcher.spawn();
        supervise(dispatcher, self.listener.run()).await
    }
}

async fn supervise(
    dispatcher: JoinHandle<()>,
    accept: impl Future<Output = ()>,
) -> Result<(), ServerError> {
    tokio::select! {
        finished = dispatcher => {
            let err = match finished {
                Ok(()) => ServerError::DispatcherStopped,
                Err(e) => ServerError::DispatcherFailed(e),
            };
            error!(error = %err, "shutting down");
            Err(err)
        }
        () = accept => Ok(()),
    }
}
