//! FIFO queue of pending commands.
//!
//! Any number of connection handlers push; one dispatcher pops. The queue
//! is unbounded, so a client flooding requests grows memory rather than
//! blocking other clients.

use tokio::sync::mpsc;

use super::Command;

/// The dispatcher has stopped, so nothing will consume the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("command queue is closed")]
pub struct QueueClosed;

/// Producer side of the command queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CommandQueue {
    tx: mpsc::UnboundedSender<Command>,
}

/// Consumer side of the command queue. There is exactly one.
#[derive(Debug)]
pub struct CommandConsumer {
    rx: mpsc::UnboundedReceiver<Command>,
}

impl CommandQueue {
    /// Create a queue, returning its producer and its single consumer.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (CommandQueue, CommandConsumer) {
        let (tx, rx) = mpsc::unbounded_channel();
        (CommandQueue { tx }, CommandConsumer { rx })
    }

    /// Append a command at the tail. Never waits.
    pub fn push(&self, command: Command) -> Result<(), QueueClosed> {
        self.tx.send(command).map_err(|_| QueueClosed)
    }
}

impl CommandConsumer {
    /// Wait for the head of the queue and remove it.
    ///
    /// Returns `None` once every producer has been dropped and the queue is
    /// drained.
    pub async fn pop(&mut self) -> Option<Command> {
        self.rx.recv().await
    }

    /// Number of commands waiting.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Request;
    use crate::domain::TrainId;
    use crate::net::Responder;

    fn command(id: u32) -> Command {
        let (writer, _reader) = tokio::io::duplex(64);
        Command::new(
            Request::TrainInfo {
                id: TrainId::new(id),
            },
            Responder::new(writer, 1024),
        )
    }

    fn id_of(command: &Command) -> u32 {
        match command.request {
            Request::TrainInfo { id } => id.get(),
            _ => panic!("unexpected request"),
        }
    }

    #[tokio::test]
    async fn pops_in_push_order() {
        let (queue, mut consumer) = CommandQueue::new();
        for id in 1..=3 {
            queue.push(command(id)).unwrap();
        }
        assert_eq!(consumer.len(), 3);

        for id in 1..=3 {
            let cmd = consumer.pop().await.unwrap();
            assert_eq!(id_of(&cmd), id);
        }
        assert!(consumer.is_empty());
    }

    #[tokio::test]
    async fn pop_waits_for_a_push() {
        let (queue, mut consumer) = CommandQueue::new();

        let popper = tokio::spawn(async move { consumer.pop().await.map(|c| id_of(&c)) });
        tokio::task::yield_now().await;
        assert!(!popper.is_finished());

        queue.push(command(9)).unwrap();
        assert_eq!(popper.await.unwrap(), Some(9));
    }

    #[tokio::test]
    async fn fifo_across_many_producers() {
        let (queue, mut consumer) = CommandQueue::new();

        let mut handles = Vec::new();
        for producer in 0..8u32 {
            let queue = queue.clone();
            handles.push(tokio::spawn(async move {
                for n in 0..25u32 {
                    queue.push(command(producer * 100 + n)).unwrap();
                    tokio::task::yield_now().await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        drop(queue);

        let mut seen = Vec::new();
        while let Some(cmd) = consumer.pop().await {
            seen.push(id_of(&cmd));
        }
        assert_eq!(seen.len(), 200);

        // Each producer's own commands keep their relative order
        for producer in 0..8u32 {
            let own: Vec<u32> = seen
                .iter()
                .copied()
                .filter(|id| id / 100 == producer)
                .collect();
            let expected: Vec<u32> = (0..25).map(|n| producer * 100 + n).collect();
            assert_eq!(own, expected);
        }
    }

    #[tokio::test]
    async fn drained_queue_ends_after_producers_drop() {
        let (queue, mut consumer) = CommandQueue::new();
        queue.push(command(1)).unwrap();
        drop(queue);

        assert!(consumer.pop().await.is_some());
        assert!(consumer.pop().await.is_none());
    }

    #[tokio::test]
    async fn push_fails_without_consumer() {
        let (queue, consumer) = CommandQueue::new();
        drop(consumer);
        assert_eq!(queue.push(command(1)), Err(QueueClosed));
    }
}
