use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::config::QueueConfig;
use crate::coordinator::{Command, Coordinator};
use crate::error::QueueError;
use crate::processor::Processor;

/// Handle to a bounded-concurrency, deduplicating task queue.
///
/// Submissions sharing a key are executed exactly once: the first creates an
/// entry and every later one either joins it as a waiter or, after
/// completion, resolves from the cached outcome. At most
/// [`QueueConfig::parallelism`] entries process concurrently, admitted in
/// strict submission order.
///
/// Cloning the handle shares the same queue. Must be created from within a
/// Tokio runtime.
pub struct AsyncQueue<P: Processor> {
    name: String,
    tx: mpsc::UnboundedSender<Command<P>>,
}

impl<P: Processor> AsyncQueue<P> {
    pub fn new(config: QueueConfig, processor: P) -> Self {
        let name = config.name.clone();
        let tx = Coordinator::spawn(config, Arc::new(processor));
        Self { name, tx }
    }

    /// Submit an item. The handler receives the single outcome recorded for
    /// the item's key, whether this submission created the entry or joined
    /// an existing one, always asynchronously.
    pub fn submit<F>(&self, item: P::Item, handler: F)
    where
        F: FnOnce(Result<P::Output, QueueError>) + Send + 'static,
    {
        let command = Command::Submit {
            item,
            handler: Box::new(handler),
        };
        if let Err(mpsc::error::SendError(command)) = self.tx.send(command) {
            // Coordinator task is gone, which only happens after its runtime
            // shut down. Reject rather than drop the handler on the floor.
            warn!(queue = %self.name, "coordinator unavailable, submission rejected");
            if let Command::Submit { handler, .. } = command {
                handler(Err(QueueError::Stopped {
                    name: self.name.clone(),
                }));
            }
        }
    }

    /// Submit an item and await its outcome.
    pub async fn submit_wait(&self, item: P::Item) -> Result<P::Output, QueueError> {
        let (tx, rx) = oneshot::channel();
        self.submit(item, move |outcome| {
            let _ = tx.send(outcome);
        });
        match rx.await {
            Ok(outcome) => outcome,
            // Handler dropped unfired: the coordinator went away mid-drain.
            Err(_) => Err(QueueError::Stopped {
                name: self.name.clone(),
            }),
        }
    }

    /// Stop the queue. Submissions arriving after this are rejected with
    /// [`QueueError::Stopped`]; entries already queued or processing drain to
    /// completion and their waiters are honored.
    pub fn stop(&self) {
        let _ = self.tx.send(Command::Stop);
    }

    /// The diagnostic label this queue was configured with.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<P: Processor> Clone for AsyncQueue<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            tx: self.tx.clone(),
        }
    }
}
