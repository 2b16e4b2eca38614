//! Coordinator - the single owner of all queue state.
//!
//! Every mutation of the registry, the FIFO, and the active-task count
//! happens on one spawned task fed by a command channel, so no locking is
//! needed anywhere: mutual exclusion falls out of never suspending
//! mid-mutation. Processors run on their own spawned workers and report back
//! through the same channel.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::QueueConfig;
use crate::entry::{EntryState, Handler, TaskEntry};
use crate::error::QueueError;
use crate::fifo::FifoQueue;
use crate::processor::Processor;

/// Commands accepted by the coordinator task.
pub(crate) enum Command<P: Processor> {
    /// A caller submitted an item with a completion handler.
    Submit {
        item: P::Item,
        handler: Handler<P::Output>,
    },
    /// Run one admission pass. Sent by the coordinator to itself, guarded by
    /// the armed flag so any number of triggers coalesce into one pass.
    EnsureProcessing,
    /// A worker finished processing the entry for `key`.
    Complete {
        key: P::Key,
        outcome: Result<P::Output, QueueError>,
    },
    /// Reject new submissions from here on; queued and in-flight entries
    /// drain to completion.
    Stop,
}

pub(crate) struct Coordinator<P: Processor> {
    name: String,
    parallelism: usize,
    processor: Arc<P>,
    /// key -> entry, grows monotonically. Doubles as the permanent dedup
    /// cache: entries are never removed.
    registry: HashMap<P::Key, TaskEntry<P::Item, P::Output>>,
    /// Keys of `Pending` entries awaiting admission, oldest first.
    queued: FifoQueue<P::Key>,
    /// Entries currently `Processing`. Hard ceiling at `parallelism`.
    active: usize,
    /// True while an `EnsureProcessing` command is in flight.
    scheduling_armed: bool,
    stopped: bool,
    /// Weak so the coordinator does not keep its own channel alive; the loop
    /// exits once every queue handle and in-flight worker is gone.
    self_tx: mpsc::WeakUnboundedSender<Command<P>>,
}

impl<P: Processor> Coordinator<P> {
    /// Spawn the coordinator task and return the command sender the public
    /// handle feeds.
    pub fn spawn(config: QueueConfig, processor: Arc<P>) -> mpsc::UnboundedSender<Command<P>> {
        let (tx, rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            name: config.name,
            parallelism: config.parallelism.max(1),
            processor,
            registry: HashMap::new(),
            queued: FifoQueue::new(),
            active: 0,
            scheduling_armed: false,
            stopped: false,
            self_tx: tx.downgrade(),
        };
        tokio::spawn(coordinator.run(rx));
        tx
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command<P>>) {
        debug!(queue = %self.name, parallelism = self.parallelism, "coordinator started");
        while let Some(command) = rx.recv().await {
            match command {
                Command::Submit { item, handler } => self.handle_submit(item, handler),
                Command::EnsureProcessing => self.ensure_processing(),
                Command::Complete { key, outcome } => self.handle_complete(key, outcome),
                Command::Stop => self.handle_stop(),
            }
        }
        debug!(queue = %self.name, "coordinator shut down");
    }

    fn handle_submit(&mut self, item: P::Item, handler: Handler<P::Output>) {
        if self.stopped {
            debug!(queue = %self.name, "submission rejected, queue stopped");
            handler(Err(QueueError::Stopped {
                name: self.name.clone(),
            }));
            return;
        }

        let key = self.processor.key(&item);
        if let Some(entry) = self.registry.get_mut(&key) {
            if let Some(outcome) = entry.cached_outcome() {
                debug!(queue = %self.name, key = ?key, "duplicate submission resolved from cache");
                // Delivered on its own task so callers never observe a cache
                // hit completing inline with submit.
                tokio::spawn(async move { handler(outcome) });
            } else {
                debug!(queue = %self.name, key = ?key, state = ?entry.state, "duplicate submission attached as waiter");
                entry.attach(handler);
            }
            return;
        }

        debug!(queue = %self.name, key = ?key, "entry created and queued");
        self.registry
            .insert(key.clone(), TaskEntry::new(item, handler));
        self.queued.enqueue(key);
        self.arm();
    }

    /// Arm one admission pass unless one is already in flight. Commands
    /// already ahead of it in the channel are folded into that single pass.
    fn arm(&mut self) {
        if self.scheduling_armed {
            return;
        }
        if let Some(tx) = self.self_tx.upgrade() {
            self.scheduling_armed = true;
            let _ = tx.send(Command::EnsureProcessing);
        }
    }

    /// One admission pass: admit oldest entries until the ceiling is reached
    /// or the FIFO runs dry.
    fn ensure_processing(&mut self) {
        if self.queued.is_empty() {
            self.scheduling_armed = false;
            return;
        }

        let Some(done_tx) = self.self_tx.upgrade() else {
            // Every queue handle is gone; nothing can observe further work.
            self.scheduling_armed = false;
            return;
        };

        while self.active < self.parallelism {
            let Some(key) = self.queued.dequeue() else {
                break;
            };
            // Entries are never removed, so a queued key always resolves.
            let Some(entry) = self.registry.get_mut(&key) else {
                warn!(queue = %self.name, key = ?key, "queued key missing from registry");
                continue;
            };
            entry.state = EntryState::Processing;
            let item = Arc::clone(&entry.item);
            self.active += 1;
            debug!(queue = %self.name, key = ?key, active = self.active, "entry admitted");

            let processor = Arc::clone(&self.processor);
            let done_tx = done_tx.clone();
            tokio::spawn(async move {
                let outcome = processor.process(item).await.map_err(QueueError::from);
                // Send can only fail once the coordinator is gone, and then
                // there is nobody left to report to.
                let _ = done_tx.send(Command::Complete { key, outcome });
            });
        }

        // Cleared only after every dispatch for this pass is issued. A
        // processor that resolves immediately still reports through the
        // command channel and cannot interleave with the loop above.
        self.scheduling_armed = false;
    }

    fn handle_complete(&mut self, key: P::Key, outcome: Result<P::Output, QueueError>) {
        let Some(entry) = self.registry.get_mut(&key) else {
            warn!(queue = %self.name, key = ?key, "completion for unknown key dropped");
            return;
        };

        let primary = entry.primary.take();
        let waiters = std::mem::take(&mut entry.waiters);
        entry.state = EntryState::Done;
        entry.outcome = Some(outcome.clone());
        self.active -= 1;

        match &outcome {
            Ok(_) => {
                debug!(
                    queue = %self.name,
                    key = ?key,
                    active = self.active,
                    waiters = waiters.len(),
                    "entry completed"
                );
            }
            Err(error) => {
                warn!(queue = %self.name, key = ?key, %error, "processor reported failure");
            }
        }

        // Primary submitter first, then waiters in attachment order, every
        // one with the identical outcome.
        if let Some(primary) = primary {
            primary(outcome.clone());
        }
        for waiter in waiters {
            waiter(outcome.clone());
        }

        // A slot freed up; give queued entries a chance without requiring a
        // new submission.
        self.arm();
    }

    fn handle_stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        info!(
            queue = %self.name,
            queued = self.queued.len(),
            active = self.active,
            "queue stopped; existing entries drain, new submissions are rejected"
        );
    }
}
