use std::sync::Arc;

use crate::error::QueueError;

/// Completion handler attached to an entry by a submission.
pub(crate) type Handler<R> = Box<dyn FnOnce(Result<R, QueueError>) + Send + 'static>;

/// Lifecycle of a per-key entry.
///
/// `Pending` entries sit in the FIFO awaiting admission, `Processing` entries
/// are with the processor, and `Done` is terminal: the outcome is recorded on
/// the entry and no transition ever leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryState {
    Pending,
    Processing,
    Done,
}

/// Bookkeeping record for one unique key.
///
/// Created once per key and never removed: after completion the entry serves
/// as the permanent cache resolving later submissions for the same key.
pub(crate) struct TaskEntry<I, R> {
    /// The work payload. Holds the only reference until dispatch, at which
    /// point the processor receives a shared clone for the duration of the
    /// run.
    pub item: Arc<I>,
    pub state: EntryState,
    /// Handler from the submission that created the entry. Taken exactly
    /// once, at completion.
    pub primary: Option<Handler<R>>,
    /// Handlers from duplicate submissions that arrived before completion,
    /// in attachment order.
    pub waiters: Vec<Handler<R>>,
    /// Recorded at the `Processing` -> `Done` transition, immutable after.
    pub outcome: Option<Result<R, QueueError>>,
}

impl<I, R: Clone> TaskEntry<I, R> {
    pub fn new(item: I, primary: Handler<R>) -> Self {
        Self {
            item: Arc::new(item),
            state: EntryState::Pending,
            primary: Some(primary),
            waiters: Vec::new(),
            outcome: None,
        }
    }

    /// Attach a duplicate submission's handler. Only legal before the entry
    /// is `Done`; afterwards duplicates resolve from [`cached_outcome`].
    ///
    /// [`cached_outcome`]: TaskEntry::cached_outcome
    pub fn attach(&mut self, handler: Handler<R>) {
        debug_assert!(self.state != EntryState::Done);
        self.waiters.push(handler);
    }

    /// Clone of the recorded outcome, present exactly when the entry is
    /// `Done`.
    pub fn cached_outcome(&self) -> Option<Result<R, QueueError>> {
        self.outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Handler<u32> {
        Box::new(|_| {})
    }

    #[test]
    fn new_entry_is_pending_with_no_outcome() {
        let entry: TaskEntry<&str, u32> = TaskEntry::new("item", noop());
        assert_eq!(entry.state, EntryState::Pending);
        assert!(entry.primary.is_some());
        assert!(entry.waiters.is_empty());
        assert!(entry.cached_outcome().is_none());
    }

    #[test]
    fn attach_preserves_order() {
        let mut entry: TaskEntry<&str, u32> = TaskEntry::new("item", noop());
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        for label in ["first", "second", "third"] {
            let seen = seen.clone();
            entry.attach(Box::new(move |_| seen.lock().unwrap().push(label)));
        }
        for waiter in entry.waiters.drain(..) {
            waiter(Ok(1));
        }
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn cached_outcome_clones_the_recorded_result() {
        let mut entry: TaskEntry<&str, u32> = TaskEntry::new("item", noop());
        entry.state = EntryState::Done;
        entry.outcome = Some(Ok(7));
        assert_eq!(entry.cached_outcome(), Some(Ok(7)));
        // Still there for the next duplicate.
        assert_eq!(entry.cached_outcome(), Some(Ok(7)));
    }
}
