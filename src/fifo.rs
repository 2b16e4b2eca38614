use std::collections::VecDeque;

/// Strict insertion-order queue feeding the admission loop.
///
/// Pure ordering, no dedup logic: the coordinator guarantees a key is
/// enqueued at most once, when its entry is created. Only ever touched from
/// the coordinator task, so a plain `VecDeque` suffices.
pub(crate) struct FifoQueue<T> {
    items: VecDeque<T>,
}

impl<T> FifoQueue<T> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Append to the tail.
    pub fn enqueue(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// Remove and return the oldest item, or `None` when empty.
    pub fn dequeue(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dequeue_returns_insertion_order() {
        let mut queue = FifoQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.dequeue(), None);

        queue.enqueue("a");
        queue.enqueue("b");
        queue.enqueue("c");
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.dequeue(), Some("a"));
        assert_eq!(queue.dequeue(), Some("b"));

        // Interleaved enqueue keeps order.
        queue.enqueue("d");
        assert_eq!(queue.dequeue(), Some("c"));
        assert_eq!(queue.dequeue(), Some("d"));
        assert_eq!(queue.dequeue(), None);
        assert!(queue.is_empty());
    }
}
