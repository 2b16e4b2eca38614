use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ProcessError;

/// The unit of work a queue runs, at most once per unique key.
///
/// Implementations are opaque to the coordinator: `process` may resolve
/// immediately or suspend arbitrarily long, and reports success or failure
/// through its return value. Returning is the single completion event for an
/// item; the coordinator's bookkeeping relies on it happening exactly once,
/// which the signature guarantees.
#[async_trait]
pub trait Processor: Send + Sync + 'static {
    type Item: Send + Sync + 'static;
    type Key: Eq + Hash + Clone + Debug + Send + Sync + 'static;
    /// Cloneable so one recorded outcome can fan out to every submitter of
    /// the same key.
    type Output: Clone + Send + Sync + 'static;

    /// Derive the dedup identity for an item. Must be pure: the key is
    /// computed once at submission and identifies the entry forever.
    fn key(&self, item: &Self::Item) -> Self::Key;

    /// Perform the work for one item. The item is shared read-only for the
    /// duration of the run and must not be retained past the returned
    /// future.
    async fn process(&self, item: Arc<Self::Item>) -> Result<Self::Output, ProcessError>;
}
